//! X-ray attenuation for CT simulation: per-element cross-section tables,
//! material mixing, shape-preserving linear attenuation and detector
//! prefilter weights.

pub mod attenuation;
pub mod common;
pub mod config;
pub mod domain;
pub mod material;
pub mod numerics;
pub mod prefilter;
pub mod xsdb;

pub use attenuation::{Attenuation, AttenuationEngine, EnergyQuery, QueryShape, linear_attenuation};
pub use config::{EngineConfig, EngineConfigError, load_engine_config};
pub use domain::{ErrorCategory, XcistError, XcistResult};
pub use material::{ElementFraction, Material, MaterialLibrary};
pub use numerics::ShapedArray;
pub use prefilter::{FilterStack, FilterStage, PrefilterToken, prefilter_weights};
pub use xsdb::{BoundaryPolicy, CrossSectionDatabase, ElementCrossSection, shared_database};
