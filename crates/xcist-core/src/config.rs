//! JSON engine configuration for hosts that do not assemble the pieces
//! themselves. Relative paths resolve against the config file's directory.

use crate::domain::XcistResult;
use crate::material::MaterialLibrary;
use crate::prefilter::{FilterStack, PrefilterToken};
use crate::xsdb::{BoundaryPolicy, CrossSectionDatabase, DEFAULT_CROSS_SECTION_GLOB};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub cross_section_directory: PathBuf,
    #[serde(default = "default_cross_section_glob")]
    pub cross_section_file_glob: String,
    #[serde(default)]
    pub material_search_roots: Vec<PathBuf>,
    #[serde(default)]
    pub boundary_policy: BoundaryPolicy,
    #[serde(default)]
    pub detector_prefilter: Vec<PrefilterToken>,
    #[serde(default = "default_detector_cell_count")]
    pub detector_cell_count: usize,
}

fn default_cross_section_glob() -> String {
    DEFAULT_CROSS_SECTION_GLOB.to_string()
}

const fn default_detector_cell_count() -> usize {
    1
}

impl EngineConfig {
    pub fn new(
        cross_section_directory: impl Into<PathBuf>,
        material_search_roots: Vec<PathBuf>,
    ) -> Self {
        Self {
            cross_section_directory: cross_section_directory.into(),
            cross_section_file_glob: default_cross_section_glob(),
            material_search_roots,
            boundary_policy: BoundaryPolicy::default(),
            detector_prefilter: Vec::new(),
            detector_cell_count: default_detector_cell_count(),
        }
    }

    /// Builds and initializes a database from this configuration.
    pub fn open_database(&self) -> XcistResult<CrossSectionDatabase> {
        let database = CrossSectionDatabase::new(self.boundary_policy)
            .with_file_glob(self.cross_section_file_glob.clone());
        database.initialize(&self.cross_section_directory)?;
        Ok(database)
    }

    /// Material library with `XCIST_MATERIAL_PATH` roots ahead of configured ones.
    pub fn material_library(&self) -> MaterialLibrary {
        MaterialLibrary::with_env_roots(self.material_search_roots.iter().cloned())
    }

    pub fn filter_stack(&self) -> XcistResult<FilterStack> {
        FilterStack::from_flat(&self.detector_prefilter)
    }

    fn resolve_relative_to(mut self, base: &Path) -> Self {
        self.cross_section_directory = join_relative(base, &self.cross_section_directory);
        self.material_search_roots = self
            .material_search_roots
            .iter()
            .map(|root| join_relative(base, root))
            .collect();
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineConfigError {
    #[error("failed to read engine config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse engine config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn load_engine_config(
    config_path: impl AsRef<Path>,
) -> Result<EngineConfig, EngineConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| EngineConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config: EngineConfig =
        serde_json::from_str(&source).map_err(|source| EngineConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;

    let base = config_path.parent().unwrap_or_else(|| Path::new(""));
    Ok(config.resolve_relative_to(base))
}

fn join_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
