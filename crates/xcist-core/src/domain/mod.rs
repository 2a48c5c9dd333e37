pub mod errors;

pub use errors::{ErrorCategory, XcistError, XcistResult};
