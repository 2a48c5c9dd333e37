use std::path::{Path, PathBuf};

pub type XcistResult<T> = Result<T, XcistError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
}

impl ErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum XcistError {
    #[error(
        "failed to initialize cross-section database from '{}': {reason}",
        directory.display()
    )]
    DatabaseInitialization { directory: PathBuf, reason: String },

    #[error("material '{name}' not found in search roots [{}]", display_roots(searched))]
    MaterialNotFound { name: String, searched: Vec<PathBuf> },

    #[error("failed to parse material file '{}': {reason}", path.display())]
    MaterialParse { path: PathBuf, reason: String },

    #[error("atomic number {atomic_number} is not present in the cross-section database")]
    UnknownElement { atomic_number: u32 },

    #[error(
        "energy {energy_kev} keV is outside the tabulated range [{min_kev}, {max_kev}] keV for Z={atomic_number}"
    )]
    EnergyOutOfRange {
        atomic_number: u32,
        energy_kev: f64,
        min_kev: f64,
        max_kev: f64,
    },

    #[error("invalid detector prefilter: {reason}")]
    InvalidFilterStack { reason: String },

    #[error("invalid array shape {shape:?}: {reason}")]
    InvalidShape { shape: Vec<usize>, reason: String },
}

impl XcistError {
    pub fn database_initialization(directory: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::DatabaseInitialization {
            directory: directory.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn material_parse(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::MaterialParse {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn invalid_filter_stack(reason: impl Into<String>) -> Self {
        Self::InvalidFilterStack {
            reason: reason.into(),
        }
    }

    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::DatabaseInitialization { .. } => ErrorCategory::IoSystemError,
            Self::MaterialNotFound { .. }
            | Self::MaterialParse { .. }
            | Self::InvalidFilterStack { .. }
            | Self::InvalidShape { .. } => ErrorCategory::InputValidationError,
            Self::UnknownElement { .. } | Self::EnergyOutOfRange { .. } => {
                ErrorCategory::ComputationError
            }
        }
    }

    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::DatabaseInitialization { .. } => "IO.XSDB_INIT",
            Self::MaterialNotFound { .. } => "INPUT.MATERIAL_NOT_FOUND",
            Self::MaterialParse { .. } => "INPUT.MATERIAL_PARSE",
            Self::UnknownElement { .. } => "RUN.UNKNOWN_ELEMENT",
            Self::EnergyOutOfRange { .. } => "RUN.ENERGY_OUT_OF_RANGE",
            Self::InvalidFilterStack { .. } => "INPUT.PREFILTER",
            Self::InvalidShape { .. } => "INPUT.SHAPE",
        }
    }

    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder(), self)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

fn display_roots(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|root| format!("'{}'", root.display()))
        .collect::<Vec<_>>()
        .join(", ")
}
