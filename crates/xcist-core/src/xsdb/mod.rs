//! Per-element mass attenuation cross-section database.
//!
//! A [`CrossSectionDatabase`] is loaded at most once from a data directory and
//! is read-only afterwards. Re-initializing with the same directory is a
//! no-op; a different directory is rejected so datasets never mix mid-run.

mod model;
mod parser;

pub use model::ElementCrossSection;

use crate::common::elements::{atomic_number_for_stem, element_symbol};
use crate::domain::{XcistError, XcistResult};
use globset::{GlobBuilder, GlobMatcher};
use once_cell::sync::OnceCell;
use parser::parse_cross_section_source;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

pub const DEFAULT_CROSS_SECTION_GLOB: &str = "*.dat";

/// What to do with energies outside an element's tabulated grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Fail with [`XcistError::EnergyOutOfRange`].
    #[default]
    Reject,
    /// Use the nearest tabulated end value and log a warning.
    Clamp,
}

#[derive(Debug)]
struct CrossSectionTable {
    directory: PathBuf,
    elements: BTreeMap<u32, ElementCrossSection>,
}

#[derive(Debug)]
pub struct CrossSectionDatabase {
    boundary_policy: BoundaryPolicy,
    file_glob: String,
    table: OnceCell<CrossSectionTable>,
}

impl Default for CrossSectionDatabase {
    fn default() -> Self {
        Self::new(BoundaryPolicy::default())
    }
}

impl CrossSectionDatabase {
    pub fn new(boundary_policy: BoundaryPolicy) -> Self {
        Self {
            boundary_policy,
            file_glob: DEFAULT_CROSS_SECTION_GLOB.to_string(),
            table: OnceCell::new(),
        }
    }

    /// Restricts which file names in the data directory are read.
    pub fn with_file_glob(mut self, file_glob: impl Into<String>) -> Self {
        self.file_glob = file_glob.into();
        self
    }

    pub fn boundary_policy(&self) -> BoundaryPolicy {
        self.boundary_policy
    }

    /// Loads every usable data file under `directory` on first call.
    ///
    /// Concurrent first calls block until one of them has built the table.
    pub fn initialize(&self, directory: impl AsRef<Path>) -> XcistResult<()> {
        let requested = normalize_directory(directory.as_ref());
        let table = self
            .table
            .get_or_try_init(|| load_table(&requested, &self.file_glob))?;

        if table.directory != requested {
            return Err(XcistError::database_initialization(
                &requested,
                format!(
                    "database already initialized from '{}'",
                    table.directory.display()
                ),
            ));
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.table.get().is_some()
    }

    pub fn directory(&self) -> Option<&Path> {
        self.table.get().map(|table| table.directory.as_path())
    }

    pub fn atomic_numbers(&self) -> Vec<u32> {
        self.table
            .get()
            .map(|table| table.elements.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn element(&self, atomic_number: u32) -> Option<&ElementCrossSection> {
        self.table.get()?.elements.get(&atomic_number)
    }

    pub fn energy_range(&self, atomic_number: u32) -> XcistResult<(f64, f64)> {
        Ok(self.require_element(atomic_number)?.energy_range())
    }

    /// Mass attenuation coefficients (cm²/g), one per input energy (keV).
    pub fn mass_attenuation_coefficient(
        &self,
        atomic_number: u32,
        energies_kev: &[f64],
    ) -> XcistResult<Vec<f64>> {
        let element = self.require_element(atomic_number)?;
        let (min_kev, max_kev) = element.energy_range();

        let mut clamped = 0_usize;
        let mut coefficients = Vec::with_capacity(energies_kev.len());
        for &energy in energies_kev {
            if let Some(value) = element.evaluate(energy) {
                coefficients.push(value);
                continue;
            }

            let clampable = energy.is_finite() && energy > 0.0;
            if self.boundary_policy == BoundaryPolicy::Reject || !clampable {
                return Err(XcistError::EnergyOutOfRange {
                    atomic_number,
                    energy_kev: energy,
                    min_kev,
                    max_kev,
                });
            }

            clamped += 1;
            coefficients.push(if energy < min_kev {
                element.first_value()
            } else {
                element.last_value()
            });
        }

        if clamped > 0 {
            warn!(
                atomic_number,
                clamped, min_kev, max_kev, "clamped out-of-range energies to the tabulated grid"
            );
        }
        Ok(coefficients)
    }

    fn require_element(&self, atomic_number: u32) -> XcistResult<&ElementCrossSection> {
        let table = self.table.get().ok_or_else(|| {
            XcistError::database_initialization(
                PathBuf::new(),
                "cross-section database has not been initialized",
            )
        })?;
        table
            .elements
            .get(&atomic_number)
            .ok_or(XcistError::UnknownElement { atomic_number })
    }
}

/// Process-wide database for hosts that do not thread their own instance.
pub fn shared_database() -> &'static CrossSectionDatabase {
    static SHARED: OnceLock<CrossSectionDatabase> = OnceLock::new();
    SHARED.get_or_init(CrossSectionDatabase::default)
}

fn normalize_directory(directory: &Path) -> PathBuf {
    fs::canonicalize(directory).unwrap_or_else(|_| directory.to_path_buf())
}

fn load_table(directory: &Path, file_glob: &str) -> XcistResult<CrossSectionTable> {
    if !directory.is_dir() {
        return Err(XcistError::database_initialization(
            directory,
            "directory does not exist or is not a directory",
        ));
    }

    let matcher = compile_file_glob(directory, file_glob)?;
    let list_error = |source: std::io::Error| {
        XcistError::database_initialization(
            directory,
            format!("failed to list directory: {source}"),
        )
    };
    let mut paths = fs::read_dir(directory)
        .map_err(list_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(list_error)?;
    paths.sort();

    let mut elements = BTreeMap::new();
    for path in paths {
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if !matcher.is_match(file_name) {
            continue;
        }

        if let Some(element) = load_element_file(&path) {
            let atomic_number = element.atomic_number();
            if elements.contains_key(&atomic_number) {
                warn!(
                    path = %path.display(),
                    atomic_number, "skipping duplicate cross-section file for element"
                );
                continue;
            }
            elements.insert(atomic_number, element);
        }
    }

    if elements.is_empty() {
        return Err(XcistError::database_initialization(
            directory,
            format!("no usable cross-section files matching '{file_glob}'"),
        ));
    }

    info!(
        directory = %directory.display(),
        elements = elements.len(),
        "loaded cross-section database"
    );
    Ok(CrossSectionTable {
        directory: directory.to_path_buf(),
        elements,
    })
}

fn compile_file_glob(directory: &Path, file_glob: &str) -> XcistResult<GlobMatcher> {
    GlobBuilder::new(file_glob)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| {
            XcistError::database_initialization(
                directory,
                format!("invalid cross-section file glob '{file_glob}': {source}"),
            )
        })
}

fn load_element_file(path: &Path) -> Option<ElementCrossSection> {
    let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or_default();
    let Some(atomic_number) = atomic_number_for_stem(stem) else {
        warn!(
            path = %path.display(),
            "skipping cross-section file: cannot infer element from name"
        );
        return None;
    };

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            warn!(path = %path.display(), %error, "skipping unreadable cross-section file");
            return None;
        }
    };

    match parse_cross_section_source(atomic_number, &source) {
        Ok(element) => {
            let (min_kev, max_kev) = element.energy_range();
            debug!(
                path = %path.display(),
                atomic_number,
                symbol = element_symbol(atomic_number).unwrap_or("?"),
                points = element.energies_kev().len(),
                min_kev,
                max_kev,
                "loaded element cross sections"
            );
            Some(element)
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "skipping malformed cross-section file");
            None
        }
    }
}
