//! Material definitions resolved by name through ordered search roots.

mod model;
mod parser;

pub use model::{ElementFraction, Material};
pub use parser::MASS_FRACTION_TOLERANCE;

use crate::domain::{XcistError, XcistResult};
use parser::parse_material_source;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Extra material roots, searched ahead of the configured ones.
pub const MATERIAL_PATH_ENV: &str = "XCIST_MATERIAL_PATH";

#[derive(Debug, Default)]
pub struct MaterialLibrary {
    search_roots: Vec<PathBuf>,
    cache: Mutex<BTreeMap<String, Arc<Material>>>,
}

impl MaterialLibrary {
    pub fn new<I, P>(search_roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_roots: search_roots.into_iter().map(Into::into).collect(),
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    /// Like [`MaterialLibrary::new`], with `XCIST_MATERIAL_PATH` roots first.
    pub fn with_env_roots<I, P>(search_roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut roots = env_search_roots();
        roots.extend(search_roots.into_iter().map(Into::into));
        Self::new(roots)
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    /// First matching file wins, in search-root order.
    pub fn resolve(&self, name: &str) -> XcistResult<PathBuf> {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            let direct = Path::new(trimmed);
            let looks_like_path = direct.is_absolute() || direct.components().count() > 1;
            if looks_like_path && direct.is_file() {
                return Ok(direct.to_path_buf());
            }

            for root in &self.search_roots {
                let candidate = root.join(trimmed);
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }

        Err(XcistError::MaterialNotFound {
            name: name.to_string(),
            searched: self.search_roots.clone(),
        })
    }

    /// Resolves and parses `name`, reusing an earlier parse of the same name.
    pub fn load_material(&self, name: &str) -> XcistResult<Arc<Material>> {
        if let Some(material) = self.lock_cache().get(name) {
            return Ok(Arc::clone(material));
        }

        let path = self.resolve(name)?;
        let source = fs::read_to_string(&path).map_err(|source| {
            XcistError::material_parse(&path, format!("failed to read material file: {source}"))
        })?;
        let material = Arc::new(parse_material_source(name, &path, &source)?);
        debug!(
            material = name,
            path = %path.display(),
            density = material.density(),
            elements = material.composition().len(),
            "loaded material"
        );

        let mut cache = self.lock_cache();
        let cached = cache
            .entry(name.to_string())
            .or_insert_with(|| Arc::clone(&material));
        Ok(Arc::clone(cached))
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Arc<Material>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn env_search_roots() -> Vec<PathBuf> {
    std::env::var_os(MATERIAL_PATH_ENV)
        .map(|value| split_search_path(&value))
        .unwrap_or_default()
}

fn split_search_path(value: &OsStr) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter(|path| !path.as_os_str().is_empty())
        .collect()
}
