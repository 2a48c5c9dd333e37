use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementFraction {
    pub atomic_number: u32,
    pub mass_fraction: f64,
}

/// Density and elemental make-up of a material; mass fractions sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    name: String,
    source_path: PathBuf,
    density: f64,
    composition: Vec<ElementFraction>,
}

impl Material {
    pub fn new(
        name: impl Into<String>,
        source_path: impl Into<PathBuf>,
        density: f64,
        composition: Vec<ElementFraction>,
    ) -> Self {
        Self {
            name: name.into(),
            source_path: source_path.into(),
            density,
            composition,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Density in g/cm³.
    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn composition(&self) -> &[ElementFraction] {
        &self.composition
    }

    pub fn mass_fraction_sum(&self) -> f64 {
        self.composition
            .iter()
            .map(|element| element.mass_fraction)
            .sum()
    }
}
