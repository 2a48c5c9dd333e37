//! Linear attenuation coefficients for materials over arbitrary energy shapes.
//!
//! Energies are flattened with their shape recorded, pushed through the
//! mass-fraction mixing rule, scaled by density and restored to the caller's
//! shape. Array inputs come back in single precision.

use crate::domain::{XcistError, XcistResult};
use crate::material::{Material, MaterialLibrary};
use crate::numerics::{ShapedArray, kahan_add};
use crate::xsdb::CrossSectionDatabase;

/// Photon energies in keV.
#[derive(Debug, Clone, PartialEq)]
pub enum EnergyQuery {
    Scalar(f64),
    List(Vec<f64>),
    Array(ShapedArray<f64>),
}

impl From<f64> for EnergyQuery {
    fn from(energy: f64) -> Self {
        Self::Scalar(energy)
    }
}

impl From<Vec<f64>> for EnergyQuery {
    fn from(energies: Vec<f64>) -> Self {
        Self::List(energies)
    }
}

impl From<&[f64]> for EnergyQuery {
    fn from(energies: &[f64]) -> Self {
        Self::List(energies.to_vec())
    }
}

impl From<ShapedArray<f64>> for EnergyQuery {
    fn from(energies: ShapedArray<f64>) -> Self {
        Self::Array(energies)
    }
}

impl EnergyQuery {
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Scalar(_) => Vec::new(),
            Self::List(energies) => vec![energies.len()],
            Self::Array(energies) => energies.shape().to_vec(),
        }
    }

    /// Splits the query into its shape and a flat, row-major energy list.
    pub fn flatten(&self) -> (QueryShape, Vec<f64>) {
        match self {
            Self::Scalar(energy) => (QueryShape::Scalar, vec![*energy]),
            Self::List(energies) => (QueryShape::List(energies.len()), energies.clone()),
            Self::Array(energies) => (
                QueryShape::Array(energies.shape().to_vec()),
                energies.as_slice().to_vec(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryShape {
    Scalar,
    List(usize),
    Array(Vec<usize>),
}

impl QueryShape {
    pub fn restore(self, values: Vec<f64>) -> XcistResult<Attenuation> {
        match self {
            Self::Scalar => match values.as_slice() {
                [value] => Ok(Attenuation::Scalar(*value)),
                _ => Err(XcistError::InvalidShape {
                    shape: Vec::new(),
                    reason: format!("scalar query produced {} values", values.len()),
                }),
            },
            Self::List(length) if length == values.len() => Ok(Attenuation::List(values)),
            Self::List(length) => Err(XcistError::InvalidShape {
                shape: vec![length],
                reason: format!("list query produced {} values", values.len()),
            }),
            Self::Array(shape) => {
                let narrowed = values.into_iter().map(|value| value as f32).collect();
                ShapedArray::from_shape_vec(shape, narrowed).map(Attenuation::Array)
            }
        }
    }
}

/// Linear attenuation coefficients in 1/cm, shaped like the query.
#[derive(Debug, Clone, PartialEq)]
pub enum Attenuation {
    Scalar(f64),
    List(Vec<f64>),
    Array(ShapedArray<f32>),
}

impl Attenuation {
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Scalar(_) => Vec::new(),
            Self::List(values) => vec![values.len()],
            Self::Array(values) => values.shape().to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::List(values) => values.len(),
            Self::Array(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Self::Scalar(value) => vec![*value],
            Self::List(values) => values.clone(),
            Self::Array(values) => values
                .as_slice()
                .iter()
                .map(|value| f64::from(*value))
                .collect(),
        }
    }

    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            Self::Scalar(value) => vec![*value as f32],
            Self::List(values) => values.iter().map(|value| *value as f32).collect(),
            Self::Array(values) => values.as_slice().to_vec(),
        }
    }
}

/// Mass-fraction weighted mass attenuation (cm²/g) of `material`.
pub fn mixture_mass_attenuation(
    database: &CrossSectionDatabase,
    material: &Material,
    energies_kev: &[f64],
) -> XcistResult<Vec<f64>> {
    let mut sums = vec![0.0; energies_kev.len()];
    let mut corrections = vec![0.0; energies_kev.len()];

    for element in material.composition() {
        let curve = database.mass_attenuation_coefficient(element.atomic_number, energies_kev)?;
        for ((sum, correction), value) in sums.iter_mut().zip(&mut corrections).zip(curve) {
            kahan_add(sum, correction, element.mass_fraction * value);
        }
    }

    Ok(sums)
}

pub fn linear_attenuation(
    database: &CrossSectionDatabase,
    material: &Material,
    query: &EnergyQuery,
) -> XcistResult<Attenuation> {
    let (shape, energies) = query.flatten();
    let mass_attenuation = mixture_mass_attenuation(database, material, &energies)?;

    let density = material.density();
    // The mixed coefficient crosses a single-precision boundary before the
    // density multiply, as the tabulated-data routine always returned floats.
    let mu = mass_attenuation
        .into_iter()
        .map(|mac| f64::from(mac as f32) * density)
        .collect();
    shape.restore(mu)
}

/// Attenuation queries against one database and one material library.
#[derive(Debug, Clone, Copy)]
pub struct AttenuationEngine<'a> {
    database: &'a CrossSectionDatabase,
    materials: &'a MaterialLibrary,
}

impl<'a> AttenuationEngine<'a> {
    pub fn new(database: &'a CrossSectionDatabase, materials: &'a MaterialLibrary) -> Self {
        Self {
            database,
            materials,
        }
    }

    pub fn database(&self) -> &'a CrossSectionDatabase {
        self.database
    }

    pub fn materials(&self) -> &'a MaterialLibrary {
        self.materials
    }

    pub fn linear_attenuation(
        &self,
        material: &Material,
        query: &EnergyQuery,
    ) -> XcistResult<Attenuation> {
        linear_attenuation(self.database, material, query)
    }

    pub fn mu_for_name(&self, name: &str, query: &EnergyQuery) -> XcistResult<Attenuation> {
        let material = self.materials.load_material(name)?;
        self.linear_attenuation(&material, query)
    }
}
