//! Detector prefilter transmission weights.
//!
//! Each filter stage attenuates the beam in series. The resulting per-bin
//! weights are identical for every detector cell and are replicated into a
//! `[cells, bins]` array for uniform indexing downstream.

use crate::attenuation::{AttenuationEngine, EnergyQuery};
use crate::domain::{XcistError, XcistResult};
use crate::numerics::ShapedArray;
use serde::{Deserialize, Serialize};
use tracing::debug;

const MILLIMETERS_TO_CENTIMETERS: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterStage {
    pub material: String,
    pub thickness_mm: f64,
}

impl FilterStage {
    pub fn new(material: impl Into<String>, thickness_mm: f64) -> XcistResult<Self> {
        let material = material.into();
        if material.trim().is_empty() {
            return Err(XcistError::invalid_filter_stack("filter material name is empty"));
        }
        if !thickness_mm.is_finite() || thickness_mm < 0.0 {
            return Err(XcistError::invalid_filter_stack(format!(
                "thickness {thickness_mm} mm for '{material}' must be finite and non-negative"
            )));
        }
        Ok(Self {
            material,
            thickness_mm,
        })
    }
}

/// One slot of the flat `[name, thickness, name, thickness, ...]` list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PrefilterToken {
    Thickness(f64),
    Material(String),
}

/// Filter stages in beam order; empty means an unfiltered beam.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterStack {
    stages: Vec<FilterStage>,
}

impl FilterStack {
    pub fn new(stages: Vec<FilterStage>) -> Self {
        Self { stages }
    }

    pub fn from_flat(tokens: &[PrefilterToken]) -> XcistResult<Self> {
        if tokens.len() % 2 != 0 {
            return Err(XcistError::invalid_filter_stack(format!(
                "expected alternating material names and thicknesses, got {} entries",
                tokens.len()
            )));
        }

        let stages = tokens
            .chunks_exact(2)
            .enumerate()
            .map(|(index, pair)| match pair {
                [PrefilterToken::Material(name), PrefilterToken::Thickness(thickness)] => {
                    FilterStage::new(name.clone(), *thickness)
                }
                _ => Err(XcistError::invalid_filter_stack(format!(
                    "entries {} and {} must be a material name followed by a thickness in mm",
                    2 * index,
                    2 * index + 1
                ))),
            })
            .collect::<XcistResult<Vec<_>>>()?;

        Ok(Self { stages })
    }

    pub fn with_stage(
        mut self,
        material: impl Into<String>,
        thickness_mm: f64,
    ) -> XcistResult<Self> {
        self.stages.push(FilterStage::new(material, thickness_mm)?);
        Ok(self)
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Transmission through `stack`, shaped `[detector_cell_count, energies_kev.len()]`.
///
/// Every stage's material is resolved before any attenuation is computed.
pub fn prefilter_weights(
    engine: &AttenuationEngine<'_>,
    energies_kev: &[f64],
    stack: &FilterStack,
    detector_cell_count: usize,
) -> XcistResult<ShapedArray<f32>> {
    let materials = stack
        .stages()
        .iter()
        .map(|stage| engine.materials().load_material(&stage.material))
        .collect::<XcistResult<Vec<_>>>()?;

    let query = EnergyQuery::Array(ShapedArray::from_vec(energies_kev.to_vec()));
    let mut weights = vec![1.0_f32; energies_kev.len()];
    for (stage, material) in stack.stages().iter().zip(&materials) {
        let mu = engine.linear_attenuation(material, &query)?.to_f32_vec();
        let thickness_mm = stage.thickness_mm as f32;
        for (weight, mu) in weights.iter_mut().zip(mu) {
            *weight *= (-mu * thickness_mm * MILLIMETERS_TO_CENTIMETERS).exp();
        }
    }

    debug!(
        stages = stack.len(),
        bins = energies_kev.len(),
        cells = detector_cell_count,
        "computed detector prefilter weights"
    );
    ShapedArray::broadcast_rows(&weights, detector_cell_count)
}

#[cfg(test)]
mod tests {
    use super::{FilterStack, FilterStage, PrefilterToken, prefilter_weights};
    use crate::attenuation::AttenuationEngine;
    use crate::domain::XcistError;
    use crate::material::MaterialLibrary;
    use crate::xsdb::CrossSectionDatabase;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        database: CrossSectionDatabase,
        library: MaterialLibrary,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().expect("tempdir should be created");
        let xs = temp.path().join("xs");
        let materials = temp.path().join("materials");
        fs::create_dir_all(&xs).expect("xs dir");
        fs::create_dir_all(&materials).expect("materials dir");
        fs::write(xs.join("13.dat"), "10 26.23\n20 3.441\n40 0.5685\n80 0.2018\n").expect("al");
        fs::write(xs.join("8.dat"), "10 5.952\n20 0.8651\n40 0.2585\n80 0.1678\n").expect("o");
        fs::write(materials.join("al"), "2.699 1 13 1.0\n").expect("al material");
        fs::write(materials.join("ice"), "0.917 1 8 1.0\n").expect("ice material");

        let database = CrossSectionDatabase::default();
        database.initialize(&xs).expect("init");
        let library = MaterialLibrary::new([materials]);
        Fixture {
            _temp: temp,
            database,
            library,
        }
    }

    fn tokens(values: &[(&str, f64)]) -> Vec<PrefilterToken> {
        values
            .iter()
            .flat_map(|(name, thickness)| {
                [
                    PrefilterToken::Material((*name).to_string()),
                    PrefilterToken::Thickness(*thickness),
                ]
            })
            .collect()
    }

    #[test]
    fn from_flat_pairs_names_with_thicknesses() {
        let stack = FilterStack::from_flat(&tokens(&[("al", 0.1), ("water", 2.0)])).expect("stack");
        assert_eq!(
            stack.stages(),
            &[
                FilterStage::new("al", 0.1).expect("stage"),
                FilterStage::new("water", 2.0).expect("stage"),
            ]
        );
    }

    #[test]
    fn from_flat_rejects_malformed_lists() {
        let odd = vec![
            PrefilterToken::Material("al".to_string()),
            PrefilterToken::Thickness(0.1),
            PrefilterToken::Material("water".to_string()),
        ];
        let swapped = vec![
            PrefilterToken::Thickness(0.1),
            PrefilterToken::Material("al".to_string()),
        ];
        let negative = tokens(&[("al", -0.1)]);
        let infinite = tokens(&[("al", f64::INFINITY)]);

        for list in [odd, swapped, negative, infinite] {
            assert!(matches!(
                FilterStack::from_flat(&list),
                Err(XcistError::InvalidFilterStack { .. })
            ));
        }
    }

    #[test]
    fn flat_list_deserializes_from_mixed_json() {
        let parsed: Vec<PrefilterToken> =
            serde_json::from_str(r#"["al", 0.1, "water", 2]"#).expect("json");
        assert_eq!(parsed, tokens(&[("al", 0.1), ("water", 2.0)]));
    }

    #[test]
    fn empty_stack_is_all_ones() {
        let fixture = fixture();
        let engine = AttenuationEngine::new(&fixture.database, &fixture.library);

        let weights = prefilter_weights(&engine, &[10.0, 20.0, 40.0], &FilterStack::default(), 4)
            .expect("weights");
        assert_eq!(weights.shape(), &[4, 3]);
        assert!(weights.as_slice().iter().all(|weight| *weight == 1.0));
    }

    #[test]
    fn stages_multiply_in_series() {
        let fixture = fixture();
        let engine = AttenuationEngine::new(&fixture.database, &fixture.library);
        let energies = [10.0, 20.0, 40.0, 80.0];

        let al = FilterStack::default().with_stage("al", 0.1).expect("stage");
        let al_ice = al.clone().with_stage("ice", 2.0).expect("stage");
        let ice = FilterStack::default().with_stage("ice", 2.0).expect("stage");

        let w_al = prefilter_weights(&engine, &energies, &al, 1).expect("al");
        let w_ice = prefilter_weights(&engine, &energies, &ice, 1).expect("ice");
        let w_both = prefilter_weights(&engine, &energies, &al_ice, 1).expect("both");

        for index in 0..energies.len() {
            let (a, i, b) = (
                w_al.as_slice()[index],
                w_ice.as_slice()[index],
                w_both.as_slice()[index],
            );
            assert!(a > 0.0 && a <= 1.0);
            assert!(b <= a, "adding a stage must not raise bin {index}");
            assert_eq!(b, a * i);
        }
    }

    #[test]
    fn weights_follow_beer_lambert_in_centimeters() {
        let fixture = fixture();
        let engine = AttenuationEngine::new(&fixture.database, &fixture.library);
        let stack = FilterStack::default().with_stage("al", 1.0).expect("stage");

        let weights = prefilter_weights(&engine, &[20.0], &stack, 1).expect("weights");
        let mu = (3.441_f64 as f32) as f64 * 2.699;
        let expected = (-mu * 0.1).exp();
        assert!((f64::from(weights.as_slice()[0]) - expected).abs() < 1.0e-5);
    }

    #[test]
    fn thick_stacks_can_underflow_to_zero_in_single_precision() {
        let fixture = fixture();
        let engine = AttenuationEngine::new(&fixture.database, &fixture.library);
        let stack = FilterStack::default().with_stage("al", 30.0).expect("stage");

        let weights = prefilter_weights(&engine, &[10.0, 20.0], &stack, 1)
            .expect("weights");
        let [low, high] = weights.as_slice() else {
            panic!("expected two bins");
        };
        assert_eq!(*low, 0.0);
        assert!(*high > 0.0 && *high < 1.0e-11, "{high}");
    }

    #[test]
    fn unknown_material_fails_before_any_stage_is_computed() {
        let fixture = fixture();
        let engine = AttenuationEngine::new(&fixture.database, &fixture.library);
        let stack = FilterStack::default()
            .with_stage("al", 0.1)
            .and_then(|stack| stack.with_stage("unobtainium", 1.0))
            .expect("stack");

        let error = prefilter_weights(&engine, &[20.0], &stack, 3).expect_err("missing material");
        assert!(matches!(
            error,
            XcistError::MaterialNotFound { ref name, .. } if name == "unobtainium"
        ));
    }
}
