use super::model::{ElementFraction, Material};
use crate::common::elements::is_valid_atomic_number;
use crate::domain::{XcistError, XcistResult};
use std::path::Path;

pub const MASS_FRACTION_TOLERANCE: f64 = 1.0e-3;

/// Parses `density count (Z fraction){count}` from whitespace-separated tokens.
pub(crate) fn parse_material_source(
    name: &str,
    path: &Path,
    source: &str,
) -> XcistResult<Material> {
    let tokens = source
        .lines()
        .map(strip_comment)
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>();

    if tokens.len() < 2 {
        return Err(XcistError::material_parse(
            path,
            format!("expected density and element count, found {} field(s)", tokens.len()),
        ));
    }

    let density = parse_float(path, tokens[0], "density")?;
    if !density.is_finite() || density <= 0.0 {
        return Err(XcistError::material_parse(
            path,
            format!("density {density} must be finite and positive"),
        ));
    }

    let element_count = tokens[1].parse::<usize>().map_err(|_| {
        XcistError::material_parse(
            path,
            format!("element count '{}' is not a non-negative integer", tokens[1]),
        )
    })?;
    if element_count == 0 {
        return Err(XcistError::material_parse(path, "element count must be positive"));
    }

    let pair_tokens = &tokens[2..];
    if element_count.checked_mul(2) != Some(pair_tokens.len()) {
        return Err(XcistError::material_parse(
            path,
            format!(
                "expected {} (atomic number, mass fraction) pairs, found {} field(s)",
                element_count,
                pair_tokens.len()
            ),
        ));
    }

    let mut composition = Vec::with_capacity(element_count);
    for pair in pair_tokens.chunks_exact(2) {
        let atomic_number = parse_atomic_number(path, pair[0])?;
        let mass_fraction = parse_float(path, pair[1], "mass fraction")?;
        if !mass_fraction.is_finite() || mass_fraction < 0.0 {
            return Err(XcistError::material_parse(
                path,
                format!(
                    "mass fraction {mass_fraction} for Z={atomic_number} must be finite and non-negative"
                ),
            ));
        }
        composition.push(ElementFraction {
            atomic_number,
            mass_fraction,
        });
    }

    let material = Material::new(name, path, density, composition);
    let total = material.mass_fraction_sum();
    if (total - 1.0).abs() > MASS_FRACTION_TOLERANCE {
        return Err(XcistError::material_parse(
            path,
            format!("mass fractions sum to {total}, expected 1 within {MASS_FRACTION_TOLERANCE}"),
        ));
    }

    Ok(material)
}

fn strip_comment(line: &str) -> &str {
    match line.split_once('#') {
        Some((content, _)) => content,
        None => line,
    }
}

fn parse_float(path: &Path, token: &str, field: &str) -> XcistResult<f64> {
    token
        .parse::<f64>()
        .map_err(|_| XcistError::material_parse(path, format!("{field} '{token}' is not a number")))
}

fn parse_atomic_number(path: &Path, token: &str) -> XcistResult<u32> {
    // Some material files write atomic numbers as floats ("8.0").
    let value = parse_float(path, token, "atomic number")?;
    let rounded = value.round();
    if value != rounded || !is_valid_atomic_number(rounded as u32) {
        return Err(XcistError::material_parse(
            path,
            format!("atomic number '{token}' is not an integer in 1..=118"),
        ));
    }
    Ok(rounded as u32)
}
