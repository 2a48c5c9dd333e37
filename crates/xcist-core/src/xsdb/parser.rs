use super::model::ElementCrossSection;
use crate::numerics::stable_sum;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub(super) enum CrossSectionFileError {
    #[error("line {line}: {reason}")]
    Row { line: usize, reason: String },
    #[error("expected at least two data rows, found {0}")]
    TooFewRows(usize),
    #[error("absorption edge may not sit at the first or last grid energy")]
    EdgeAtGridEnd,
}

fn row_error(line: usize, reason: impl Into<String>) -> CrossSectionFileError {
    CrossSectionFileError::Row {
        line,
        reason: reason.into(),
    }
}

/// Parses `energy_keV partial [partial ...]` rows into one total curve.
pub(super) fn parse_cross_section_source(
    atomic_number: u32,
    source: &str,
) -> Result<ElementCrossSection, CrossSectionFileError> {
    let mut energies: Vec<f64> = Vec::new();
    let mut totals = Vec::new();

    for (index, raw_line) in source.lines().enumerate() {
        let line = index + 1;
        let content = strip_comment(raw_line).trim();
        if content.is_empty() {
            continue;
        }

        let values = content
            .split_whitespace()
            .map(|token| parse_value(token, line))
            .collect::<Result<Vec<_>, _>>()?;
        let Some((&energy, partials)) = values.split_first() else {
            continue;
        };

        if partials.is_empty() {
            return Err(row_error(
                line,
                "expected an energy followed by at least one cross-section column",
            ));
        }
        if !energy.is_finite() || energy <= 0.0 {
            return Err(row_error(line, format!("energy {energy} must be finite and positive")));
        }
        if partials.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return Err(row_error(
                line,
                "partial cross sections must be finite and non-negative",
            ));
        }

        let total = stable_sum(partials);
        if total <= 0.0 {
            return Err(row_error(line, "total mass attenuation must be positive"));
        }

        if let Some(&previous) = energies.last() {
            if energy < previous {
                return Err(row_error(
                    line,
                    format!(
                        "energy {energy} keV follows {previous} keV; grid must be non-decreasing"
                    ),
                ));
            }
            let repeats_twice = energies.len() >= 2 && energies[energies.len() - 2] == energy;
            if energy == previous && repeats_twice {
                return Err(row_error(
                    line,
                    format!("energy {energy} keV appears more than twice"),
                ));
            }
        }

        energies.push(energy);
        totals.push(total);
    }

    if energies.len() < 2 {
        return Err(CrossSectionFileError::TooFewRows(energies.len()));
    }
    let last = energies.len() - 1;
    if energies[0] == energies[1] || energies[last] == energies[last - 1] {
        return Err(CrossSectionFileError::EdgeAtGridEnd);
    }

    Ok(ElementCrossSection::new(atomic_number, energies, totals))
}

fn strip_comment(line: &str) -> &str {
    match line.split_once('#') {
        Some((content, _)) => content,
        None => line,
    }
}

fn parse_value(token: &str, line: usize) -> Result<f64, CrossSectionFileError> {
    let normalized = token.replace(['D', 'd'], "E");
    normalized
        .parse::<f64>()
        .map_err(|_| row_error(line, format!("'{token}' is not a number")))
}
