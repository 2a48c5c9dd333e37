use super::CliError;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use xcist_core::{EngineConfig, FilterStage, load_engine_config};

pub(super) const DEFAULT_CROSS_SECTION_DIR: &str = "data/cross_sections";
pub(super) const DEFAULT_MATERIAL_DIR: &str = "data/materials";

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` overrides the `warn` default.
pub(super) fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub(super) fn resolve_engine_config(config_path: Option<&Path>) -> Result<EngineConfig, CliError> {
    match config_path {
        Some(path) => Ok(load_engine_config(path).context("engine configuration")?),
        None => {
            let working_dir =
                std::env::current_dir().context("failed to read current working directory")?;
            Ok(default_engine_config(&working_dir))
        }
    }
}

fn default_engine_config(working_dir: &Path) -> EngineConfig {
    EngineConfig::new(
        working_dir.join(DEFAULT_CROSS_SECTION_DIR),
        vec![working_dir.join(DEFAULT_MATERIAL_DIR)],
    )
}

/// Parses `name:thickness_mm`, e.g. `al:0.1`.
pub(super) fn parse_filter_stage(value: &str) -> Result<FilterStage, String> {
    let (material, thickness) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("expected <material>:<thickness_mm>, got '{value}'"))?;
    let thickness_mm: f64 = thickness
        .trim()
        .parse()
        .map_err(|_| format!("invalid thickness '{thickness}' in '{value}'"))?;
    FilterStage::new(material.trim(), thickness_mm).map_err(|error| error.to_string())
}

pub(super) fn format_row(values: &[f32]) -> String {
    values
        .iter()
        .map(|value| format!("{value:.6e}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(super) fn config_path_display(config_path: Option<&PathBuf>) -> String {
    config_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<defaults>".to_string())
}

#[cfg(test)]
mod tests {
    use super::{default_engine_config, format_row, parse_filter_stage};
    use std::path::Path;

    #[test]
    fn filter_stage_argument_splits_on_last_colon() {
        let stage = parse_filter_stage("water:2").expect("stage");
        assert_eq!(stage.material, "water");
        assert_eq!(stage.thickness_mm, 2.0);

        let stage = parse_filter_stage("C:/filters/al:0.5").expect("path stage");
        assert_eq!(stage.material, "C:/filters/al");
        assert_eq!(stage.thickness_mm, 0.5);
    }

    #[test]
    fn malformed_filter_arguments_are_rejected() {
        for value in ["al", "al:", "al:thick", ":1.0", "al:-1", "al:inf"] {
            assert!(
                parse_filter_stage(value).is_err(),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn defaults_point_at_the_bundled_data_layout() {
        let config = default_engine_config(Path::new("/work"));
        assert_eq!(
            config.cross_section_directory,
            Path::new("/work/data/cross_sections")
        );
        assert_eq!(
            config.material_search_roots,
            vec![Path::new("/work/data/materials").to_path_buf()]
        );
    }

    #[test]
    fn rows_use_scientific_notation() {
        assert_eq!(format_row(&[1.0, 0.25]), "1.000000e0 2.500000e-1");
    }
}
