use super::CliError;
use super::helpers::*;
use std::path::PathBuf;
use tracing::info;
use xcist_core::common::elements::element_symbol;
use xcist_core::{AttenuationEngine, EnergyQuery, FilterStack, FilterStage, prefilter_weights};

#[derive(clap::Args)]
pub(super) struct MuArgs {
    /// Material name or path to a material file
    #[arg(long)]
    material: String,

    /// Photon energies in keV, comma separated
    #[arg(long, required = true, value_delimiter = ',', num_args = 1..)]
    energies: Vec<f64>,

    #[command(flatten)]
    engine: EngineFlags,
}

#[derive(clap::Args)]
pub(super) struct PrefilterArgs {
    /// Energy bin centers in keV, comma separated
    #[arg(long, required = true, value_delimiter = ',', num_args = 1..)]
    energies: Vec<f64>,

    /// Filter stage as <material>:<thickness_mm>; repeat in beam order
    #[arg(long = "filter", value_parser = parse_filter_stage)]
    filters: Vec<FilterStage>,

    /// Detector cell count; defaults to the configured value
    #[arg(long)]
    cells: Option<usize>,

    #[command(flatten)]
    engine: EngineFlags,
}

#[derive(clap::Args)]
pub(super) struct ElementsArgs {
    #[command(flatten)]
    engine: EngineFlags,
}

#[derive(clap::Args)]
struct EngineFlags {
    /// Engine configuration JSON; defaults to ./data/cross_sections and ./data/materials
    #[arg(long)]
    config: Option<PathBuf>,
}

pub(super) fn run_mu_command(args: MuArgs) -> Result<i32, CliError> {
    let config = resolve_engine_config(args.engine.config.as_deref())?;
    let database = config.open_database()?;
    let library = config.material_library();
    let engine = AttenuationEngine::new(&database, &library);

    let mu = engine
        .mu_for_name(&args.material, &EnergyQuery::List(args.energies.clone()))?
        .to_f64_vec();
    for (energy, mu) in args.energies.iter().zip(mu) {
        println!("{energy} {mu:.6e}");
    }
    Ok(0)
}

pub(super) fn run_prefilter_command(args: PrefilterArgs) -> Result<i32, CliError> {
    let config = resolve_engine_config(args.engine.config.as_deref())?;
    let stack = if args.filters.is_empty() {
        config.filter_stack()?
    } else {
        FilterStack::new(args.filters)
    };
    let cells = args.cells.unwrap_or(config.detector_cell_count);

    let database = config.open_database()?;
    let library = config.material_library();
    let engine = AttenuationEngine::new(&database, &library);

    info!(
        config = %config_path_display(args.engine.config.as_ref()),
        stages = stack.len(),
        cells,
        "running prefilter"
    );
    let weights = prefilter_weights(&engine, &args.energies, &stack, cells)?;
    for row in weights.rows() {
        println!("{}", format_row(row));
    }
    Ok(0)
}

pub(super) fn run_elements_command(args: ElementsArgs) -> Result<i32, CliError> {
    let config = resolve_engine_config(args.engine.config.as_deref())?;
    let database = config.open_database()?;

    for atomic_number in database.atomic_numbers() {
        let (min_kev, max_kev) = database.energy_range(atomic_number)?;
        let symbol = element_symbol(atomic_number).unwrap_or("?");
        println!("{atomic_number} {symbol} {min_kev} {max_kev}");
    }
    Ok(0)
}
