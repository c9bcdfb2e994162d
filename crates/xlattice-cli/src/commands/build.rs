use crate::cli::BuildArgs;
use crate::config::PartialJobConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use crate::utils::report;
use tracing::{info, warn};
use xlattice::engine::lattice::LatticeUnit;
use xlattice::engine::progress::ProgressReporter;
use xlattice::workflows;

pub fn run(args: BuildArgs) -> Result<()> {
    let partial_config = PartialJobConfig::from_file(&args.job.config)?;
    info!("Merging job file with CLI arguments...");
    let job = partial_config.merge_with_cli(&args)?;

    let unit = LatticeUnit::new(job.graph, &job.lattice);
    if !unit.is_fully_periodic() {
        warn!(
            "The input unit cell is not fully periodic ({} warning(s)).",
            unit.warnings().len()
        );
    }

    let progress_handler = if args.no_progress {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Building lattice: {} operation(s) on a {}-node unit cell...",
        job.operations.len(),
        unit.node_count()
    );
    let result = workflows::build::run(unit, &job.operations, &reporter)?;
    info!(
        "Workflow finished with {} node(s) and {} edge(s).",
        result.unit.node_count(),
        result.unit.edge_count()
    );

    print!("{}", report::format_build_summary(&result));
    for warning in &result.warnings {
        warn!("{}", warning);
    }
    Ok(())
}
