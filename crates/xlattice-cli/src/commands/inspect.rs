use crate::cli::InspectArgs;
use crate::config::PartialJobConfig;
use crate::error::Result;
use crate::utils::report;
use tracing::info;
use xlattice::engine::lattice::LatticeUnit;

pub fn run(args: InspectArgs) -> Result<()> {
    let job = PartialJobConfig::from_file(&args.job.config)?.merge_with_job_args(&args.job)?;
    if !job.operations.is_empty() {
        info!(
            "Ignoring {} operation(s); inspect only analyzes the unit cell.",
            job.operations.len()
        );
    }

    let unit = LatticeUnit::new(job.graph, &job.lattice);
    print!("{}", report::format_inspection(&unit, args.faces, args.pairs));
    Ok(())
}
