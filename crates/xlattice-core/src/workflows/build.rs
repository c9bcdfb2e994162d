use crate::core::periodicity::PeriodicityWarning;
use crate::engine::config::Operation;
use crate::engine::distribution::DiameterDistribution;
use crate::engine::error::LatticeError;
use crate::engine::lattice::{Apply, LatticeUnit};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{debug, info, instrument};

/// Shape of the unit after one pipeline step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub operation: &'static str,
    pub nodes: usize,
    pub edges: usize,
    pub fully_periodic: bool,
}

#[derive(Debug, Clone)]
pub struct BuildResult {
    pub unit: LatticeUnit,
    pub steps: Vec<StepReport>,
    /// Periodicity warnings of the final unit.
    pub warnings: Vec<PeriodicityWarning>,
}

#[instrument(skip_all, name = "build_workflow")]
pub fn run(
    mut unit: LatticeUnit,
    operations: &[Operation],
    reporter: &ProgressReporter,
) -> Result<BuildResult, LatticeError> {
    info!(
        nodes = unit.node_count(),
        edges = unit.edge_count(),
        operations = operations.len(),
        "Starting build workflow."
    );

    let mut steps = Vec::with_capacity(operations.len());
    for (index, operation) in operations.iter().enumerate() {
        reporter.report(Progress::Message(format!(
            "Step {}/{}: {}",
            index + 1,
            operations.len(),
            operation.name()
        )));
        apply_operation(&mut unit, operation, reporter)?;

        let step = StepReport {
            operation: operation.name(),
            nodes: unit.node_count(),
            edges: unit.edge_count(),
            fully_periodic: unit.is_fully_periodic(),
        };
        debug!(?step, "Operation applied.");
        steps.push(step);
    }

    let warnings = unit.warnings().to_vec();
    info!(
        nodes = unit.node_count(),
        edges = unit.edge_count(),
        fully_periodic = unit.is_fully_periodic(),
        warnings = warnings.len(),
        "Build workflow complete."
    );
    Ok(BuildResult {
        unit,
        steps,
        warnings,
    })
}

fn apply_operation(
    unit: &mut LatticeUnit,
    operation: &Operation,
    reporter: &ProgressReporter,
) -> Result<(), LatticeError> {
    let apply = Apply::InPlace;
    match operation {
        Operation::Translate(delta) => unit.translate(*delta, apply).map(drop),
        Operation::Scale(factors) => unit.scale(*factors, apply).map(drop),
        Operation::Flip(axis) => unit.flip(*axis, apply).map(drop),
        Operation::Mirror(face) => unit.mirror(*face, apply).map(drop),
        Operation::Tessellate(counts) => unit.tessellate(*counts, apply, reporter).map(drop),
        Operation::DiameterConstant { value, mode } => {
            let distribution = DiameterDistribution::constant(*value, *mode);
            unit.apply_diameter_distribution(&distribution, apply)
                .map(drop)
        }
        Operation::DiameterGradient { axis, from, to } => {
            let distribution = DiameterDistribution::gradient(*axis, *from, *to, unit.extents());
            unit.apply_diameter_distribution(&distribution, apply)
                .map(drop)
        }
        Operation::DiameterByInclination {
            reference,
            aligned,
            perpendicular,
        } => {
            let distribution =
                DiameterDistribution::by_inclination(*reference, *aligned, *perpendicular);
            unit.apply_diameter_distribution(&distribution, apply)
                .map(drop)
        }
    }
}
