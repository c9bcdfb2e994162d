use std::fmt::Write;
use xlattice::core::models::ids::NodeId;
use xlattice::core::utils::geometry::{Axis, Side};
use xlattice::engine::lattice::LatticeUnit;
use xlattice::workflows::build::BuildResult;

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn join_ids<'a>(ids: impl IntoIterator<Item = &'a NodeId>) -> String {
    ids.into_iter()
        .map(NodeId::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Counts, extents and per-axis periodicity of a unit.
pub fn format_unit(unit: &LatticeUnit) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Nodes:            {}", unit.node_count());
    let _ = writeln!(out, "  Edges:            {}", unit.edge_count());
    let _ = writeln!(out, "  Extents:          {}", unit.extents());
    let _ = writeln!(out, "  Tolerance:        {}", unit.tolerance());
    let _ = writeln!(
        out,
        "  Fully periodic:   {}",
        yes_no(unit.is_fully_periodic())
    );
    for axis in Axis::ALL {
        let _ = writeln!(
            out,
            "    {}: periodic={:<3}  pairs={:<4}  min-face={:<4}  max-face={}",
            axis,
            yes_no(unit.is_periodic(axis)),
            unit.map(axis).len(),
            unit.face(axis, Side::Min).len(),
            unit.face(axis, Side::Max).len(),
        );
    }
    out
}

pub fn format_build_summary(result: &BuildResult) -> String {
    let mut out = String::from("Build summary\n");
    if !result.steps.is_empty() {
        let _ = writeln!(out, "  Steps:");
        for (i, step) in result.steps.iter().enumerate() {
            let _ = writeln!(
                out,
                "    {}. {:<24} nodes={:<6} edges={:<6} fully-periodic={}",
                i + 1,
                step.operation,
                step.nodes,
                step.edges,
                yes_no(step.fully_periodic)
            );
        }
    }
    out.push_str(&format_unit(&result.unit));
    let _ = writeln!(out, "  Warnings:         {}", result.warnings.len());
    out
}

/// Analysis report for `inspect`, optionally listing faces and pairs.
pub fn format_inspection(unit: &LatticeUnit, faces: bool, pairs: bool) -> String {
    let mut out = String::from("Unit cell analysis\n");
    out.push_str(&format_unit(unit));

    if faces {
        let _ = writeln!(out, "  Faces:");
        for axis in Axis::ALL {
            for side in [Side::Min, Side::Max] {
                let _ = writeln!(
                    out,
                    "    {}{}: [{}]",
                    match side {
                        Side::Min => '-',
                        Side::Max => '+',
                    },
                    axis,
                    join_ids(unit.face(axis, side))
                );
            }
        }
    }

    if pairs {
        let _ = writeln!(out, "  Periodic pairs (min -> max):");
        for axis in Axis::ALL {
            let listed: Vec<String> = unit
                .map(axis)
                .pairs()
                .map(|(min, max)| format!("{}->{}", min, max))
                .collect();
            let _ = writeln!(out, "    {}: [{}]", axis, listed.join(", "));
        }
    }

    if !unit.warnings().is_empty() {
        let _ = writeln!(out, "  Warnings:");
        for warning in unit.warnings() {
            let _ = writeln!(out, "    - {}", warning);
        }
    }
    out
}
