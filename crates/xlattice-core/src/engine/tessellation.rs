use super::error::{LatticeError, ValidationError};
use super::lattice::{Apply, LatticeHandle, LatticeUnit};
use super::progress::{Progress, ProgressReporter};
use crate::core::models::graph::GeometricGraph;
use crate::core::models::ids::NodeId;
use crate::core::utils::geometry::Axis;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Validated replication counts, one per axis, each at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replication {
    counts: [usize; 3],
}

impl Replication {
    pub fn new(nx: i64, ny: i64, nz: i64) -> Result<Self, ValidationError> {
        let mut counts = [1usize; 3];
        for (axis, count) in Axis::ALL.into_iter().zip([nx, ny, nz]) {
            counts[axis.index()] = usize::try_from(count)
                .ok()
                .filter(|&c| c >= 1)
                .ok_or(ValidationError::ReplicationCount { axis, count })?;
        }
        Ok(Self { counts })
    }

    pub fn count(&self, axis: Axis) -> usize {
        self.counts[axis.index()]
    }

    pub fn cells(&self) -> usize {
        self.counts.iter().product()
    }

    pub fn is_identity(&self) -> bool {
        self.counts == [1, 1, 1]
    }
}

impl TryFrom<[i64; 3]> for Replication {
    type Error = ValidationError;

    fn try_from([nx, ny, nz]: [i64; 3]) -> Result<Self, Self::Error> {
        Self::new(nx, ny, nz)
    }
}

/// Node ids of one placed cell: unit node id -> id in the composed graph.
type CellImage = BTreeMap<NodeId, NodeId>;

/// Replicates a unit cell along x, then y, then z, fusing each new copy onto
/// the previous one through the unit's periodicity maps.
///
/// The maps of the original unit are carried through every placed cell, so
/// a seam created by an earlier axis pass is fused correctly when that block
/// is copied again along a later axis.
pub struct TessellationEngine<'u> {
    unit: &'u LatticeUnit,
}

impl<'u> TessellationEngine<'u> {
    pub fn new(unit: &'u LatticeUnit) -> Self {
        Self { unit }
    }

    #[instrument(skip_all, name = "tessellation")]
    pub fn run(
        &self,
        replication: Replication,
        reporter: &ProgressReporter,
    ) -> Result<GeometricGraph, LatticeError> {
        let unit = self.unit;
        let mut graph = unit.graph().clone();
        let mut cells: Vec<CellImage> = vec![unit.graph().node_ids().map(|id| (id, id)).collect()];

        info!(
            nx = replication.count(Axis::X),
            ny = replication.count(Axis::Y),
            nz = replication.count(Axis::Z),
            nodes = graph.node_count(),
            "Tessellating unit cell."
        );

        for axis in Axis::ALL {
            let count = replication.count(axis);
            if count == 1 {
                continue;
            }
            if !unit.is_periodic(axis) {
                warn!(
                    axis = %axis,
                    "Unit is not periodic along this axis; unmatched boundary nodes stay unfused."
                );
            }

            reporter.report(Progress::PhaseStart {
                name: phase_name(axis),
            });
            self.replicate_along(axis, count, &mut graph, &mut cells, reporter)?;
            reporter.report(Progress::PhaseFinish);

            debug!(
                axis = %axis,
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "Finished axis pass."
            );
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Tessellation complete."
        );
        Ok(graph)
    }

    fn replicate_along(
        &self,
        axis: Axis,
        count: usize,
        graph: &mut GeometricGraph,
        cells: &mut Vec<CellImage>,
        reporter: &ProgressReporter,
    ) -> Result<(), LatticeError> {
        let length = self.unit.extents().length(axis);
        let base = graph.clone();
        let base_cells = cells.clone();
        let seams = seam_pairs(self.unit, axis, &base_cells);

        let mut previous: CellImage = base.node_ids().map(|id| (id, id)).collect();
        reporter.task((count - 1) as u64, |step| -> Result<(), LatticeError> {
            let offset = axis.unit_vector() * (length * (step + 1) as f64);

            let mut image = CellImage::new();
            for id in base.node_ids() {
                let target = match seams.get(&id).and_then(|max| previous.get(max)) {
                    Some(&fused) => fused,
                    None => graph.allocate_id()?,
                };
                image.insert(id, target);
            }

            let mut shifted = base.clone();
            shifted.update_positions(|_, p| *p += offset);
            let stats = graph.merge_from(&shifted, &image)?;
            debug!(
                axis = %axis,
                copy = step + 1,
                added = stats.added_nodes,
                fused = stats.fused_nodes,
                "Placed replica."
            );

            for cell in &base_cells {
                cells.push(
                    cell.iter()
                        .filter_map(|(unit_id, base_id)| Some((*unit_id, *image.get(base_id)?)))
                        .collect(),
                );
            }
            previous = image;
            Ok(())
        })?;
        Ok(())
    }
}

/// For every base-graph node that is the image of a unit min-face node, the
/// base-graph image of its max-face partner in the same cell.
fn seam_pairs(unit: &LatticeUnit, axis: Axis, cells: &[CellImage]) -> BTreeMap<NodeId, NodeId> {
    let mut seams = BTreeMap::new();
    for cell in cells {
        for (min_node, max_node) in unit.map(axis).pairs() {
            if let (Some(&from), Some(&to)) = (cell.get(&min_node), cell.get(&max_node)) {
                seams.entry(from).or_insert(to);
            }
        }
    }
    seams
}

fn phase_name(axis: Axis) -> &'static str {
    match axis {
        Axis::X => "Tessellating along x",
        Axis::Y => "Tessellating along y",
        Axis::Z => "Tessellating along z",
    }
}

impl LatticeUnit {
    /// Replicates the unit `nx × ny × nz` times and fuses matched boundary
    /// nodes. The result is re-analyzed with the same tolerance.
    pub fn tessellate(
        &mut self,
        counts: [i64; 3],
        apply: Apply,
        reporter: &ProgressReporter,
    ) -> Result<LatticeHandle<'_>, LatticeError> {
        let replication = Replication::try_from(counts)?;
        let graph = TessellationEngine::new(self).run(replication, reporter)?;
        self.apply_with(apply, move |unit| {
            unit.replace_graph(graph);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::lattice::fixtures::*;
    use nalgebra::Point3;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    fn silent() -> ProgressReporter<'static> {
        ProgressReporter::new()
    }

    fn sorted_positions(unit: &LatticeUnit) -> Vec<[f64; 3]> {
        let mut points: Vec<[f64; 3]> = unit
            .graph()
            .nodes_iter()
            .map(|n| [n.position.x, n.position.y, n.position.z])
            .collect();
        points.sort_by(|a, b| a.partial_cmp(b).unwrap());
        points
    }

    fn has_duplicate_positions(unit: &LatticeUnit) -> bool {
        let points = sorted_positions(unit);
        points
            .windows(2)
            .any(|w| (0..3).all(|i| (w[0][i] - w[1][i]).abs() < 1e-9))
    }

    mod replication {
        use super::*;

        #[test]
        fn rejects_counts_below_one() {
            assert_eq!(
                Replication::new(1, 0, 1),
                Err(ValidationError::ReplicationCount {
                    axis: Axis::Y,
                    count: 0
                })
            );
            assert!(Replication::new(-2, 1, 1).is_err());
        }

        #[test]
        fn counts_cells() {
            let replication = Replication::new(2, 3, 4).unwrap();
            assert_eq!(replication.cells(), 24);
            assert!(!replication.is_identity());
            assert!(Replication::new(1, 1, 1).unwrap().is_identity());
        }

        #[test]
        fn invalid_counts_leave_the_unit_untouched() {
            let mut unit = simple_cubic();
            let result = unit.tessellate([2, 0, 1], Apply::InPlace, &silent());
            assert!(matches!(
                result,
                Err(LatticeError::Validation(
                    ValidationError::ReplicationCount { .. }
                ))
            ));
            assert_eq!(unit, simple_cubic());
        }
    }

    mod counts {
        use super::*;

        #[test]
        fn identity_tessellation_is_a_no_op() {
            let mut unit = simple_cubic();
            let before = unit.positions();
            let handle = unit.tessellate([1, 1, 1], Apply::Copy, &silent()).unwrap();
            assert_eq!(handle.node_count(), 8);
            assert_eq!(handle.edge_count(), 12);
            assert_eq!(handle.positions(), before);
        }

        #[test]
        fn segment_becomes_a_connected_path() {
            let mut unit = segment();
            let handle = unit.tessellate([3, 1, 1], Apply::Copy, &silent()).unwrap();

            assert_eq!(handle.node_count(), 4);
            assert_eq!(handle.edge_count(), 3);
            assert!(handle.graph().is_connected());
            assert_eq!(handle.extents().min_of(Axis::X), 0.0);
            assert_eq!(handle.extents().max_of(Axis::X), 3.0);
            assert!(!has_duplicate_positions(&handle));
            for node in handle.graph().nodes_iter() {
                assert!(handle.graph().degree(node.id).unwrap() <= 2);
            }
        }

        #[test]
        fn node_count_follows_the_fusion_formula() {
            let unit = simple_cubic();
            let k = unit.node_count();
            let p = unit.map(Axis::X).len();
            for n in 1..=4 {
                let mut copy = unit.clone();
                let handle = copy.tessellate([n, 1, 1], Apply::InPlace, &silent()).unwrap();
                assert_eq!(handle.node_count(), k + (n as usize - 1) * (k - p));
                assert!(handle.graph().is_connected());
            }
        }

        #[test]
        fn simple_cubic_grid_has_no_duplicate_nodes_or_edges() {
            let mut unit = simple_cubic();
            let handle = unit.tessellate([2, 3, 2], Apply::Copy, &silent()).unwrap();

            // (nx+1)(ny+1)(nz+1) grid points.
            assert_eq!(handle.node_count(), 3 * 4 * 3);
            // Edges along x: nx(ny+1)(nz+1), and cyclically.
            assert_eq!(handle.edge_count(), 2 * 4 * 3 + 3 * 3 * 3 + 2 * 3 * 4);
            assert!(!has_duplicate_positions(&handle));
            assert!(handle.is_fully_periodic());
            assert_eq!(
                handle.extents().max,
                Point3::new(2.0, 3.0, 2.0)
            );
        }

        #[test]
        fn body_centred_cubic_shares_corners_between_cells() {
            let mut unit = body_centred_cubic();
            let handle = unit.tessellate([2, 2, 2], Apply::Copy, &silent()).unwrap();
            // 27 corner grid points plus one centre per cell.
            assert_eq!(handle.node_count(), 27 + 8);
            assert_eq!(handle.edge_count(), 8 * 8);
            assert!(!has_duplicate_positions(&handle));
            assert!(handle.graph().is_connected());
        }

        #[test]
        fn ids_are_unique_and_fresh() {
            let mut unit = simple_cubic();
            let handle = unit.tessellate([2, 2, 1], Apply::Copy, &silent()).unwrap();
            let ids: BTreeSet<NodeId> = handle.graph().node_ids().collect();
            assert_eq!(ids.len(), handle.node_count());
            // Original ids survive in the first cell.
            for id in 1..=8 {
                assert!(ids.contains(&NodeId(id)));
            }
        }
    }

    mod non_periodic {
        use super::*;

        #[test]
        fn non_periodic_axis_proceeds_without_fusing_unmatched_nodes() {
            let mut unit = pyramid();
            assert!(!unit.is_periodic(Axis::Z));
            let handle = unit.tessellate([1, 1, 2], Apply::Copy, &silent()).unwrap();
            // Nothing matches across z, so the copy is disjoint.
            assert_eq!(handle.node_count(), 10);
            assert_eq!(handle.graph().connected_components(), 2);
            assert!(!handle.is_periodic(Axis::Z));
        }

        #[test]
        fn periodic_axes_of_a_partially_periodic_unit_still_fuse() {
            let mut unit = pyramid();
            let handle = unit.tessellate([2, 1, 1], Apply::Copy, &silent()).unwrap();
            // Two base corners shared along x.
            assert_eq!(handle.node_count(), 8);
            assert!(handle.graph().is_connected());
        }
    }

    mod id_space {
        use super::*;
        use crate::core::models::graph::GraphError;

        fn segment_near_id_limit() -> LatticeUnit {
            LatticeUnit::new(
                create_graph(
                    &[
                        (u64::MAX - 1, [0.0, 0.0, 0.0]),
                        (u64::MAX - 2, [1.0, 0.0, 0.0]),
                    ],
                    &[(u64::MAX - 1, u64::MAX - 2)],
                ),
                &config(),
            )
        }

        #[test]
        fn last_free_id_is_still_usable() {
            let mut unit = segment_near_id_limit();
            let handle = unit.tessellate([2, 1, 1], Apply::Copy, &silent()).unwrap();
            assert_eq!(handle.node_count(), 3);
            assert!(handle.graph().contains_node(NodeId(u64::MAX)));
        }

        #[test]
        fn running_out_of_ids_fails_without_mutation() {
            let mut unit = segment_near_id_limit();
            let err = unit
                .tessellate([3, 1, 1], Apply::InPlace, &silent())
                .unwrap_err();
            assert_eq!(
                err,
                LatticeError::Graph(GraphError::IdSpaceExhausted(NodeId(u64::MAX)))
            );
            assert_eq!(unit, segment_near_id_limit());
        }
    }

    #[test]
    fn progress_events_frame_each_axis_pass() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let mut unit = segment();
        unit.tessellate([3, 1, 2], Apply::Copy, &reporter).unwrap();

        let events = events.lock().unwrap();
        let phases: Vec<&'static str> = events
            .iter()
            .filter_map(|e| match e {
                Progress::PhaseStart { name } => Some(*name),
                _ => None,
            })
            .collect();
        assert_eq!(phases, vec!["Tessellating along x", "Tessellating along z"]);
        let increments = events
            .iter()
            .filter(|e| matches!(e, Progress::TaskIncrement))
            .count();
        assert_eq!(increments, 2 + 1);
    }
}
