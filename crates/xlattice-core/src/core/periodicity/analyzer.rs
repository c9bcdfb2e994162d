use super::faces::{FaceSets, FaceTracker};
use super::map::PeriodicityMap;
use crate::core::models::graph::GeometricGraph;
use crate::core::models::ids::NodeId;
use crate::core::utils::geometry::{Axis, Extents, Side};
use crate::core::utils::tolerance::Tolerance;
use nalgebra::Vector3;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, trace, warn};

/// Non-fatal findings of a periodicity analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodicityWarning {
    /// A face node has no partner on the opposing face within tolerance.
    UnmatchedFaceNode {
        axis: Axis,
        side: Side,
        node: NodeId,
    },
    /// More than one partner was within tolerance; `chosen` won the tie-break.
    AmbiguousMatch {
        axis: Axis,
        node: NodeId,
        candidates: Vec<NodeId>,
        chosen: NodeId,
    },
}

impl PeriodicityWarning {
    pub fn axis(&self) -> Axis {
        match self {
            Self::UnmatchedFaceNode { axis, .. } | Self::AmbiguousMatch { axis, .. } => *axis,
        }
    }

    pub fn is_unmatched(&self) -> bool {
        matches!(self, Self::UnmatchedFaceNode { .. })
    }
}

impl fmt::Display for PeriodicityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedFaceNode { axis, side, node } => write!(
                f,
                "node {} on the {} {} face has no periodic partner",
                node, side, axis
            ),
            Self::AmbiguousMatch {
                axis,
                node,
                candidates,
                chosen,
            } => write!(
                f,
                "node {} has {} candidate partners along {}; chose {}",
                node,
                candidates.len(),
                axis,
                chosen
            ),
        }
    }
}

/// Result of analyzing a graph: extents, boundary faces and the per-axis
/// correspondence maps.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicityAnalysis {
    tolerance: Tolerance,
    extents: Extents,
    faces: FaceSets,
    maps: [PeriodicityMap; 3],
    periodic: [bool; 3],
    warnings: Vec<PeriodicityWarning>,
}

impl PeriodicityAnalysis {
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn extents(&self) -> &Extents {
        &self.extents
    }

    pub fn faces(&self) -> &FaceSets {
        &self.faces
    }

    pub fn face(&self, axis: Axis, side: Side) -> &BTreeSet<NodeId> {
        self.faces.face(axis, side)
    }

    pub fn map(&self, axis: Axis) -> &PeriodicityMap {
        &self.maps[axis.index()]
    }

    /// Number of matched min/max pairs along `axis`.
    pub fn matched_pairs(&self, axis: Axis) -> usize {
        self.maps[axis.index()].len()
    }

    /// `true` when every node of both faces along `axis` found a partner.
    pub fn is_periodic(&self, axis: Axis) -> bool {
        self.periodic[axis.index()]
    }

    pub fn is_fully_periodic(&self) -> bool {
        self.periodic.iter().all(|&p| p)
    }

    pub fn warnings(&self) -> &[PeriodicityWarning] {
        &self.warnings
    }

    /// Shifts the cached extents; correspondences are unaffected by a rigid
    /// translation.
    pub(crate) fn translate(&mut self, delta: &Vector3<f64>) {
        self.extents = self.extents.translated(delta);
    }
}

/// Detects boundary faces and periodic correspondences of a graph.
///
/// Min-face nodes are matched in ascending id order. Each takes the free
/// max-face node closest in the transverse plane among those whose two
/// transverse coordinates agree within tolerance; exact distance ties go to
/// the lowest node id. When every candidate is already taken, earlier
/// matches are moved along an augmenting path, so a face is only reported
/// unmatched if no one-to-one pairing within tolerance exists.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicityAnalyzer {
    tolerance: Tolerance,
}

impl PeriodicityAnalyzer {
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    pub fn analyze(&self, graph: &GeometricGraph) -> PeriodicityAnalysis {
        let tol = self.tolerance;
        let (extents, faces) = self.scan_faces(graph);

        let mut warnings = Vec::new();
        let mut periodic = [true; 3];
        let maps = Axis::ALL.map(|axis| {
            let (map, axis_warnings) = self.match_faces(graph, &faces, axis);
            periodic[axis.index()] = !axis_warnings.iter().any(PeriodicityWarning::is_unmatched);
            debug!(
                axis = %axis,
                matched = map.len(),
                min_face = faces.face(axis, Side::Min).len(),
                max_face = faces.face(axis, Side::Max).len(),
                periodic = periodic[axis.index()],
                "Matched boundary faces."
            );
            warnings.extend(axis_warnings);
            map
        });

        for warning in warnings.iter().filter(|w| w.is_unmatched()) {
            warn!(tolerance = tol.value(), "{}", warning);
        }

        PeriodicityAnalysis {
            tolerance: tol,
            extents,
            faces,
            maps,
            periodic,
            warnings,
        }
    }

    /// Single pass over all nodes tracking the six running extremes.
    fn scan_faces(&self, graph: &GeometricGraph) -> (Extents, FaceSets) {
        let mut trackers =
            Axis::ALL.map(|_| [FaceTracker::new(Side::Min), FaceTracker::new(Side::Max)]);

        for node in graph.nodes_iter() {
            for axis in Axis::ALL {
                let value = axis.of(&node.position);
                for tracker in trackers[axis.index()].iter_mut() {
                    let dropped = tracker.observe(node.id, value, self.tolerance);
                    if dropped > 0 {
                        trace!(
                            axis = %axis,
                            node = %node.id,
                            dropped,
                            "New extreme invalidated face members."
                        );
                    }
                }
            }
        }

        let mut extents = Extents::default();
        let mut faces = FaceSets::default();
        for (axis, [min_tracker, max_tracker]) in Axis::ALL.into_iter().zip(trackers) {
            extents.min[axis.index()] = min_tracker.extreme().unwrap_or(0.0);
            extents.max[axis.index()] = max_tracker.extreme().unwrap_or(0.0);
            faces.set(axis, Side::Min, min_tracker.into_members());
            faces.set(axis, Side::Max, max_tracker.into_members());
        }
        (extents, faces)
    }

    fn match_faces(
        &self,
        graph: &GeometricGraph,
        faces: &FaceSets,
        axis: Axis,
    ) -> (PeriodicityMap, Vec<PeriodicityWarning>) {
        let (t1, t2) = axis.transverse();
        let tol = self.tolerance;
        let max_face = faces.face(axis, Side::Max);
        let min_face = faces.face(axis, Side::Min);

        // Candidates of every min node, best first. The sort is stable over
        // ascending ids, so exact distance ties keep the lowest id first.
        let preferences: BTreeMap<NodeId, Vec<NodeId>> = min_face
            .iter()
            .map(|&min_node| {
                let mut candidates: Vec<(NodeId, f64)> = graph
                    .position(min_node)
                    .map(|p| {
                        max_face
                            .iter()
                            .filter_map(|&id| {
                                let q = graph.position(id)?;
                                let (d1, d2) = (t1.of(p) - t1.of(q), t2.of(p) - t2.of(q));
                                (tol.matches(t1.of(p), t1.of(q))
                                    && tol.matches(t2.of(p), t2.of(q)))
                                .then(|| (id, d1.hypot(d2)))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
                (min_node, candidates.into_iter().map(|(id, _)| id).collect())
            })
            .collect();

        let mut owner: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        for &min_node in min_face {
            let mut visited = BTreeSet::new();
            if !assign(min_node, &preferences, &mut owner, &mut visited) {
                trace!(axis = %axis, node = %min_node, "No augmenting path for min-face node.");
            }
        }

        let mut map = PeriodicityMap::new(axis);
        for (&max_node, &min_node) in &owner {
            map.insert(min_node, max_node);
        }

        let mut warnings = Vec::new();
        for (&min_node, candidates) in &preferences {
            let Some(chosen) = map.max_partner(min_node) else {
                warnings.push(PeriodicityWarning::UnmatchedFaceNode {
                    axis,
                    side: Side::Min,
                    node: min_node,
                });
                continue;
            };
            if candidates.len() > 1 {
                let mut listed = candidates.clone();
                listed.sort();
                let warning = PeriodicityWarning::AmbiguousMatch {
                    axis,
                    node: min_node,
                    candidates: listed,
                    chosen,
                };
                debug!("{}", warning);
                warnings.push(warning);
            }
        }

        for &max_node in max_face {
            if !owner.contains_key(&max_node) {
                warnings.push(PeriodicityWarning::UnmatchedFaceNode {
                    axis,
                    side: Side::Max,
                    node: max_node,
                });
            }
        }

        (map, warnings)
    }
}

/// Gives `min_node` a max-face partner, preferring a free candidate and
/// otherwise moving the current holder of a candidate to another partner.
///
/// `owner` maps max-face nodes to their min-face partner; `visited` holds the
/// max-face nodes already examined during this search.
fn assign(
    min_node: NodeId,
    preferences: &BTreeMap<NodeId, Vec<NodeId>>,
    owner: &mut BTreeMap<NodeId, NodeId>,
    visited: &mut BTreeSet<NodeId>,
) -> bool {
    let Some(candidates) = preferences.get(&min_node) else {
        return false;
    };
    if let Some(&free) = candidates.iter().find(|id| !owner.contains_key(id)) {
        owner.insert(free, min_node);
        return true;
    }
    for &candidate in candidates {
        if !visited.insert(candidate) {
            continue;
        }
        let Some(&holder) = owner.get(&candidate) else {
            continue;
        };
        if assign(holder, preferences, owner, visited) {
            owner.insert(candidate, min_node);
            return true;
        }
    }
    false
}

/// Convenience wrapper around [`PeriodicityAnalyzer::analyze`].
pub fn analyze(graph: &GeometricGraph, tolerance: Tolerance) -> PeriodicityAnalysis {
    PeriodicityAnalyzer::new(tolerance).analyze(graph)
}
