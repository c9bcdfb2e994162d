use crate::core::models::ids::NodeId;
use crate::core::utils::geometry::{Axis, Side};
use crate::core::utils::tolerance::Tolerance;
use std::collections::BTreeSet;

/// Running extreme and candidate face members along one axis side.
///
/// Invariant after every [`observe`](Self::observe): `members` holds exactly
/// the observed nodes whose coordinate lies within epsilon of `extreme`, and
/// `extreme` is the exact running minimum (or maximum).
#[derive(Debug, Clone)]
pub(crate) struct FaceTracker {
    side: Side,
    extreme: Option<f64>,
    members: Vec<(NodeId, f64)>,
}

impl FaceTracker {
    pub(crate) fn new(side: Side) -> Self {
        Self {
            side,
            extreme: None,
            members: Vec::new(),
        }
    }

    /// Feeds one coordinate. Returns how many earlier members were invalidated
    /// because a more extreme value pushed them out of the tolerance band.
    pub(crate) fn observe(&mut self, id: NodeId, value: f64, tolerance: Tolerance) -> usize {
        let Some(current) = self.extreme else {
            self.extreme = Some(value);
            self.members.push((id, value));
            return 0;
        };

        let more_extreme = match self.side {
            Side::Min => value < current,
            Side::Max => value > current,
        };

        if more_extreme {
            self.extreme = Some(value);
            let before = self.members.len();
            self.members.retain(|&(_, v)| tolerance.matches(v, value));
            self.members.push((id, value));
            before - (self.members.len() - 1)
        } else {
            if tolerance.matches(value, current) {
                self.members.push((id, value));
            }
            0
        }
    }

    pub(crate) fn extreme(&self) -> Option<f64> {
        self.extreme
    }

    pub(crate) fn into_members(self) -> BTreeSet<NodeId> {
        self.members.into_iter().map(|(id, _)| id).collect()
    }
}

/// The six boundary face-node sets of a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceSets {
    faces: [[BTreeSet<NodeId>; 2]; 3],
}

impl FaceSets {
    pub(crate) fn set(&mut self, axis: Axis, side: Side, members: BTreeSet<NodeId>) {
        self.faces[axis.index()][side_index(side)] = members;
    }

    /// Nodes within tolerance of the extreme coordinate on the given face.
    pub fn face(&self, axis: Axis, side: Side) -> &BTreeSet<NodeId> {
        &self.faces[axis.index()][side_index(side)]
    }

    /// `true` if the node lies on any of the six faces.
    pub fn is_boundary(&self, id: NodeId) -> bool {
        self.faces.iter().flatten().any(|set| set.contains(&id))
    }

    /// All faces a node belongs to (several at edges and corners of the box).
    pub fn faces_of(&self, id: NodeId) -> Vec<(Axis, Side)> {
        let mut result = Vec::new();
        for axis in Axis::ALL {
            for side in [Side::Min, Side::Max] {
                if self.face(axis, side).contains(&id) {
                    result.push((axis, side));
                }
            }
        }
        result
    }
}

#[inline]
fn side_index(side: Side) -> usize {
    match side {
        Side::Min => 0,
        Side::Max => 1,
    }
}
