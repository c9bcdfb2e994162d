use crate::core::models::ids::NodeId;
use crate::core::utils::geometry::Axis;
use std::collections::BTreeMap;

/// Bidirectional correspondence between the min-face and max-face nodes
/// along one axis.
///
/// Both directions are kept in sync; a node appears at most once on each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicityMap {
    axis: Axis,
    min_to_max: BTreeMap<NodeId, NodeId>,
    max_to_min: BTreeMap<NodeId, NodeId>,
}

impl PeriodicityMap {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            min_to_max: BTreeMap::new(),
            max_to_min: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, min_node: NodeId, max_node: NodeId) {
        if let Some(old_max) = self.min_to_max.insert(min_node, max_node) {
            self.max_to_min.remove(&old_max);
        }
        if let Some(old_min) = self.max_to_min.insert(max_node, min_node) {
            if old_min != min_node {
                self.min_to_max.remove(&old_min);
            }
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The max-face partner of a min-face node.
    pub fn max_partner(&self, min_node: NodeId) -> Option<NodeId> {
        self.min_to_max.get(&min_node).copied()
    }

    /// The min-face partner of a max-face node.
    pub fn min_partner(&self, max_node: NodeId) -> Option<NodeId> {
        self.max_to_min.get(&max_node).copied()
    }

    pub fn len(&self) -> usize {
        self.min_to_max.len()
    }

    pub fn is_empty(&self) -> bool {
        self.min_to_max.is_empty()
    }

    /// `(min_node, max_node)` pairs in ascending min-node order.
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.min_to_max.iter().map(|(a, b)| (*a, *b))
    }
}
