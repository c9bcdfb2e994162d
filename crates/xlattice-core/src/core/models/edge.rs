use super::ids::NodeId;
use std::fmt;

/// Canonical key of an undirected edge: the smaller id always comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey(NodeId, NodeId);

impl EdgeKey {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    #[inline]
    pub fn low(&self) -> NodeId {
        self.0
    }

    #[inline]
    pub fn high(&self) -> NodeId {
        self.1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.0 == id || self.1 == id
    }

    /// The endpoint that is not `id`, if `id` is an endpoint at all.
    pub fn other(&self, id: NodeId) -> Option<NodeId> {
        if self.0 == id {
            Some(self.1)
        } else if self.1 == id {
            Some(self.0)
        } else {
            None
        }
    }

    pub fn as_pair(&self) -> (NodeId, NodeId) {
        (self.0, self.1)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

/// An undirected strut between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub n0: NodeId,
    pub n1: NodeId,
    /// Cross-section diameter; `None` means "use the caller's default".
    pub diameter: Option<f64>,
}

impl Edge {
    pub fn new(n0: NodeId, n1: NodeId, diameter: Option<f64>) -> Self {
        Self { n0, n1, diameter }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.n0, self.n1)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.n0 == id || self.n1 == id
    }

    pub fn diameter_or(&self, default: f64) -> f64 {
        self.diameter.unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_key_is_order_independent() {
        assert_eq!(
            EdgeKey::new(NodeId(5), NodeId(2)),
            EdgeKey::new(NodeId(2), NodeId(5))
        );
        let key = EdgeKey::new(NodeId(9), NodeId(1));
        assert_eq!(key.low(), NodeId(1));
        assert_eq!(key.high(), NodeId(9));
    }

    #[test]
    fn edge_key_other_returns_opposite_endpoint() {
        let key = EdgeKey::new(NodeId(1), NodeId(2));
        assert_eq!(key.other(NodeId(1)), Some(NodeId(2)));
        assert_eq!(key.other(NodeId(2)), Some(NodeId(1)));
        assert_eq!(key.other(NodeId(3)), None);
    }

    #[test]
    fn edge_contains_returns_true_for_both_nodes() {
        let edge = Edge::new(NodeId(10), NodeId(20), None);
        assert!(edge.contains(NodeId(10)));
        assert!(edge.contains(NodeId(20)));
        assert!(!edge.contains(NodeId(30)));
    }

    #[test]
    fn diameter_or_falls_back_to_default() {
        assert_eq!(Edge::new(NodeId(1), NodeId(2), None).diameter_or(0.3), 0.3);
        assert_eq!(
            Edge::new(NodeId(1), NodeId(2), Some(0.1)).diameter_or(0.3),
            0.1
        );
    }
}
