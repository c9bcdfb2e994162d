use super::ids::NodeId;
use nalgebra::Point3;

/// A lattice joint: an identifier and a position in 3-D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Identifier, unique within the owning graph.
    pub id: NodeId,
    /// Cartesian position of the joint.
    pub position: Point3<f64>,
}

impl Node {
    pub fn new(id: NodeId, position: Point3<f64>) -> Self {
        Self { id, position }
    }

    /// Convenience constructor from raw coordinates.
    pub fn at(id: u64, x: f64, y: f64, z: f64) -> Self {
        Self::new(NodeId(id), Point3::new(x, y, z))
    }
}
