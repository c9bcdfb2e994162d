use thiserror::Error;

use crate::core::models::graph::GraphError;
use crate::core::models::ids::NodeId;
use crate::core::utils::geometry::{Axis, ParseAxisError, ParseFaceError};
use crate::core::utils::tolerance::InvalidToleranceError;

/// Rejected input. Raised before any graph mutation is committed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Replication count along {axis} must be at least 1, got {count}")]
    ReplicationCount { axis: Axis, count: i64 },

    #[error("Scale factor along {axis} must be finite and positive, got {factor}")]
    ScaleFactor { axis: Axis, factor: f64 },

    #[error("Translation component along {axis} is not finite: {value}")]
    Translation { axis: Axis, value: f64 },

    #[error(transparent)]
    Tolerance(#[from] InvalidToleranceError),

    #[error(transparent)]
    Axis(#[from] ParseAxisError),

    #[error(transparent)]
    Face(#[from] ParseFaceError),

    #[error("Edge {n0}-{n1} has zero length; its orientation is undefined")]
    ZeroLengthEdge { n0: NodeId, n1: NodeId },

    #[error("Diameter for edge {n0}-{n1} must be finite and positive, got {value}")]
    Diameter { n0: NodeId, n1: NodeId, value: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LatticeError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

impl From<InvalidToleranceError> for LatticeError {
    fn from(err: InvalidToleranceError) -> Self {
        Self::Validation(err.into())
    }
}

impl From<ParseAxisError> for LatticeError {
    fn from(err: ParseAxisError) -> Self {
        Self::Validation(err.into())
    }
}

impl From<ParseFaceError> for LatticeError {
    fn from(err: ParseFaceError) -> Self {
        Self::Validation(err.into())
    }
}
