//! # Core Models Module
//!
//! Data structures describing a lattice as a geometric graph.
//!
//! ## Key Components
//!
//! - [`ids`] - Integer node identifiers and the monotonic id allocator
//! - [`node`] - A joint with a 3-D position
//! - [`edge`] - An undirected strut with an optional diameter
//! - [`graph`] - The [`GeometricGraph`](graph::GeometricGraph) container
//!
//! ## Usage
//!
//! ```ignore
//! use xlattice::core::models::{graph::GeometricGraph, ids::NodeId};
//! use nalgebra::Point3;
//!
//! let mut graph = GeometricGraph::new();
//! graph.add_node(NodeId(1), Point3::new(0.0, 0.0, 0.0))?;
//! graph.add_node(NodeId(2), Point3::new(1.0, 0.0, 0.0))?;
//! graph.add_edge(NodeId(1), NodeId(2), Some(0.1))?;
//! ```

pub mod edge;
pub mod graph;
pub mod ids;
pub mod node;
