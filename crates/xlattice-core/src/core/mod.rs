//! # Core Module
//!
//! Stateless building blocks of XLattice: the geometric graph, the fuzzy
//! comparison and geometry helpers, and the periodicity analysis that every
//! higher-level operation relies on.
//!
//! ## Architecture
//!
//! - **Lattice Representation** ([`models`]) - Nodes, edges and the graph container
//! - **Geometry & Tolerance** ([`utils`]) - Axes, face selectors, extents and the
//!   single tolerance predicate used for all coordinate matching
//! - **Periodicity Analysis** ([`periodicity`]) - Boundary faces and the
//!   min-face/max-face correspondence maps of a unit cell
//!
//! Nothing in this module keeps state between calls; tolerances are always
//! passed explicitly.

pub mod models;
pub mod periodicity;
pub mod utils;
