//! # XLattice Core Library
//!
//! Periodic lattice graphs: unit cells made of 3-D nodes and struts, the
//! detection of their periodic boundary correspondences, tessellation into
//! larger structures, and the geometric transforms applied along the way.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`GeometricGraph`), the
//!   tolerance predicate and geometry helpers, and the pure periodicity analysis.
//!
//! - **[`engine`]: The Logic Core.** The stateful `LatticeUnit` that keeps a
//!   graph and its analysis in sync, together with tessellation, transforms and
//!   diameter distributions.
//!
//! - **[`workflows`]: The Public API.** Runs a sequence of engine operations as
//!   one job, which is what the command-line driver uses.

pub mod core;
pub mod engine;
pub mod workflows;
