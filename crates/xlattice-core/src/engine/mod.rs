//! # Engine Module
//!
//! The stateful layer of the crate. It wraps a [`GeometricGraph`](crate::core::models::graph::GeometricGraph)
//! and its periodicity analysis into a [`LatticeUnit`](lattice::LatticeUnit) and implements every
//! operation that changes a unit.
//!
//! - **Lattice units** ([`lattice`]) - The unit cell, the [`Apply`](lattice::Apply) selector and
//!   the [`LatticeHandle`](lattice::LatticeHandle) returned by mutating operations
//! - **Tessellation** ([`tessellation`]) - Replication along x, y and z with boundary fusion
//! - **Transforms** ([`transform`]) - Translate, scale, flip and mirror
//! - **Diameter distributions** ([`distribution`]) - Position- and orientation-based edge diameters
//! - **Configuration** ([`config`]) - Tolerance, default diameter and pipeline operations
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Validation and engine error types
//!
//! Every mutating operation validates its input first and only then commits,
//! so an error never leaves a unit half-modified.

pub mod config;
pub mod distribution;
pub mod error;
pub mod lattice;
pub mod progress;
pub mod tessellation;
pub mod transform;
