//! Boundary-face detection and periodic node correspondence.
//!
//! A unit cell is periodic along an axis when every node on its min face has a
//! partner on its max face (and vice versa) whose two transverse coordinates
//! agree within the configured [`Tolerance`](crate::core::utils::tolerance::Tolerance).
//! The analysis is a pure function of a graph and a tolerance; incomplete
//! matches are reported as [`PeriodicityWarning`]s and never fail.

mod analyzer;
mod faces;
mod map;

pub use analyzer::{PeriodicityAnalysis, PeriodicityAnalyzer, PeriodicityWarning, analyze};
pub use faces::FaceSets;
pub use map::PeriodicityMap;
