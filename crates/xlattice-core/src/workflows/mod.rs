//! # Workflows Module
//!
//! High-level entry points that drive the [`engine`](crate::engine) through a
//! complete job.
//!
//! - **Build Workflow** ([`build`]) - Applies an ordered list of
//!   [`Operation`](crate::engine::config::Operation)s to a unit cell and reports
//!   progress along the way.

pub mod build;
