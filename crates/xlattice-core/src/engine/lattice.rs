use super::config::LatticeConfig;
use super::error::LatticeError;
use crate::core::models::graph::GeometricGraph;
use crate::core::models::ids::NodeId;
use crate::core::periodicity::{
    PeriodicityAnalysis, PeriodicityAnalyzer, PeriodicityMap, PeriodicityWarning,
};
use crate::core::utils::geometry::{Axis, Extents, Side};
use crate::core::utils::tolerance::Tolerance;
use nalgebra::Point3;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Whether a mutating operation edits the receiver or returns a new unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Apply {
    #[default]
    InPlace,
    Copy,
}

/// Result of a mutating operation: the receiver itself or an independent copy.
#[derive(Debug)]
pub enum LatticeHandle<'a> {
    Borrowed(&'a mut LatticeUnit),
    Owned(LatticeUnit),
}

impl LatticeHandle<'_> {
    pub fn is_owned(&self) -> bool {
        matches!(self, LatticeHandle::Owned(_))
    }

    /// Detaches the handle, cloning when it borrows.
    pub fn into_owned(self) -> LatticeUnit {
        match self {
            LatticeHandle::Borrowed(unit) => unit.clone(),
            LatticeHandle::Owned(unit) => unit,
        }
    }
}

impl Deref for LatticeHandle<'_> {
    type Target = LatticeUnit;

    fn deref(&self) -> &LatticeUnit {
        match self {
            LatticeHandle::Borrowed(unit) => unit,
            LatticeHandle::Owned(unit) => unit,
        }
    }
}

impl DerefMut for LatticeHandle<'_> {
    fn deref_mut(&mut self) -> &mut LatticeUnit {
        match self {
            LatticeHandle::Borrowed(unit) => unit,
            LatticeHandle::Owned(unit) => unit,
        }
    }
}

/// A unit cell: a geometric graph together with its periodicity analysis.
///
/// The analysis is derived data. Every operation that changes geometry either
/// re-runs it or, for rigid translations, shifts it consistently, so the
/// cached extents and maps always describe the current graph.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeUnit {
    graph: GeometricGraph,
    analysis: PeriodicityAnalysis,
    default_diameter: f64,
}

impl LatticeUnit {
    pub fn new(graph: GeometricGraph, config: &LatticeConfig) -> Self {
        let analysis = PeriodicityAnalyzer::new(config.tolerance).analyze(&graph);
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            fully_periodic = analysis.is_fully_periodic(),
            "Created lattice unit."
        );
        Self {
            graph,
            analysis,
            default_diameter: config.default_diameter,
        }
    }

    pub fn with_tolerance(graph: GeometricGraph, tolerance: Tolerance) -> Self {
        let config = LatticeConfig {
            tolerance,
            ..LatticeConfig::default()
        };
        Self::new(graph, &config)
    }

    pub fn graph(&self) -> &GeometricGraph {
        &self.graph
    }

    pub fn into_graph(self) -> GeometricGraph {
        self.graph
    }

    pub fn config(&self) -> LatticeConfig {
        LatticeConfig {
            tolerance: self.tolerance(),
            default_diameter: self.default_diameter,
        }
    }

    pub fn tolerance(&self) -> Tolerance {
        self.analysis.tolerance()
    }

    pub fn default_diameter(&self) -> f64 {
        self.default_diameter
    }

    pub fn analysis(&self) -> &PeriodicityAnalysis {
        &self.analysis
    }

    pub fn extents(&self) -> &Extents {
        self.analysis.extents()
    }

    pub fn is_fully_periodic(&self) -> bool {
        self.analysis.is_fully_periodic()
    }

    pub fn is_periodic(&self, axis: Axis) -> bool {
        self.analysis.is_periodic(axis)
    }

    pub fn map(&self, axis: Axis) -> &PeriodicityMap {
        self.analysis.map(axis)
    }

    pub fn face(&self, axis: Axis, side: Side) -> &BTreeSet<NodeId> {
        self.analysis.face(axis, side)
    }

    pub fn warnings(&self) -> &[PeriodicityWarning] {
        self.analysis.warnings()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn positions(&self) -> BTreeMap<NodeId, Point3<f64>> {
        self.graph.positions()
    }

    /// Diameters keyed by `(low, high)` node ids, with the unit's default
    /// substituted for unset edges.
    pub fn edge_diameters(&self) -> BTreeMap<(NodeId, NodeId), f64> {
        self.graph.edge_diameters(self.default_diameter)
    }

    /// Replaces the graph and recomputes the analysis.
    pub(crate) fn replace_graph(&mut self, graph: GeometricGraph) {
        self.graph = graph;
        self.reanalyze();
    }

    pub(crate) fn graph_mut(&mut self) -> &mut GeometricGraph {
        &mut self.graph
    }

    pub(crate) fn analysis_mut(&mut self) -> &mut PeriodicityAnalysis {
        &mut self.analysis
    }

    pub fn reanalyze(&mut self) {
        self.analysis = PeriodicityAnalyzer::new(self.tolerance()).analyze(&self.graph);
    }

    /// Runs `op` against the receiver or a clone of it, as chosen by `apply`.
    ///
    /// `op` must validate its input before touching the unit so that a
    /// failure leaves the target unchanged.
    pub(crate) fn apply_with<F>(
        &mut self,
        apply: Apply,
        op: F,
    ) -> Result<LatticeHandle<'_>, LatticeError>
    where
        F: FnOnce(&mut LatticeUnit) -> Result<(), LatticeError>,
    {
        match apply {
            Apply::InPlace => {
                op(self)?;
                Ok(LatticeHandle::Borrowed(self))
            }
            Apply::Copy => {
                let mut copy = self.clone();
                op(&mut copy)?;
                Ok(LatticeHandle::Owned(copy))
            }
        }
    }
}
