use super::config::DistributionMode;
use super::error::{LatticeError, ValidationError};
use super::lattice::{Apply, LatticeHandle, LatticeUnit};
use crate::core::models::edge::EdgeKey;
use crate::core::models::graph::GraphError;
use crate::core::utils::geometry::{Axis, Extents};
use crate::core::utils::tolerance::Tolerance;
use nalgebra::Vector3;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, instrument};

pub type PositionFn<'f> = Box<dyn Fn(f64, f64, f64) -> f64 + Send + Sync + 'f>;
pub type OrientationFn<'f> = Box<dyn Fn(f64, f64) -> f64 + Send + Sync + 'f>;

/// A rule assigning a diameter to every edge.
pub enum DiameterDistribution<'f> {
    /// `f(x, y, z)` evaluated at the edge midpoint.
    Position(PositionFn<'f>),
    /// `f(azimuth, inclination)` of the canonicalized edge direction, with
    /// the inclination measured from `reference`.
    Orientation {
        reference: Axis,
        function: OrientationFn<'f>,
    },
}

impl fmt::Debug for DiameterDistribution<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(_) => f.write_str("DiameterDistribution::Position"),
            Self::Orientation { reference, .. } => {
                write!(f, "DiameterDistribution::Orientation({})", reference)
            }
        }
    }
}

impl<'f> DiameterDistribution<'f> {
    pub fn position<F>(function: F) -> Self
    where
        F: Fn(f64, f64, f64) -> f64 + Send + Sync + 'f,
    {
        Self::Position(Box::new(function))
    }

    /// Orientation rule with the inclination measured from +z.
    pub fn orientation<F>(function: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'f,
    {
        Self::orientation_about(Axis::Z, function)
    }

    pub fn orientation_about<F>(reference: Axis, function: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'f,
    {
        Self::Orientation {
            reference,
            function: Box::new(function),
        }
    }

    pub fn constant(value: f64, mode: DistributionMode) -> Self {
        match mode {
            DistributionMode::Position => Self::position(move |_, _, _| value),
            DistributionMode::Orientation { reference } => {
                Self::orientation_about(reference, move |_, _| value)
            }
        }
    }

    /// Linear ramp from `from` at the min extent to `to` at the max extent
    /// along `axis`. A zero-length span yields `from` everywhere.
    pub fn gradient(axis: Axis, from: f64, to: f64, extents: &Extents) -> Self {
        let (start, length) = (extents.min_of(axis), extents.length(axis));
        let i = axis.index();
        Self::position(move |x, y, z| {
            if length == 0.0 {
                return from;
            }
            let t = ([x, y, z][i] - start) / length;
            from + (to - from) * t
        })
    }

    /// `aligned` for edges parallel to `reference`, `perpendicular` for edges
    /// lying in the plane normal to it, interpolated on `|cos(inclination)|`.
    pub fn by_inclination(reference: Axis, aligned: f64, perpendicular: f64) -> Self {
        Self::orientation_about(reference, move |_, inclination| {
            let c = inclination.cos().abs();
            perpendicular + (aligned - perpendicular) * c
        })
    }

    pub fn mode(&self) -> DistributionMode {
        match self {
            Self::Position(_) => DistributionMode::Position,
            Self::Orientation { reference, .. } => DistributionMode::Orientation {
                reference: *reference,
            },
        }
    }
}

/// Azimuth and inclination of `direction` relative to `reference`.
///
/// The direction is first flipped so that its first non-zero component (in
/// the order reference, then the two transverse axes) is positive, which
/// gives an edge and its reverse the same angles. Components within
/// `tolerance` of zero count as zero. Returns `None` for a zero-length vector.
pub fn edge_angles(
    direction: &Vector3<f64>,
    reference: Axis,
    tolerance: Tolerance,
) -> Option<(f64, f64)> {
    let length = direction.norm();
    if length <= tolerance.value() {
        return None;
    }

    let (t1, t2) = reference.transverse();
    let leading = [reference, t1, t2]
        .into_iter()
        .map(|axis| axis.of_vector(direction))
        .find(|c| !tolerance.matches(*c, 0.0))
        .unwrap_or(0.0);
    let d = if leading < 0.0 { -direction } else { *direction };

    let cos_inclination = (reference.of_vector(&d) / length).clamp(-1.0, 1.0);
    let inclination = cos_inclination.acos();
    let azimuth = t2.of_vector(&d).atan2(t1.of_vector(&d));
    Some((azimuth, inclination))
}

impl LatticeUnit {
    /// Computes a diameter for every edge and commits them all at once.
    ///
    /// # Errors
    ///
    /// A zero-length edge in orientation mode, or any non-finite or
    /// non-positive diameter, aborts before a single edge is changed.
    #[instrument(skip_all, fields(mode = ?distribution.mode()))]
    pub fn apply_diameter_distribution(
        &mut self,
        distribution: &DiameterDistribution,
        apply: Apply,
    ) -> Result<LatticeHandle<'_>, LatticeError> {
        let diameters = self.compute_diameters(distribution)?;
        self.apply_with(apply, move |unit| {
            unit.graph_mut().update_edges(|edge| {
                if let Some(&value) = diameters.get(&edge.key()) {
                    edge.diameter = Some(value);
                }
            });
            debug!(edges = unit.edge_count(), "Assigned edge diameters.");
            Ok(())
        })
    }

    fn compute_diameters(
        &self,
        distribution: &DiameterDistribution,
    ) -> Result<BTreeMap<EdgeKey, f64>, LatticeError> {
        let graph = self.graph();
        let tolerance = self.tolerance();
        graph
            .edges_iter()
            .map(|edge| -> Result<(EdgeKey, f64), LatticeError> {
                let (n0, n1) = (edge.n0, edge.n1);
                let value = match distribution {
                    DiameterDistribution::Position(f) => {
                        let m = graph
                            .edge_midpoint(n0, n1)
                            .ok_or(GraphError::MissingNode(n0))?;
                        f(m.x, m.y, m.z)
                    }
                    DiameterDistribution::Orientation {
                        reference,
                        function,
                    } => {
                        let vector = graph
                            .edge_vector(n0, n1)
                            .ok_or(GraphError::MissingNode(n0))?;
                        let (azimuth, inclination) = edge_angles(&vector, *reference, tolerance)
                            .ok_or(ValidationError::ZeroLengthEdge { n0, n1 })?;
                        function(azimuth, inclination)
                    }
                };
                if !(value.is_finite() && value > 0.0) {
                    return Err(ValidationError::Diameter { n0, n1, value }.into());
                }
                Ok((edge.key(), value))
            })
            .collect()
    }
}
