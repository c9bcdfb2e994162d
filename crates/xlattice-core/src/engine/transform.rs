use super::error::{LatticeError, ValidationError};
use super::lattice::{Apply, LatticeHandle, LatticeUnit};
use crate::core::models::graph::{GeometricGraph, GraphError};
use crate::core::models::ids::NodeId;
use crate::core::utils::geometry::{Axis, FaceSelector, Side};
use nalgebra::Vector3;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

fn validate_translation(delta: &Vector3<f64>) -> Result<(), ValidationError> {
    for axis in Axis::ALL {
        let value = axis.of_vector(delta);
        if !value.is_finite() {
            return Err(ValidationError::Translation { axis, value });
        }
    }
    Ok(())
}

fn validate_scale(factors: &Vector3<f64>) -> Result<(), ValidationError> {
    for axis in Axis::ALL {
        let factor = axis.of_vector(factors);
        if !(factor.is_finite() && factor > 0.0) {
            return Err(ValidationError::ScaleFactor { axis, factor });
        }
    }
    Ok(())
}

/// Reflects every node about `min + max` along `axis`: `new = min + max - old`.
fn flip_graph(graph: &mut GeometricGraph, axis: Axis, min: f64, max: f64) {
    let i = axis.index();
    graph.update_positions(|_, p| p[i] = min + max - p[i]);
}

impl LatticeUnit {
    /// Rigid shift of every node. The cached analysis is shifted with it.
    #[instrument(skip_all, fields(dx = delta.x, dy = delta.y, dz = delta.z))]
    pub fn translate(
        &mut self,
        delta: Vector3<f64>,
        apply: Apply,
    ) -> Result<LatticeHandle<'_>, LatticeError> {
        validate_translation(&delta)?;
        self.apply_with(apply, |unit| {
            unit.graph_mut().update_positions(|_, p| *p += delta);
            unit.analysis_mut().translate(&delta);
            debug!(extents = %unit.extents(), "Translated unit.");
            Ok(())
        })
    }

    /// Componentwise scaling about the origin. Every factor must be finite
    /// and strictly positive.
    #[instrument(skip_all, fields(mx = factors.x, my = factors.y, mz = factors.z))]
    pub fn scale(
        &mut self,
        factors: Vector3<f64>,
        apply: Apply,
    ) -> Result<LatticeHandle<'_>, LatticeError> {
        validate_scale(&factors)?;
        self.apply_with(apply, |unit| {
            unit.graph_mut()
                .update_positions(|_, p| p.coords.component_mul_assign(&factors));
            unit.reanalyze();
            debug!(extents = %unit.extents(), "Scaled unit.");
            Ok(())
        })
    }

    pub fn scale_uniform(
        &mut self,
        factor: f64,
        apply: Apply,
    ) -> Result<LatticeHandle<'_>, LatticeError> {
        self.scale(Vector3::repeat(factor), apply)
    }

    /// Reflects the unit about its own bounding-box midpoint along `axis`.
    #[instrument(skip_all, fields(axis = %axis))]
    pub fn flip(&mut self, axis: Axis, apply: Apply) -> Result<LatticeHandle<'_>, LatticeError> {
        let (min, max) = (self.extents().min_of(axis), self.extents().max_of(axis));
        self.apply_with(apply, |unit| {
            flip_graph(unit.graph_mut(), axis, min, max);
            unit.reanalyze();
            Ok(())
        })
    }

    /// Doubles the unit across one of its faces.
    ///
    /// A flipped clone is placed so that it abuts the chosen face. Clone nodes
    /// that originated on that face coincide with their originals and are
    /// fused by id; every other clone node receives a fresh id.
    #[instrument(skip_all, fields(face = %face))]
    pub fn mirror(
        &mut self,
        face: FaceSelector,
        apply: Apply,
    ) -> Result<LatticeHandle<'_>, LatticeError> {
        let combined = self.mirrored_graph(face)?;
        self.apply_with(apply, move |unit| {
            unit.replace_graph(combined);
            info!(
                nodes = unit.node_count(),
                edges = unit.edge_count(),
                "Mirrored unit."
            );
            Ok(())
        })
    }

    fn mirrored_graph(&self, face: FaceSelector) -> Result<GeometricGraph, LatticeError> {
        let FaceSelector { axis, side } = face;
        let extents = *self.extents();
        let length = extents.length(axis);
        let shift = match side {
            Side::Max => length,
            Side::Min => -length,
        };

        let mut clone = self.graph().clone();
        flip_graph(&mut clone, axis, extents.min_of(axis), extents.max_of(axis));
        let offset = axis.unit_vector() * shift;
        clone.update_positions(|_, p| *p += offset);

        let seam = self.face(axis, side);
        let mut combined = self.graph().clone();
        let relabel = clone
            .node_ids()
            .map(|id| {
                let target = if seam.contains(&id) {
                    id
                } else {
                    combined.allocate_id()?
                };
                Ok((id, target))
            })
            .collect::<Result<BTreeMap<NodeId, NodeId>, GraphError>>()?;

        let stats = combined.merge_from(&clone, &relabel)?;
        debug!(
            fused = stats.fused_nodes,
            added = stats.added_nodes,
            shared_edges = stats.shared_edges,
            "Fused mirrored clone."
        );
        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::lattice::fixtures::*;
    use nalgebra::Point3;

    fn assert_points_close(a: &Point3<f64>, b: &Point3<f64>) {
        assert!((a - b).amax() < 1e-12, "{a} != {b}");
    }

    mod translate {
        use super::*;

        #[test]
        fn shifts_positions_and_extents() {
            let mut unit = simple_cubic();
            let handle = unit
                .translate(Vector3::new(1.0, -2.0, 0.5), Apply::InPlace)
                .unwrap();
            assert_eq!(handle.extents().min, Point3::new(1.0, -2.0, 0.5));
            assert_eq!(handle.extents().max, Point3::new(2.0, -1.0, 1.5));
            assert_eq!(
                handle.graph().position(NodeId(7)),
                Some(&Point3::new(2.0, -1.0, 1.5))
            );
            assert!(handle.is_fully_periodic());
        }

        #[test]
        fn round_trip_restores_positions_and_extents() {
            let mut unit = body_centred_cubic();
            let before = unit.clone();
            let v = Vector3::new(0.3, -1.7, 2.25);
            unit.translate(v, Apply::InPlace).unwrap();
            unit.translate(-v, Apply::InPlace).unwrap();
            for (id, p) in unit.positions() {
                assert_points_close(&p, &before.positions()[&id]);
            }
            assert!(unit.extents().approx_eq(before.extents(), 1e-12));
        }

        #[test]
        fn zero_translation_is_a_no_op() {
            let mut unit = simple_cubic();
            unit.translate(Vector3::zeros(), Apply::InPlace).unwrap();
            assert_eq!(unit, simple_cubic());
        }

        #[test]
        fn non_finite_offsets_are_rejected() {
            let mut unit = segment();
            let err = unit
                .translate(Vector3::new(0.0, f64::INFINITY, 0.0), Apply::InPlace)
                .unwrap_err();
            assert!(matches!(
                err,
                LatticeError::Validation(ValidationError::Translation { axis: Axis::Y, .. })
            ));
        }

        #[test]
        fn copy_keeps_the_original() {
            let mut unit = segment();
            let copy = unit
                .translate(Vector3::x(), Apply::Copy)
                .unwrap()
                .into_owned();
            assert_eq!(copy.extents().min_of(Axis::X), 1.0);
            assert_eq!(unit.extents().min_of(Axis::X), 0.0);
        }
    }

    mod scale {
        use super::*;

        #[test]
        fn scales_componentwise() {
            let mut unit = simple_cubic();
            let handle = unit
                .scale(Vector3::new(2.0, 3.0, 0.5), Apply::Copy)
                .unwrap();
            assert_eq!(handle.extents().max, Point3::new(2.0, 3.0, 0.5));
            assert_eq!(
                handle.graph().position(NodeId(3)),
                Some(&Point3::new(2.0, 3.0, 0.0))
            );
            assert!(handle.is_fully_periodic());
        }

        #[test]
        fn unit_scale_is_a_no_op() {
            let mut unit = body_centred_cubic();
            unit.scale_uniform(1.0, Apply::InPlace).unwrap();
            assert_eq!(unit, body_centred_cubic());
        }

        #[test]
        fn non_positive_factors_are_rejected_without_mutation() {
            let mut unit = simple_cubic();
            for bad in [0.0, -1.0, f64::NAN] {
                let err = unit
                    .scale(Vector3::new(1.0, 1.0, bad), Apply::InPlace)
                    .unwrap_err();
                assert!(matches!(
                    err,
                    LatticeError::Validation(ValidationError::ScaleFactor { axis: Axis::Z, .. })
                ));
            }
            assert_eq!(unit, simple_cubic());
        }

        #[test]
        fn scaling_reruns_matching_at_the_fixed_tolerance() {
            // 5e-7 apart: a match at tolerance 1e-6, but not after a 10x stretch.
            let graph = create_graph(&[(1, [0.0, 0.0, 0.0]), (2, [1.0, 5e-7, 0.0])], &[(1, 2)]);
            let mut unit = LatticeUnit::new(graph, &config());
            assert_eq!(unit.map(Axis::X).len(), 1);
            unit.scale_uniform(10.0, Apply::InPlace).unwrap();
            assert!(unit.map(Axis::X).is_empty());
        }
    }

    mod flip {
        use super::*;

        #[test]
        fn reflects_about_the_unit_midpoint() {
            let graph = create_graph(
                &[(1, [1.0, 0.0, 0.0]), (2, [3.0, 0.0, 0.0]), (3, [1.5, 1.0, 0.0])],
                &[(1, 2), (2, 3)],
            );
            let mut unit = LatticeUnit::new(graph, &config());
            unit.flip(Axis::X, Apply::InPlace).unwrap();
            assert_eq!(unit.graph().position(NodeId(1)).unwrap().x, 3.0);
            assert_eq!(unit.graph().position(NodeId(2)).unwrap().x, 1.0);
            assert_eq!(unit.graph().position(NodeId(3)).unwrap().x, 2.5);
            assert_eq!(unit.extents().min_of(Axis::X), 1.0);
            assert_eq!(unit.extents().max_of(Axis::X), 3.0);
            assert_eq!(unit.edge_count(), 2);
        }

        #[test]
        fn flipping_twice_restores_positions() {
            let mut unit = pyramid();
            unit.flip(Axis::Z, Apply::InPlace).unwrap();
            assert_eq!(unit.graph().position(NodeId(5)).unwrap().z, 0.0);
            unit.flip(Axis::Z, Apply::InPlace).unwrap();
            assert_eq!(unit.positions(), pyramid().positions());
        }
    }

    mod mirror {
        use super::*;

        #[test]
        fn segment_mirrored_on_max_face_doubles_in_length() {
            let mut unit = segment();
            let handle = unit
                .mirror(FaceSelector::max(Axis::X), Apply::Copy)
                .unwrap();
            assert_eq!(handle.node_count(), 3);
            assert_eq!(handle.edge_count(), 2);
            assert_eq!(handle.extents().max_of(Axis::X), 2.0);
            assert_eq!(handle.graph().degree(NodeId(2)), Some(2));
            assert!(handle.graph().is_connected());
        }

        #[test]
        fn mirror_on_min_face_extends_in_the_negative_direction() {
            let mut unit = segment();
            let handle = unit
                .mirror("-x".parse().unwrap(), Apply::Copy)
                .unwrap();
            assert_eq!(handle.node_count(), 3);
            assert_eq!(handle.extents().min_of(Axis::X), -1.0);
            assert_eq!(handle.graph().degree(NodeId(1)), Some(2));
        }

        #[test]
        fn pyramid_mirror_fuses_the_base() {
            let mut unit = pyramid();
            let handle = unit
                .mirror(FaceSelector::min(Axis::Z), Apply::Copy)
                .unwrap();
            // Octahedron: shared square base plus two apexes.
            assert_eq!(handle.node_count(), 6);
            assert_eq!(handle.edge_count(), 12);
            assert_eq!(handle.extents().min_of(Axis::Z), -1.0);
            assert!(handle.is_periodic(Axis::X));
        }

        #[test]
        fn mirrored_structure_is_symmetric_about_the_new_midpoint() {
            let mut unit = pyramid();
            unit.mirror(FaceSelector::max(Axis::X), Apply::InPlace)
                .unwrap();
            let before = unit.clone();
            unit.flip(Axis::X, Apply::InPlace).unwrap();

            for node in unit.graph().nodes_iter() {
                let twin = before
                    .graph()
                    .nodes_iter()
                    .any(|other| (other.position - node.position).amax() < 1e-9);
                assert!(twin, "no mirror image for node {}", node.id);
            }

            let close = |a: &Point3<f64>, b: &Point3<f64>| (a - b).amax() < 1e-9;
            let graph = unit.graph();
            for edge in graph.edges_iter() {
                let (p0, p1) = (graph.position(edge.n0).unwrap(), graph.position(edge.n1).unwrap());
                let twin = before.graph().edges_iter().any(|other| {
                    let q0 = before.graph().position(other.n0).unwrap();
                    let q1 = before.graph().position(other.n1).unwrap();
                    (close(p0, q0) && close(p1, q1)) || (close(p0, q1) && close(p1, q0))
                });
                assert!(twin, "no mirror image for edge {}", edge.key());
            }
            assert_eq!(graph.edge_count(), before.edge_count());
        }

        #[test]
        fn mirror_reports_exhausted_ids_without_mutation() {
            let graph = create_graph(
                &[(u64::MAX - 2, [0.0, 0.0, 0.0]), (u64::MAX - 1, [1.0, 0.0, 0.0])],
                &[(u64::MAX - 2, u64::MAX - 1)],
            );
            let mut unit = LatticeUnit::new(graph, &config());
            unit.mirror(FaceSelector::max(Axis::X), Apply::InPlace)
                .unwrap();
            assert!(unit.graph().contains_node(NodeId(u64::MAX)));

            let doubled = unit.clone();
            let err = unit
                .mirror(FaceSelector::max(Axis::X), Apply::InPlace)
                .unwrap_err();
            assert_eq!(
                err,
                LatticeError::Graph(GraphError::IdSpaceExhausted(NodeId(u64::MAX)))
            );
            assert_eq!(unit, doubled);
        }

        #[test]
        fn mirror_keeps_ids_unique_after_prior_removals() {
            let mut graph = create_graph(
                &[(1, [0.0, 0.0, 0.0]), (2, [1.0, 0.0, 0.0]), (9, [0.5, 1.0, 0.0])],
                &[(1, 2), (2, 9)],
            );
            graph.remove_node(NodeId(9));
            let mut unit = LatticeUnit::new(graph, &config());
            let handle = unit
                .mirror(FaceSelector::max(Axis::X), Apply::Copy)
                .unwrap();
            assert!(!handle.graph().contains_node(NodeId(9)));
            assert_eq!(handle.node_count(), 3);
        }
    }
}
