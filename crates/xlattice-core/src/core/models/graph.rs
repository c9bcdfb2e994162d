use super::edge::{Edge, EdgeKey};
use super::ids::{IdAllocator, NodeId};
use super::node::Node;
use crate::core::utils::geometry::Extents;
use nalgebra::{Point3, Vector3};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node {0} already exists in the graph")]
    DuplicateNode(NodeId),

    #[error("Node {0} does not exist in the graph")]
    MissingNode(NodeId),

    #[error("Edge {0}-{0} would be a self-loop")]
    SelfLoop(NodeId),

    #[error("No unused node id is left above {0}")]
    IdSpaceExhausted(NodeId),
}

/// Sparse, undirected, attributed graph of 3-D joints and struts.
///
/// Nodes and edges are kept in ordered maps so that every iteration, and
/// therefore every algorithm built on top of the graph, visits elements in
/// ascending id order. The graph owns an [`IdAllocator`] that is kept ahead of
/// every id ever inserted, which makes [`insert_node`](Self::insert_node)
/// collision-free.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometricGraph {
    /// Primary node storage, keyed by id.
    nodes: BTreeMap<NodeId, Node>,
    /// Primary edge storage, keyed by the canonical (low, high) pair.
    edges: BTreeMap<EdgeKey, Edge>,
    /// Cached adjacency sets, one entry per node.
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
    /// Source of fresh ids.
    ids: IdAllocator,
}

impl GeometricGraph {
    /// Creates a new, empty graph whose first allocated id is 1.
    pub fn new() -> Self {
        Self {
            ids: IdAllocator::starting_at(1),
            ..Self::default()
        }
    }

    /// Retrieves a node by its id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Retrieves the position of a node by its id.
    pub fn position(&self, id: NodeId) -> Option<&Point3<f64>> {
        self.nodes.get(&id).map(|n| &n.position)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns an iterator over all nodes in ascending id order.
    pub fn nodes_iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an iterator over all edges in ascending (low, high) order.
    pub fn edges_iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Retrieves the edge between `a` and `b`, in either orientation.
    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        self.edges.get(&EdgeKey::new(a, b))
    }

    pub fn edge_mut(&mut self, a: NodeId, b: NodeId) -> Option<&mut Edge> {
        self.edges.get_mut(&EdgeKey::new(a, b))
    }

    pub fn contains_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.contains_key(&EdgeKey::new(a, b))
    }

    /// Adds a node with a caller-chosen id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if the id is already taken.
    pub fn add_node(&mut self, id: NodeId, position: Point3<f64>) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.ids.observe(id);
        self.nodes.insert(id, Node::new(id, position));
        self.adjacency.insert(id, BTreeSet::new());
        Ok(())
    }

    /// Adds a node under a freshly allocated id and returns that id.
    pub fn insert_node(&mut self, position: Point3<f64>) -> Result<NodeId, GraphError> {
        let id = self.allocate_id()?;
        self.nodes.insert(id, Node::new(id, position));
        self.adjacency.insert(id, BTreeSet::new());
        Ok(id)
    }

    /// Reserves a fresh id without inserting a node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::IdSpaceExhausted`] once an id equal to
    /// `u64::MAX` has been used.
    pub fn allocate_id(&mut self) -> Result<NodeId, GraphError> {
        self.ids
            .allocate()
            .ok_or(GraphError::IdSpaceExhausted(NodeId(u64::MAX)))
    }

    /// Adds an undirected edge.
    ///
    /// The operation is idempotent: adding an edge that already exists leaves
    /// the existing edge (and its diameter) untouched and returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Fails if either endpoint is missing or both endpoints are the same node.
    pub fn add_edge(
        &mut self,
        a: NodeId,
        b: NodeId,
        diameter: Option<f64>,
    ) -> Result<bool, GraphError> {
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        for id in [a, b] {
            if !self.nodes.contains_key(&id) {
                return Err(GraphError::MissingNode(id));
            }
        }
        let key = EdgeKey::new(a, b);
        if self.edges.contains_key(&key) {
            return Ok(false);
        }
        self.edges.insert(key, Edge::new(key.low(), key.high(), diameter));
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
        Ok(true)
    }

    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> Option<Edge> {
        let edge = self.edges.remove(&EdgeKey::new(a, b))?;
        if let Some(set) = self.adjacency.get_mut(&a) {
            set.remove(&b);
        }
        if let Some(set) = self.adjacency.get_mut(&b) {
            set.remove(&a);
        }
        Some(edge)
    }

    /// Removes a node together with every edge incident to it.
    ///
    /// The id is never handed out again by [`insert_node`](Self::insert_node).
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        let neighbors = self.adjacency.remove(&id).unwrap_or_default();
        for neighbor in neighbors {
            self.edges.remove(&EdgeKey::new(id, neighbor));
            if let Some(set) = self.adjacency.get_mut(&neighbor) {
                set.remove(&id);
            }
        }
        Some(node)
    }

    /// Ids of the nodes adjacent to `id`, in ascending order.
    pub fn neighbors(&self, id: NodeId) -> Option<impl Iterator<Item = NodeId> + '_> {
        self.adjacency.get(&id).map(|set| set.iter().copied())
    }

    pub fn degree(&self, id: NodeId) -> Option<usize> {
        self.adjacency.get(&id).map(BTreeSet::len)
    }

    /// Vector from the `a` endpoint to the `b` endpoint.
    pub fn edge_vector(&self, a: NodeId, b: NodeId) -> Option<Vector3<f64>> {
        Some(self.position(b)? - self.position(a)?)
    }

    pub fn edge_length(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.edge_vector(a, b).map(|v| v.norm())
    }

    pub fn edge_midpoint(&self, a: NodeId, b: NodeId) -> Option<Point3<f64>> {
        Some(nalgebra::center(self.position(a)?, self.position(b)?))
    }

    /// Read-only view of node positions keyed by id.
    pub fn positions(&self) -> BTreeMap<NodeId, Point3<f64>> {
        self.nodes.iter().map(|(id, n)| (*id, n.position)).collect()
    }

    /// Read-only view of edge diameters keyed by the (low, high) id pair,
    /// substituting `default` for edges without a diameter.
    pub fn edge_diameters(&self, default: f64) -> BTreeMap<(NodeId, NodeId), f64> {
        self.edges
            .iter()
            .map(|(key, e)| (key.as_pair(), e.diameter_or(default)))
            .collect()
    }

    /// Bounding box of all node positions, or `None` for an empty graph.
    pub fn extents(&self) -> Option<Extents> {
        Extents::from_points(self.nodes.values().map(|n| &n.position))
    }

    /// Applies `f` to every node position, in ascending id order.
    pub fn update_positions<F>(&mut self, mut f: F)
    where
        F: FnMut(NodeId, &mut Point3<f64>),
    {
        for (id, node) in self.nodes.iter_mut() {
            f(*id, &mut node.position);
        }
    }

    /// Applies `f` to every edge, in ascending key order.
    pub fn update_edges<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Edge),
    {
        for edge in self.edges.values_mut() {
            f(edge);
        }
    }

    /// Unions `other` into `self`, renaming its nodes through `relabel`.
    ///
    /// Nodes whose new id already exists in `self` are fused: the existing
    /// node keeps its position and inherits the incoming edges. Edges whose
    /// endpoints collapse onto the same node are dropped, and edges that
    /// already exist keep their current diameter.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingNode`] if `relabel` has no entry for one of
    /// `other`'s nodes. `self` is left untouched in that case.
    pub fn merge_from(
        &mut self,
        other: &GeometricGraph,
        relabel: &BTreeMap<NodeId, NodeId>,
    ) -> Result<MergeStats, GraphError> {
        if let Some(missing) = other.node_ids().find(|id| !relabel.contains_key(id)) {
            return Err(GraphError::MissingNode(missing));
        }

        let mut stats = MergeStats::default();
        for node in other.nodes_iter() {
            let target = relabel[&node.id];
            if self.contains_node(target) {
                stats.fused_nodes += 1;
            } else {
                self.add_node(target, node.position)?;
                stats.added_nodes += 1;
            }
        }
        for edge in other.edges_iter() {
            let (a, b) = (relabel[&edge.n0], relabel[&edge.n1]);
            if a == b {
                stats.collapsed_edges += 1;
                continue;
            }
            if self.add_edge(a, b, edge.diameter)? {
                stats.added_edges += 1;
            } else {
                stats.shared_edges += 1;
            }
        }
        Ok(stats)
    }

    /// `true` if every node can be reached from every other node.
    /// An empty graph counts as connected.
    pub fn is_connected(&self) -> bool {
        self.connected_components() <= 1
    }

    /// Number of connected components.
    pub fn connected_components(&self) -> usize {
        let mut seen: BTreeSet<NodeId> = BTreeSet::new();
        let mut components = 0;
        for &start in self.nodes.keys() {
            if !seen.insert(start) {
                continue;
            }
            components += 1;
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                for &next in &self.adjacency[&current] {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        components
    }
}

/// Bookkeeping returned by [`GeometricGraph::merge_from`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added_nodes: usize,
    pub fused_nodes: usize,
    pub added_edges: usize,
    pub shared_edges: usize,
    pub collapsed_edges: usize,
}
