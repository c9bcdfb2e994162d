use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer identifier of a node within a [`GeometricGraph`](super::graph::GeometricGraph).
///
/// Ids are chosen by whoever builds the graph (external generators number
/// their nodes themselves); ids produced by the library come from an
/// [`IdAllocator`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically increasing source of fresh node ids.
///
/// The allocator only ever moves forward: once an id has been observed or
/// handed out, it is never produced again, even if the node carrying it is
/// later removed from the graph. Once `u64::MAX` has been observed or handed
/// out the id space is exhausted and [`allocate`](Self::allocate) returns
/// `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAllocator {
    /// `None` once the id space is exhausted.
    next: Option<u64>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::starting_at(0)
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator whose first id is `start`.
    pub fn starting_at(start: u64) -> Self {
        Self { next: Some(start) }
    }

    /// Returns a fresh id and advances the allocator, or `None` if every id
    /// has already been used.
    pub fn allocate(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(NodeId(id))
    }

    /// Makes sure `id` (and everything below it) will never be allocated.
    pub fn observe(&mut self, id: NodeId) {
        if let Some(next) = self.next {
            if id.0 >= next {
                self.next = id.0.checked_add(1);
            }
        }
    }

    /// The id the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> Option<NodeId> {
        self.next.map(NodeId)
    }

    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }
}
