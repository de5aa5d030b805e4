//! Identifier newtypes shared across the graph store, scheduler, and engines.

use std::fmt;

/// Identifier of a vertex. Vertex ids are dense, 0-based, and only grow.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VertexId(pub u32);

/// Identifier of a directed edge, distinct from its (source, target) pair.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgeId(pub u32);

/// Identifier of a partition produced by one of the partitioning strategies.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PartitionId(pub u32);

/// Per-vertex color used to derive conflict-free execution batches.
pub type Color = u8;

impl VertexId {
    /// Index into vertex-indexed storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl EdgeId {
    /// Index into edge-indexed storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl PartitionId {
    /// Index into partition-indexed storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
