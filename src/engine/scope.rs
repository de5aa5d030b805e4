//! Per-task access window over one vertex and its incident edges.

use parking_lot::RwLockWriteGuard;

use crate::graph::Graph;
use crate::types::{EdgeId, VertexId};

/// The consistency scope handed to an update function.
///
/// A scope grants read/write access to its vertex's payload and the
/// payloads of that vertex's incident edges, plus read-only access to the
/// surrounding topology. Constructing the scope acquires the vertex's write
/// lock and holds it until the scope drops, so no two workers ever execute
/// the same vertex concurrently.
///
/// Edge payloads are shared with the opposite endpoint: gets and sets take
/// the edge's own lock per call, so a concurrent writer on the other side
/// serializes rather than races, and a read between two writes may observe
/// either value.
pub struct Scope<'g, V, E> {
    graph: &'g Graph<V, E>,
    vertex: VertexId,
    vertex_data: RwLockWriteGuard<'g, V>,
}

impl<'g, V, E> Scope<'g, V, E> {
    pub(crate) fn new(graph: &'g Graph<V, E>, vertex: VertexId) -> Self {
        let vertex_data = graph.write_vertex(vertex);
        Self {
            graph,
            vertex,
            vertex_data,
        }
    }

    /// The vertex this scope grants access to.
    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    /// Total vertex count of the underlying graph.
    pub fn num_vertices(&self) -> usize {
        self.graph.num_vertices()
    }

    /// Read access to the vertex payload.
    pub fn vertex_data(&self) -> &V {
        &self.vertex_data
    }

    /// Write access to the vertex payload.
    pub fn vertex_data_mut(&mut self) -> &mut V {
        &mut self.vertex_data
    }

    /// Incoming edge ids of the scope's vertex.
    pub fn in_edge_ids(&self) -> &[EdgeId] {
        self.graph.in_edge_ids(self.vertex)
    }

    /// Outgoing edge ids of the scope's vertex.
    pub fn out_edge_ids(&self) -> &[EdgeId] {
        self.graph.out_edge_ids(self.vertex)
    }

    /// Source vertex of an edge.
    pub fn source(&self, eid: EdgeId) -> VertexId {
        self.graph.source(eid)
    }

    /// Target vertex of an edge.
    pub fn target(&self, eid: EdgeId) -> VertexId {
        self.graph.target(eid)
    }

    /// Snapshot of an incident edge's payload, taken under the edge's read
    /// lock.
    pub fn edge_data(&self, eid: EdgeId) -> E
    where
        E: Clone,
    {
        debug_assert!(
            self.is_incident(eid),
            "edge {eid} is not incident to vertex {}",
            self.vertex
        );
        (*self.graph.edge_data(eid)).clone()
    }

    /// Replaces an incident edge's payload under the edge's write lock.
    /// Last write wins when the opposite endpoint writes concurrently.
    pub fn set_edge_data(&self, eid: EdgeId, data: E) {
        debug_assert!(
            self.is_incident(eid),
            "edge {eid} is not incident to vertex {}",
            self.vertex
        );
        self.graph.set_edge_data(eid, data);
    }

    fn is_incident(&self, eid: EdgeId) -> bool {
        self.graph.source(eid) == self.vertex || self.graph.target(eid) == self.vertex
    }
}
