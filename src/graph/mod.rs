//! Graph storage with incremental adjacency indexing.
//!
//! [`Graph`] behaves like a growable container of vertex payloads with edge
//! payloads attached to selected (source, target) pairs. Two adjacency
//! indexes (incoming and outgoing edge-id lists per vertex) support
//! neighborhood iteration; once [`Graph::finalize`] has sorted them, edge
//! existence checks drop from `O(degree)` to `O(log degree)`.
//!
//! Payloads live in [`parking_lot::RwLock`] cells so that the execution
//! engines can mutate them in place from many worker threads. See
//! [`crate::engine::Scope`] for the access contract.

use std::collections::{BTreeSet, VecDeque};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rand::seq::SliceRandom;
use rand::Rng;
use smallvec::SmallVec;
use tracing::info;

use crate::error::{GraphError, Result};
use crate::types::{Color, EdgeId, VertexId};

mod archive;
mod edge_list;
mod partition;

pub use archive::Codec;
pub use edge_list::{load_edge_list, SelfLoopPolicy};
pub use partition::{CsrAdjacency, KwayPartitioner, PartitionStrategy};

/// Edge-id list kept per vertex. Most vertices in the graphs this runtime
/// targets have small degree, so a few ids stay inline.
pub(crate) type AdjacencyList = SmallVec<[EdgeId; 4]>;

#[derive(Debug)]
struct EdgeRecord<E> {
    source: VertexId,
    target: VertexId,
    data: RwLock<E>,
}

/// Directed graph owning vertex payloads, edge payloads, adjacency indexes,
/// and an optional vertex coloring.
///
/// Vertices and edges are append-only; ids are dense and 0-based. The
/// `finalized` flag is true exactly when both adjacency indexes are sorted
/// by the (source, target) key of their edges with no missed incremental
/// updates.
#[derive(Debug)]
pub struct Graph<V, E> {
    vertices: Vec<RwLock<V>>,
    edges: Vec<EdgeRecord<E>>,
    in_edges: Vec<AdjacencyList>,
    out_edges: Vec<AdjacencyList>,
    colors: Vec<Color>,
    finalized: bool,
}

impl<V, E> Default for Graph<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Graph<V, E> {
    /// Creates an empty graph. An empty graph is trivially finalized.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            in_edges: Vec::new(),
            out_edges: Vec::new(),
            colors: Vec::new(),
            finalized: true,
        }
    }

    /// Creates a graph with `num_vertices` default-initialized vertices.
    pub fn with_vertices(num_vertices: usize) -> Self
    where
        V: Default,
    {
        let mut graph = Self::new();
        graph.resize(num_vertices);
        graph
    }

    /// Drops all vertices, edges, adjacency entries, and colors.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.in_edges.clear();
        self.out_edges.clear();
        self.colors.clear();
        self.finalized = true;
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Whether both adjacency indexes are known to be sorted.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Appends a vertex and returns its id.
    pub fn add_vertex(&mut self, data: V) -> VertexId {
        let id = VertexId(u32::try_from(self.vertices.len()).expect("vertex id space exhausted"));
        self.vertices.push(RwLock::new(data));
        self.in_edges.push(AdjacencyList::new());
        self.out_edges.push(AdjacencyList::new());
        self.colors.push(0);
        id
    }

    /// Grows the vertex count to `num_vertices`.
    ///
    /// # Panics
    /// Panics when `num_vertices` is smaller than the current count; the id
    /// space only grows.
    pub fn resize(&mut self, num_vertices: usize)
    where
        V: Default,
    {
        assert!(
            num_vertices >= self.vertices.len(),
            "resize({num_vertices}) would shrink a graph of {} vertices",
            self.vertices.len()
        );
        self.vertices
            .resize_with(num_vertices, || RwLock::new(V::default()));
        self.in_edges.resize_with(num_vertices, AdjacencyList::new);
        self.out_edges.resize_with(num_vertices, AdjacencyList::new);
        self.colors.resize(num_vertices, 0);
    }

    /// Appends a directed edge and updates both adjacency indexes.
    ///
    /// The finalized flag is re-derived incrementally: only the newly
    /// appended tail pair of each touched list is compared, so bulk loading
    /// in (source, target) order never triggers a re-sort.
    ///
    /// # Panics
    /// Panics when either endpoint is not a known vertex.
    pub fn add_edge(&mut self, source: VertexId, target: VertexId, data: E) -> EdgeId {
        assert!(
            source.index() < self.vertices.len() && target.index() < self.vertices.len(),
            "add_edge({source} -> {target}) with only {} vertices",
            self.vertices.len()
        );
        let eid = EdgeId(u32::try_from(self.edges.len()).expect("edge id space exhausted"));
        self.edges.push(EdgeRecord {
            source,
            target,
            data: RwLock::new(data),
        });
        self.in_edges[target.index()].push(eid);
        self.out_edges[source.index()].push(eid);
        self.finalized = self.finalized
            && self.tail_in_order(&self.in_edges[target.index()])
            && self.tail_in_order(&self.out_edges[source.index()]);
        eid
    }

    fn tail_in_order(&self, list: &[EdgeId]) -> bool {
        match list {
            [.., a, b] => self.edge_id_less(*a, *b),
            _ => true,
        }
    }

    pub(crate) fn edge_key(&self, eid: EdgeId) -> (VertexId, VertexId) {
        let record = &self.edges[eid.index()];
        (record.source, record.target)
    }

    fn edge_id_less(&self, a: EdgeId, b: EdgeId) -> bool {
        self.edge_key(a) < self.edge_key(b)
    }

    /// Source vertex of an edge.
    pub fn source(&self, eid: EdgeId) -> VertexId {
        self.edges[eid.index()].source
    }

    /// Target vertex of an edge.
    pub fn target(&self, eid: EdgeId) -> VertexId {
        self.edges[eid.index()].target
    }

    /// Incoming edge ids of a vertex, ordered by (source, target) key once
    /// the graph is finalized.
    pub fn in_edge_ids(&self, v: VertexId) -> &[EdgeId] {
        assert!(v.index() < self.vertices.len(), "vertex {v} out of range");
        &self.in_edges[v.index()]
    }

    /// Outgoing edge ids of a vertex.
    pub fn out_edge_ids(&self, v: VertexId) -> &[EdgeId] {
        assert!(v.index() < self.vertices.len(), "vertex {v} out of range");
        &self.out_edges[v.index()]
    }

    /// In-degree of a vertex.
    pub fn num_in_neighbors(&self, v: VertexId) -> usize {
        self.in_edge_ids(v).len()
    }

    /// Out-degree of a vertex.
    pub fn num_out_neighbors(&self, v: VertexId) -> usize {
        self.out_edge_ids(v).len()
    }

    /// Looks up the edge connecting `source` to `target`.
    ///
    /// Searches whichever of the two relevant adjacency lists is shorter,
    /// bounding the cost by `min(in-degree(target), out-degree(source))`:
    /// binary search when finalized, linear scan otherwise.
    pub fn find(&self, source: VertexId, target: VertexId) -> Option<EdgeId> {
        assert!(
            source.index() < self.vertices.len() && target.index() < self.vertices.len(),
            "find({source}, {target}) with only {} vertices",
            self.vertices.len()
        );
        let ins = &self.in_edges[target.index()];
        let outs = &self.out_edges[source.index()];
        if ins.is_empty() || outs.is_empty() {
            return None;
        }
        let list: &[EdgeId] = if ins.len() < outs.len() { ins } else { outs };
        if self.finalized {
            list.binary_search_by(|&eid| self.edge_key(eid).cmp(&(source, target)))
                .ok()
                .map(|i| list[i])
        } else {
            list.iter()
                .copied()
                .find(|&eid| self.edge_key(eid) == (source, target))
        }
    }

    /// Id of the edge connecting `source` to `target`.
    ///
    /// # Panics
    /// Panics when the edge does not exist.
    pub fn edge_id(&self, source: VertexId, target: VertexId) -> EdgeId {
        self.find(source, target)
            .unwrap_or_else(|| panic!("no edge {source} -> {target}"))
    }

    /// Id of the edge pointing the opposite way along `eid`.
    ///
    /// # Panics
    /// Panics when the reverse edge does not exist.
    pub fn rev_edge_id(&self, eid: EdgeId) -> EdgeId {
        let (source, target) = self.edge_key(eid);
        self.edge_id(target, source)
    }

    /// Sorts both adjacency indexes by the (source, target) key of their
    /// edges. No-op when already finalized.
    ///
    /// # Panics
    /// Panics when a vertex carries two parallel edges between the same
    /// ordered pair; duplicate edges are not a supported input.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        info!(
            vertices = self.vertices.len(),
            edges = self.edges.len(),
            "sorting adjacency indexes"
        );
        let edges = &self.edges;
        let key = |eid: EdgeId| {
            let record = &edges[eid.index()];
            (record.source, record.target)
        };
        for list in self.in_edges.iter_mut().chain(self.out_edges.iter_mut()) {
            list.sort_by_key(|&eid| key(eid));
            for pair in list.windows(2) {
                let (source, target) = key(pair[1]);
                assert!(
                    key(pair[0]) < key(pair[1]),
                    "duplicate edge {source} -> {target} in adjacency index"
                );
            }
        }
        self.finalized = true;
    }

    /// Read access to a vertex payload.
    pub fn vertex_data(&self, v: VertexId) -> RwLockReadGuard<'_, V> {
        assert!(v.index() < self.vertices.len(), "vertex {v} out of range");
        self.vertices[v.index()].read()
    }

    /// Exclusive access to a vertex payload from a shared graph reference.
    /// Held by the engine's [`crate::engine::Scope`] for the duration of an
    /// update call.
    pub fn write_vertex(&self, v: VertexId) -> RwLockWriteGuard<'_, V> {
        assert!(v.index() < self.vertices.len(), "vertex {v} out of range");
        self.vertices[v.index()].write()
    }

    /// Mutable access to a vertex payload through exclusive graph ownership.
    pub fn vertex_data_mut(&mut self, v: VertexId) -> &mut V {
        assert!(v.index() < self.vertices.len(), "vertex {v} out of range");
        self.vertices[v.index()].get_mut()
    }

    /// Read access to an edge payload.
    ///
    /// An edge payload may be written concurrently by updates rooted at
    /// either endpoint; between lock acquisitions a reader may observe the
    /// value from before or after such a write.
    pub fn edge_data(&self, eid: EdgeId) -> RwLockReadGuard<'_, E> {
        assert!(eid.index() < self.edges.len(), "edge {eid} out of range");
        self.edges[eid.index()].data.read()
    }

    /// Replaces an edge payload under the edge's write lock. Last write wins
    /// when both endpoints race.
    pub fn set_edge_data(&self, eid: EdgeId, data: E) {
        assert!(eid.index() < self.edges.len(), "edge {eid} out of range");
        *self.edges[eid.index()].data.write() = data;
    }

    /// Mutable access to an edge payload through exclusive graph ownership.
    pub fn edge_data_mut(&mut self, eid: EdgeId) -> &mut E {
        assert!(eid.index() < self.edges.len(), "edge {eid} out of range");
        self.edges[eid.index()].data.get_mut()
    }

    /// Read access to the payload of the edge connecting `source` to
    /// `target`.
    ///
    /// # Panics
    /// Panics when the edge does not exist.
    pub fn edge_data_between(&self, source: VertexId, target: VertexId) -> RwLockReadGuard<'_, E> {
        self.edge_data(self.edge_id(source, target))
    }

    /// Color assigned to a vertex.
    pub fn color(&self, v: VertexId) -> Color {
        assert!(v.index() < self.vertices.len(), "vertex {v} out of range");
        self.colors[v.index()]
    }

    /// Overrides the color of a vertex.
    pub fn set_color(&mut self, v: VertexId, color: Color) {
        assert!(v.index() < self.vertices.len(), "vertex {v} out of range");
        self.colors[v.index()] = color;
    }

    /// Greedily colors the graph over a randomized vertex order and returns
    /// the number of colors used.
    ///
    /// Each vertex receives the smallest color not used by any neighbor in
    /// either direction, so two vertices joined by an edge never share a
    /// color; [`Graph::valid_coloring`] re-checks the result.
    pub fn compute_coloring(&mut self) -> usize {
        self.compute_coloring_with(&mut rand::thread_rng())
    }

    /// [`Graph::compute_coloring`] with a caller-supplied random source, for
    /// deterministic runs.
    ///
    /// # Panics
    /// Panics when a vertex's neighborhood exhausts all 256 colors.
    pub fn compute_coloring_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        for color in self.colors.iter_mut() {
            *color = 0;
        }
        let mut permutation: Vec<VertexId> =
            (0..self.vertices.len()).map(|v| VertexId(v as u32)).collect();
        permutation.shuffle(rng);

        let mut max_color: Color = 0;
        let mut neighbor_colors: BTreeSet<Color> = BTreeSet::new();
        for &vid in &permutation {
            neighbor_colors.clear();
            // Both directions: a vertex colored later must see the final
            // color of every already-colored neighbor, not only those its
            // in-index records.
            for &eid in &self.in_edges[vid.index()] {
                let neighbor = self.edges[eid.index()].source;
                neighbor_colors.insert(self.colors[neighbor.index()]);
            }
            for &eid in &self.out_edges[vid.index()] {
                let neighbor = self.edges[eid.index()].target;
                neighbor_colors.insert(self.colors[neighbor.index()]);
            }
            // The set iterates in ascending order, so walking it finds the
            // smallest free color.
            let mut color: Color = 0;
            for &used in &neighbor_colors {
                if color != used {
                    break;
                }
                color = color
                    .checked_add(1)
                    .expect("vertex neighborhood exhausted the color space");
            }
            self.colors[vid.index()] = color;
            max_color = max_color.max(color);
        }
        max_color as usize + 1
    }

    /// Whether no vertex shares a color with any of its in-neighbors.
    pub fn valid_coloring(&self) -> bool {
        for (v, list) in self.in_edges.iter().enumerate() {
            let own = self.colors[v];
            for &eid in list {
                let neighbor = self.edges[eid.index()].source;
                if self.colors[neighbor.index()] == own {
                    return false;
                }
            }
        }
        true
    }

    /// Orders the vertices so every edge points forward (Kahn's algorithm).
    ///
    /// # Errors
    /// Returns [`GraphError::CycleDetected`] when a cycle prevents a
    /// complete ordering.
    pub fn topological_sort(&self) -> Result<Vec<VertexId>> {
        let mut indegree: Vec<usize> = self.in_edges.iter().map(SmallVec::len).collect();
        let mut frontier: VecDeque<VertexId> = indegree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg == 0)
            .map(|(v, _)| VertexId(v as u32))
            .collect();
        let mut order = Vec::with_capacity(self.vertices.len());
        while let Some(v) = frontier.pop_front() {
            order.push(v);
            for &eid in &self.out_edges[v.index()] {
                let next = self.edges[eid.index()].target;
                indegree[next.index()] -= 1;
                if indegree[next.index()] == 0 {
                    frontier.push_back(next);
                }
            }
        }
        if order.len() != self.vertices.len() {
            return Err(GraphError::CycleDetected);
        }
        Ok(order)
    }
}
