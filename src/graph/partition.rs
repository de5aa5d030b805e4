//! Vertex partitioning strategies.
//!
//! Three strategies are computed in-crate (random, bounded breadth-first
//! growth, edge-count balanced); balanced multilevel k-way partitioning is
//! delegated to an external collaborator through [`KwayPartitioner`], which
//! receives a CSR adjacency description and returns a vertex-indexed
//! assignment.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;
use tracing::debug;

use super::Graph;
use crate::types::{PartitionId, VertexId};

/// CSR-style adjacency description consumed by an external partitioner.
///
/// Neighbor lists are undirected, deduplicated, and exclude self-loops;
/// `offsets` has one entry per vertex plus a trailing end offset.
pub struct CsrAdjacency {
    /// Start offset of each vertex's neighbor slice, plus the total length.
    pub offsets: Vec<usize>,
    /// Concatenated neighbor ids.
    pub neighbors: Vec<VertexId>,
    /// One weight per vertex.
    pub vertex_weights: Vec<i64>,
    /// One weight per `neighbors` entry.
    pub edge_weights: Vec<i64>,
}

/// Boundary to an external balanced multilevel k-way graph partitioner.
pub trait KwayPartitioner {
    /// Partitions the described graph into `nparts` parts, returning one
    /// assignment per vertex with values in `[0, nparts)`.
    fn partition(&self, adjacency: &CsrAdjacency, nparts: usize) -> Vec<PartitionId>;
}

/// Selects how [`Graph::partition`] assigns vertices to parts.
pub enum PartitionStrategy<'a, V, E> {
    /// Round-robin assignment followed by a shuffle.
    Random,
    /// Grows one partition at a time by breadth-first search from an
    /// unassigned seed until it holds ⌈V/nparts⌉ vertices.
    BoundedBfs,
    /// Greedy scan balancing the accumulated degree sum per partition.
    EdgeBalanced,
    /// External weighted multilevel partitioning over a CSR description.
    Multilevel {
        /// The external partitioner to invoke.
        partitioner: &'a dyn KwayPartitioner,
        /// Maps a vertex payload to its weight.
        vertex_weight: &'a dyn Fn(&V) -> i64,
        /// Maps an edge payload to its weight.
        edge_weight: &'a dyn Fn(&E) -> i64,
    },
}

impl<V, E> Graph<V, E> {
    /// Assigns every vertex to a partition in `[0, nparts)` using the given
    /// strategy.
    ///
    /// # Panics
    /// Panics when `nparts` is zero.
    pub fn partition(
        &self,
        strategy: PartitionStrategy<'_, V, E>,
        nparts: usize,
    ) -> Vec<PartitionId> {
        match strategy {
            PartitionStrategy::Random => self.random_partition(nparts),
            PartitionStrategy::BoundedBfs => self.bfs_partition(nparts),
            PartitionStrategy::EdgeBalanced => self.edge_balanced_partition(nparts),
            PartitionStrategy::Multilevel {
                partitioner,
                vertex_weight,
                edge_weight,
            } => self.multilevel_partition(nparts, partitioner, vertex_weight, edge_weight),
        }
    }

    /// Random partitioning: round-robin then shuffle, so part sizes differ
    /// by at most one.
    pub fn random_partition(&self, nparts: usize) -> Vec<PartitionId> {
        self.random_partition_with(nparts, &mut rand::thread_rng())
    }

    /// [`Graph::random_partition`] with a caller-supplied random source.
    pub fn random_partition_with<R: Rng + ?Sized>(
        &self,
        nparts: usize,
        rng: &mut R,
    ) -> Vec<PartitionId> {
        assert!(nparts >= 1, "partition count must be at least 1");
        let mut assignment: Vec<PartitionId> = (0..self.num_vertices())
            .map(|v| PartitionId((v % nparts) as u32))
            .collect();
        assignment.shuffle(rng);
        assignment
    }

    /// Bounded breadth-first partitioning: grows one part at a time from an
    /// unassigned seed until the part reaches ⌈V/nparts⌉ vertices.
    pub fn bfs_partition(&self, nparts: usize) -> Vec<PartitionId> {
        assert!(nparts >= 1, "partition count must be at least 1");
        let num_vertices = self.num_vertices();
        let mut assignment = vec![PartitionId(0); num_vertices];
        let mut unassigned: BTreeSet<VertexId> =
            (0..num_vertices).map(|v| VertexId(v as u32)).collect();
        let max_part_size = num_vertices.div_ceil(nparts);

        let mut part = 0usize;
        while !unassigned.is_empty() {
            let mut queue: VecDeque<VertexId> = VecDeque::new();
            let mut visited: FxHashSet<VertexId> = FxHashSet::default();
            let mut part_size = 0usize;
            while part_size < max_part_size && !unassigned.is_empty() {
                if queue.is_empty() {
                    let seed = *unassigned.iter().next().expect("unassigned set is non-empty");
                    queue.push_front(seed);
                    visited.insert(seed);
                }
                let v = queue.pop_front().expect("queue was just seeded");
                assert!(part < nparts, "breadth-first growth overran the part count");
                assignment[v.index()] = PartitionId(part as u32);
                part_size += 1;
                unassigned.remove(&v);
                for &eid in self.out_edge_ids(v) {
                    let u = self.target(eid);
                    if unassigned.contains(&u) && visited.insert(u) {
                        queue.push_back(u);
                    }
                }
                for &eid in self.in_edge_ids(v) {
                    let u = self.source(eid);
                    if unassigned.contains(&u) && visited.insert(u) {
                        queue.push_back(u);
                    }
                }
            }
            part += 1;
        }
        debug!(nparts, parts_used = part, "bounded breadth-first partition");
        assignment
    }

    /// Edge-count balanced partitioning: a greedy scan assigns vertices to
    /// the current part until its accumulated degree sum crosses the
    /// per-part average, then advances.
    pub fn edge_balanced_partition(&self, nparts: usize) -> Vec<PartitionId> {
        assert!(nparts >= 1, "partition count must be at least 1");
        let edges_per_part = 2 * self.num_edges() / nparts;
        let mut assignment = vec![PartitionId(0); self.num_vertices()];
        let mut loads = vec![0usize; nparts];
        let mut part = 0usize;
        for v in 0..self.num_vertices() {
            let vid = VertexId(v as u32);
            let degree = self.num_out_neighbors(vid) + self.num_in_neighbors(vid);
            assignment[v] = PartitionId(part as u32);
            loads[part] += degree;
            if loads[part] >= edges_per_part && part < nparts - 1 {
                part += 1;
            }
        }
        assignment
    }

    /// Weighted multilevel partitioning through the external collaborator.
    ///
    /// Builds a CSR adjacency description with vertex and edge weights from
    /// the supplied functions and hands it to `partitioner`. A request for
    /// exactly one part short-circuits to an all-zeros assignment without
    /// invoking the partitioner.
    ///
    /// # Panics
    /// Panics when `nparts` is zero or the partitioner returns an
    /// assignment of the wrong length.
    pub fn multilevel_partition<VW, EW>(
        &self,
        nparts: usize,
        partitioner: &dyn KwayPartitioner,
        vertex_weight: VW,
        edge_weight: EW,
    ) -> Vec<PartitionId>
    where
        VW: Fn(&V) -> i64,
        EW: Fn(&E) -> i64,
    {
        assert!(nparts >= 1, "partition count must be at least 1");
        if nparts == 1 {
            return vec![PartitionId(0); self.num_vertices()];
        }
        let adjacency = self.build_csr(vertex_weight, edge_weight);
        let assignment = partitioner.partition(&adjacency, nparts);
        assert!(
            assignment.len() == self.num_vertices(),
            "external partitioner returned {} assignments for {} vertices",
            assignment.len(),
            self.num_vertices()
        );
        assignment
    }

    fn build_csr<VW, EW>(&self, vertex_weight: VW, edge_weight: EW) -> CsrAdjacency
    where
        VW: Fn(&V) -> i64,
        EW: Fn(&E) -> i64,
    {
        let num_vertices = self.num_vertices();
        let mut offsets = Vec::with_capacity(num_vertices + 1);
        let mut neighbors = Vec::new();
        let mut vertex_weights = Vec::with_capacity(num_vertices);
        let mut edge_weights = Vec::new();
        for v in 0..num_vertices {
            let vid = VertexId(v as u32);
            vertex_weights.push(vertex_weight(&self.vertex_data(vid)));
            offsets.push(neighbors.len());
            // Undirected view: a neighbor reachable both ways keeps the
            // weight of the incoming edge, matching the scan order below.
            let mut weight_by_neighbor: BTreeMap<VertexId, i64> = BTreeMap::new();
            for &eid in self.out_edge_ids(vid) {
                weight_by_neighbor.insert(self.target(eid), edge_weight(&self.edge_data(eid)));
            }
            for &eid in self.in_edge_ids(vid) {
                weight_by_neighbor.insert(self.source(eid), edge_weight(&self.edge_data(eid)));
            }
            for (neighbor, weight) in weight_by_neighbor {
                if neighbor == vid {
                    continue;
                }
                neighbors.push(neighbor);
                edge_weights.push(weight);
            }
        }
        offsets.push(neighbors.len());
        CsrAdjacency {
            offsets,
            neighbors,
            vertex_weights,
            edge_weights,
        }
    }
}
