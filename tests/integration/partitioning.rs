#![allow(missing_docs)]

use quiver::graph::CsrAdjacency;
use quiver::{Graph, KwayPartitioner, PartitionId, PartitionStrategy, VertexId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

struct RoundRobin;

impl KwayPartitioner for RoundRobin {
    fn partition(&self, adjacency: &CsrAdjacency, nparts: usize) -> Vec<PartitionId> {
        (0..adjacency.vertex_weights.len())
            .map(|v| PartitionId((v % nparts) as u32))
            .collect()
    }
}

struct MustNotRun;

impl KwayPartitioner for MustNotRun {
    fn partition(&self, _adjacency: &CsrAdjacency, _nparts: usize) -> Vec<PartitionId> {
        panic!("external partitioner must not run for a single part");
    }
}

/// Two chains and an isolated vertex: 0-1-2-3, 4-5-6, 7.
fn sample_graph() -> Graph<u32, u32> {
    let mut graph = Graph::with_vertices(8);
    for (s, t) in [(0u32, 1u32), (1, 2), (2, 3), (4, 5), (5, 6)] {
        graph.add_edge(VertexId(s), VertexId(t), 1);
    }
    graph.finalize();
    graph
}

fn assert_covers(assignment: &[PartitionId], num_vertices: usize, nparts: usize) {
    assert_eq!(assignment.len(), num_vertices, "one assignment per vertex");
    for (v, part) in assignment.iter().enumerate() {
        assert!(
            part.index() < nparts,
            "vertex {v} assigned to part {part} of {nparts}"
        );
    }
}

#[test]
fn every_strategy_covers_every_vertex() {
    let graph = sample_graph();
    let external = RoundRobin;
    for nparts in 1..=4 {
        for strategy in [
            PartitionStrategy::Random,
            PartitionStrategy::BoundedBfs,
            PartitionStrategy::EdgeBalanced,
            PartitionStrategy::Multilevel {
                partitioner: &external,
                vertex_weight: &|_| 1,
                edge_weight: &|_| 1,
            },
        ] {
            let assignment = graph.partition(strategy, nparts);
            assert_covers(&assignment, graph.num_vertices(), nparts);
        }
    }
}

#[test]
fn single_part_requests_never_reach_the_external_partitioner() {
    let graph = sample_graph();
    let assignment = graph.partition(
        PartitionStrategy::Multilevel {
            partitioner: &MustNotRun,
            vertex_weight: &|_| 1,
            edge_weight: &|_| 1,
        },
        1,
    );
    assert!(assignment.iter().all(|p| p.index() == 0));
}

#[test]
fn random_partition_balances_part_sizes() {
    let graph = sample_graph();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let assignment = graph.random_partition_with(4, &mut rng);
    let mut sizes = [0usize; 4];
    for part in &assignment {
        sizes[part.index()] += 1;
    }
    assert_eq!(sizes, [2, 2, 2, 2], "round-robin base keeps sizes even");

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let replay = graph.random_partition_with(4, &mut rng);
    assert_eq!(assignment, replay, "seeded shuffles replay identically");
}

#[test]
fn bfs_partition_respects_the_growth_bound() {
    let graph = sample_graph();
    for nparts in 1..=4 {
        let assignment = graph.bfs_partition(nparts);
        assert_covers(&assignment, graph.num_vertices(), nparts);
        let bound = graph.num_vertices().div_ceil(nparts);
        let mut sizes = vec![0usize; nparts];
        for part in &assignment {
            sizes[part.index()] += 1;
        }
        for (part, size) in sizes.iter().enumerate() {
            assert!(
                *size <= bound,
                "part {part} grew to {size}, bound is {bound}"
            );
        }
    }
}

#[test]
fn bfs_partition_keeps_a_chain_contiguous() {
    // One part fits the whole first chain.
    let graph = sample_graph();
    let assignment = graph.bfs_partition(2);
    assert_eq!(assignment[0], assignment[1]);
    assert_eq!(assignment[1], assignment[2]);
    assert_eq!(assignment[2], assignment[3]);
}

#[test]
fn edge_balanced_partition_spreads_degree_mass() {
    let graph = sample_graph();
    let assignment = graph.edge_balanced_partition(2);
    assert_covers(&assignment, graph.num_vertices(), 2);
    // The scan advances once the first part holds half the degree mass, so
    // the second chain and the isolated vertex land in the second part.
    assert_ne!(assignment[0], assignment[7]);
}

#[test]
fn weighted_multilevel_passes_weights_through() {
    use std::sync::Mutex;

    struct Capture {
        weights: Mutex<Option<(Vec<i64>, Vec<i64>)>>,
    }

    impl KwayPartitioner for Capture {
        fn partition(&self, adjacency: &CsrAdjacency, nparts: usize) -> Vec<PartitionId> {
            *self.weights.lock().unwrap() = Some((
                adjacency.vertex_weights.clone(),
                adjacency.edge_weights.clone(),
            ));
            (0..adjacency.vertex_weights.len())
                .map(|v| PartitionId((v % nparts) as u32))
                .collect()
        }
    }

    let mut graph: Graph<u32, u32> = Graph::with_vertices(3);
    graph.add_vertex(0);
    graph.add_edge(VertexId(0), VertexId(1), 5);
    graph.add_edge(VertexId(1), VertexId(2), 9);
    let capture = Capture {
        weights: Mutex::new(None),
    };
    graph.multilevel_partition(2, &capture, |&v| i64::from(v) + 1, |&e| i64::from(e));
    let (vertex_weights, edge_weights) = capture
        .weights
        .lock()
        .unwrap()
        .take()
        .expect("partitioner ran");
    assert_eq!(vertex_weights.len(), 4);
    assert!(edge_weights.contains(&5) && edge_weights.contains(&9));
}
