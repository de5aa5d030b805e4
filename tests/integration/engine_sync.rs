#![allow(missing_docs)]

use quiver::{Callback, EngineOptions, Graph, Scope, SyncEngine, VertexId};

// Connected components, two-phase: an init sweep seeds labels and edge
// payloads, then bounded main sweeps propagate minima.

fn concomp_init(
    scope: &mut Scope<'_, u32, u32>,
    _callback: &mut Callback<'_, u32, u32, ()>,
    _context: &(),
) {
    let mut label = scope.vertex().0;
    for &eid in scope.out_edge_ids() {
        label = label.min(scope.target(eid).0);
    }
    for &eid in scope.in_edge_ids() {
        label = label.min(scope.source(eid).0);
    }
    *scope.vertex_data_mut() = label;
    for &eid in scope.out_edge_ids() {
        scope.set_edge_data(eid, label);
    }
}

fn concomp_update(
    scope: &mut Scope<'_, u32, u32>,
    callback: &mut Callback<'_, u32, u32, ()>,
    _context: &(),
) {
    let mut label = *scope.vertex_data();
    for &eid in scope.in_edge_ids() {
        label = label.min(scope.edge_data(eid));
    }
    for &eid in scope.out_edge_ids() {
        label = label.min(scope.edge_data(eid));
    }
    *scope.vertex_data_mut() = label;
    for &eid in scope.out_edge_ids() {
        if label < scope.edge_data(eid) {
            scope.set_edge_data(eid, label);
            callback.add_task(scope.target(eid), concomp_update, 100.0);
        }
    }
    for &eid in scope.in_edge_ids() {
        if label < scope.edge_data(eid) {
            scope.set_edge_data(eid, label);
            callback.add_task(scope.source(eid), concomp_update, 100.0);
        }
    }
}

fn chain(n: u32) -> Graph<u32, u32> {
    let mut graph: Graph<u32, u32> = Graph::with_vertices(n as usize);
    for v in 0..n - 1 {
        graph.add_edge(VertexId(v), VertexId(v + 1), u32::MAX);
    }
    graph.finalize();
    graph
}

#[test]
fn two_phase_connected_components_converge_on_a_chain() {
    let graph = chain(5);
    let mut engine = SyncEngine::new(&graph, (), &EngineOptions::default().workers(2));

    engine.set_update_function(concomp_init);
    engine.start();
    assert_eq!(
        engine.last_update_count(),
        5,
        "init sweep schedules nothing, so it runs exactly once"
    );

    engine.set_update_function(concomp_update);
    engine.start_with_iteration_limit(100);
    for v in 0..5 {
        assert_eq!(
            *graph.vertex_data(VertexId(v)),
            0,
            "vertex {v} must join component 0"
        );
    }
    assert!(
        engine.last_update_count() >= 5,
        "at least one full main sweep ran"
    );
}

fn always_reschedule(
    scope: &mut Scope<'_, u32, u32>,
    callback: &mut Callback<'_, u32, u32, ()>,
    _context: &(),
) {
    callback.add_task(scope.vertex(), always_reschedule, 0.0);
}

#[test]
fn the_iteration_cap_bounds_nonconverging_runs() {
    let graph = chain(4);
    let mut engine = SyncEngine::new(&graph, (), &EngineOptions::default().workers(2));
    engine.set_update_function(always_reschedule);
    engine.start_with_iteration_limit(3);
    assert_eq!(
        engine.last_update_count(),
        3 * 4,
        "three sweeps over four vertices"
    );
}

#[test]
fn start_honors_the_configured_limit() {
    let graph = chain(4);
    let options = EngineOptions::default().workers(2).iteration_limit(2);
    let mut engine = SyncEngine::new(&graph, (), &options);
    engine.set_update_function(always_reschedule);
    engine.start();
    assert_eq!(engine.last_update_count(), 2 * 4);
}

// PageRank, synchronous flavor: the init sweep seeds values and shares, the
// main sweeps run the damped accumulation until no vertex moves.

#[derive(Clone, Copy)]
struct Params {
    damping: f32,
    tolerance: f32,
}

fn pagerank_init(
    scope: &mut Scope<'_, f32, f32>,
    _callback: &mut Callback<'_, f32, f32, Params>,
    _params: &Params,
) {
    *scope.vertex_data_mut() = 0.15;
    let out_degree = scope.out_edge_ids().len();
    if out_degree > 0 {
        let share = 1.0 / out_degree as f32;
        for &eid in scope.out_edge_ids() {
            scope.set_edge_data(eid, share);
        }
    }
}

fn pagerank_update(
    scope: &mut Scope<'_, f32, f32>,
    callback: &mut Callback<'_, f32, f32, Params>,
    params: &Params,
) {
    let mut sum = 0.0f32;
    for &eid in scope.in_edge_ids() {
        sum += scope.edge_data(eid);
    }
    let rank = (1.0 - params.damping) + params.damping * sum;
    let old = *scope.vertex_data();
    if (rank - old).abs() > params.tolerance {
        *scope.vertex_data_mut() = rank;
        let residual = f64::from((rank - old).abs());
        let out_degree = scope.out_edge_ids().len();
        if out_degree > 0 {
            let share = rank / out_degree as f32;
            for &eid in scope.out_edge_ids() {
                scope.set_edge_data(eid, share);
                callback.add_task(scope.target(eid), pagerank_update, residual);
            }
        }
    }
}

#[test]
fn synchronous_pagerank_reproduces_the_classical_ordering() {
    let mut graph: Graph<f32, f32> = Graph::with_vertices(5);
    let links: [&[u32]; 5] = [&[3], &[0, 2], &[0, 1, 3], &[0, 1, 2, 4], &[0, 1, 2, 3]];
    for (page, targets) in links.iter().enumerate() {
        for &target in *targets {
            graph.add_edge(VertexId(page as u32), VertexId(target), 0.0);
        }
    }
    graph.finalize();

    let params = Params {
        damping: 0.85,
        tolerance: 1e-3,
    };
    let mut engine = SyncEngine::new(&graph, params, &EngineOptions::default().workers(2));
    engine.set_update_function(pagerank_init);
    engine.start();
    engine.set_update_function(pagerank_update);
    engine.start_with_iteration_limit(100);

    let rank = |v: u32| *graph.vertex_data(VertexId(v));
    assert!(rank(3) > rank(0), "page 3 outranks page 0");
    assert!(rank(0) > rank(2), "page 0 outranks page 2");
    assert!(rank(2) > rank(1), "page 2 outranks page 1");
    assert!(rank(1) > rank(4), "page 1 outranks page 4");
}

#[test]
fn abort_stops_at_the_next_sweep_boundary() {
    let graph = chain(4);
    let mut engine = SyncEngine::new(&graph, (), &EngineOptions::default().workers(2));
    engine.set_update_function(always_reschedule);
    engine.abort();
    engine.start_with_iteration_limit(50);
    assert_eq!(engine.last_update_count(), 0, "aborted before the first sweep");

    engine.restart();
    engine.start_with_iteration_limit(1);
    assert_eq!(engine.last_update_count(), 4, "restart makes the engine reusable");
}
