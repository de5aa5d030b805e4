//! PageRank client application.
//!
//! Loads an edge-list graph, runs the PageRank update to convergence on the
//! chosen engine, and prints the leading ranks. Edge payloads carry each
//! source's rank share (`rank / out-degree`), so a vertex's new rank is the
//! damped sum of its incoming edge payloads.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quiver::graph::load_edge_list;
use quiver::scheduler::TracingMonitor;
use quiver::{
    AsyncEngine, Callback, EngineMode, EngineOptions, Graph, Scope, SelfLoopPolicy, SyncEngine,
    VertexId,
};

/// Shared context for the PageRank update functions.
#[derive(Clone, Copy, Debug)]
struct Params {
    damping: f32,
    tolerance: f32,
}

const INIT_VALUE: f32 = 0.15;

/// Seeds a vertex: initial rank, uniform out-edge shares, and a follow-up
/// update task for itself (asynchronous flavor).
fn pagerank_init(
    scope: &mut Scope<'_, f32, f32>,
    callback: &mut Callback<'_, f32, f32, Params>,
    _params: &Params,
) {
    *scope.vertex_data_mut() = INIT_VALUE;
    let out_degree = scope.out_edge_ids().len();
    if out_degree > 0 {
        let share = 1.0 / out_degree as f32;
        for &eid in scope.out_edge_ids() {
            scope.set_edge_data(eid, share);
        }
    }
    callback.add_task(scope.vertex(), pagerank_update, 0.0);
}

/// Seeds a vertex without scheduling anything; the synchronous engine
/// revisits every vertex each sweep on its own.
fn pagerank_init_sweep(
    scope: &mut Scope<'_, f32, f32>,
    _callback: &mut Callback<'_, f32, f32, Params>,
    _params: &Params,
) {
    *scope.vertex_data_mut() = INIT_VALUE;
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

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Sync,
    Async,
}

impl From<Mode> for EngineMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Sync => EngineMode::Synchronous,
            Mode::Async => EngineMode::Asynchronous,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pagerank", version, about = "Run PageRank on an edge-list graph")]
struct Cli {
    /// Input edge list, one `source target [weight]` line per edge.
    #[arg(long)]
    infile: PathBuf,

    /// Write `vertex<TAB>rank` lines here when set.
    #[arg(long)]
    outfile: Option<PathBuf>,

    /// Worker threads.
    #[arg(long, default_value_t = 4)]
    ncpus: usize,

    /// Engine flavor.
    #[arg(long, value_enum, default_value_t = Mode::Async)]
    engine: Mode,

    /// Damping factor.
    #[arg(long, default_value_t = 0.85)]
    damping: f32,

    /// Convergence tolerance on a vertex's rank change.
    #[arg(long, default_value_t = 1e-3)]
    tolerance: f32,

    /// Sweep cap for the synchronous engine.
    #[arg(long, default_value_t = 100)]
    iterations: usize,
}

fn main() -> quiver::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let mut graph: Graph<f32, f32> = Graph::new();
    let edges = load_edge_list(&cli.infile, &mut graph, SelfLoopPolicy::Reject, |w| w as f32)?;
    info!(edges, vertices = graph.num_vertices(), "graph loaded");

    let params = Params {
        damping: cli.damping,
        tolerance: cli.tolerance,
    };
    let options = EngineOptions::default()
        .workers(cli.ncpus)
        .mode(cli.engine.into())
        .iteration_limit(cli.iterations);

    let (runtime, updates) = match options.mode {
        EngineMode::Asynchronous => {
            let engine =
                AsyncEngine::new(&graph, params, &options).with_monitor(Arc::new(TracingMonitor));
            engine.add_task_to_all(pagerank_init, 100.0);
            let runtime = engine.start();
            (runtime, engine.last_update_count())
        }
        EngineMode::Synchronous => {
            let mut engine =
                SyncEngine::new(&graph, params, &options).with_monitor(Arc::new(TracingMonitor));
            engine.set_update_function(pagerank_init_sweep);
            engine.start();
            engine.set_update_function(pagerank_update);
            let runtime = engine.start_with_iteration_limit(cli.iterations);
            (runtime, engine.last_update_count())
        }
    };
    println!("pagerank finished, runtime: {runtime:.3} seconds");
    println!("total updates: {updates}");

    let norm: f32 = (0..graph.num_vertices())
        .map(|v| *graph.vertex_data(VertexId(v as u32)))
        .sum();
    for v in 0..graph.num_vertices().min(5) {
        let rank = *graph.vertex_data(VertexId(v as u32));
        println!("page {v} pagerank = {}", rank / norm);
    }

    if let Some(outfile) = &cli.outfile {
        let mut writer = BufWriter::new(File::create(outfile)?);
        for v in 0..graph.num_vertices() {
            let rank = *graph.vertex_data(VertexId(v as u32));
            writeln!(writer, "{v}\t{rank}")?;
        }
        writer.flush()?;
    }
    Ok(())
}
