//! Connected-components client application.
//!
//! Labels every vertex with the smallest vertex id reachable along edges in
//! either direction. Edge payloads carry the smallest label either endpoint
//! has pushed so far; updates keep folding incident edge payloads into the
//! vertex label until no edge disagrees with its endpoint minimum.

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

/// Seeds a vertex with the minimum of its own id and its neighbors' ids and
/// pushes that label onto its outgoing edges.
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

/// [`concomp_init`] plus a follow-up task for itself, for the asynchronous
/// engine where nothing revisits a vertex unless scheduled.
fn concomp_init_dynamic(
    scope: &mut Scope<'_, u32, u32>,
    callback: &mut Callback<'_, u32, u32, ()>,
    context: &(),
) {
    concomp_init(scope, callback, context);
    callback.add_task(scope.vertex(), concomp_update, 0.0);
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
#[command(
    name = "concomp",
    version,
    about = "Label connected components of an edge-list graph"
)]
struct Cli {
    /// Input edge list, one `source target [weight]` line per edge.
    #[arg(long)]
    infile: PathBuf,

    /// Write `vertex<TAB>component` lines here when set.
    #[arg(long)]
    outfile: Option<PathBuf>,

    /// Worker threads.
    #[arg(long, default_value_t = 4)]
    ncpus: usize,

    /// Engine flavor.
    #[arg(long, value_enum, default_value_t = Mode::Sync)]
    engine: Mode,

    /// Sweep cap for the synchronous engine's main phase.
    #[arg(long, default_value_t = 100)]
    iterations: usize,
}

fn main() -> quiver::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let mut graph: Graph<u32, u32> = Graph::new();
    // Edge payloads start at the "no label yet" sentinel regardless of any
    // weight column.
    let edges = load_edge_list(&cli.infile, &mut graph, SelfLoopPolicy::Ignore, |_| u32::MAX)?;
    info!(edges, vertices = graph.num_vertices(), "graph loaded");

    let options = EngineOptions::default()
        .workers(cli.ncpus)
        .mode(cli.engine.into())
        .iteration_limit(cli.iterations);

    let (runtime, updates) = match options.mode {
        EngineMode::Synchronous => {
            let mut engine =
                SyncEngine::new(&graph, (), &options).with_monitor(Arc::new(TracingMonitor));
            engine.set_update_function(concomp_init);
            engine.start();
            engine.set_update_function(concomp_update);
            let runtime = engine.start_with_iteration_limit(cli.iterations);
            (runtime, engine.last_update_count())
        }
        EngineMode::Asynchronous => {
            let engine =
                AsyncEngine::new(&graph, (), &options).with_monitor(Arc::new(TracingMonitor));
            engine.add_task_to_all(concomp_init_dynamic, 100.0);
            let runtime = engine.start();
            (runtime, engine.last_update_count())
        }
    };
    println!("concomp finished, runtime: {runtime:.3} seconds");
    println!("total updates: {updates}");

    for v in 0..graph.num_vertices().min(5) {
        let label = *graph.vertex_data(VertexId(v as u32));
        println!("vertex {v} component = {label}");
    }

    if let Some(outfile) = &cli.outfile {
        let mut writer = BufWriter::new(File::create(outfile)?);
        for v in 0..graph.num_vertices() {
            let label = *graph.vertex_data(VertexId(v as u32));
            writeln!(writer, "{v}\t{label}")?;
        }
        writer.flush()?;
    }
    Ok(())
}
