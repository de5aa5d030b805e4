//! Barrier-separated synchronous execution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info};

use super::{Callback, EngineOptions, Scope};
use crate::graph::Graph;
use crate::scheduler::{FifoScheduler, SchedulerMonitor, UpdateFn};
use crate::types::VertexId;

/// Synchronous engine: one global update function sweeps every vertex, with
/// a full barrier between sweeps.
///
/// Within a sweep the vertex range is split across the worker pool and
/// updates run in place; the barrier is the per-sweep join. Tasks that
/// update functions schedule through their [`Callback`] are not executed
/// individually — every vertex runs again next sweep anyway — they are
/// drained at the barrier and their count is the convergence signal: a
/// sweep that schedules nothing is a fixed point.
///
/// The bound update function may be swapped between runs, supporting the
/// two-phase protocol of an initialization sweep followed by bounded
/// steady-state sweeps.
pub struct SyncEngine<'g, V, E, C> {
    graph: &'g Graph<V, E>,
    scheduler: FifoScheduler<V, E, C>,
    context: C,
    workers: usize,
    iteration_limit: usize,
    update: Option<UpdateFn<V, E, C>>,
    update_count: AtomicU64,
}

impl<'g, V, E, C> SyncEngine<'g, V, E, C>
where
    V: Send + Sync,
    E: Send + Sync,
    C: Sync,
{
    /// Creates an engine over `graph`; `context` is shared read-only by
    /// every update invocation.
    pub fn new(graph: &'g Graph<V, E>, context: C, options: &EngineOptions) -> Self {
        Self {
            graph,
            scheduler: FifoScheduler::new(graph.num_vertices()),
            context,
            workers: options.workers,
            iteration_limit: options.iteration_limit,
            update: None,
            update_count: AtomicU64::new(0),
        }
    }

    /// Attaches an observability monitor to the engine's scheduler.
    pub fn with_monitor(mut self, monitor: Arc<dyn SchedulerMonitor>) -> Self {
        self.scheduler = self.scheduler.with_monitor(monitor);
        self
    }

    /// Binds the update function for subsequent runs.
    pub fn set_update_function(&mut self, update: UpdateFn<V, E, C>) {
        self.update = Some(update);
    }

    /// Runs sweeps until one schedules no follow-up work, capped by the
    /// configured iteration limit. Returns wall-clock seconds.
    ///
    /// # Panics
    /// Panics when no update function has been bound.
    pub fn start(&self) -> f64 {
        self.run(self.iteration_limit)
    }

    /// [`SyncEngine::start`] with an explicit sweep cap.
    ///
    /// # Panics
    /// Panics when no update function has been bound.
    pub fn start_with_iteration_limit(&self, limit: usize) -> f64 {
        self.run(limit)
    }

    fn run(&self, limit: usize) -> f64 {
        let update = self
            .update
            .expect("update function must be set before starting");
        self.update_count.store(0, Ordering::Relaxed);
        let started = Instant::now();
        let num_vertices = self.graph.num_vertices();
        let chunk = num_vertices.div_ceil(self.workers.max(1)).max(1);
        for sweep in 0..limit {
            if self.scheduler.aborted() {
                debug!(sweep, "aborting before sweep");
                break;
            }
            thread::scope(|pool| {
                for (worker, begin) in (0..num_vertices).step_by(chunk).enumerate() {
                    let end = (begin + chunk).min(num_vertices);
                    let scheduler = &self.scheduler;
                    let graph = self.graph;
                    let context = &self.context;
                    pool.spawn(move || {
                        let mut callback = Callback::new(scheduler, worker);
                        for v in begin..end {
                            let mut scope = Scope::new(graph, VertexId(v as u32));
                            update(&mut scope, &mut callback, context);
                        }
                    });
                }
            });
            self.update_count.fetch_add(num_vertices as u64, Ordering::Relaxed);
            let scheduled = self.scheduler.drain_pending();
            debug!(sweep, scheduled, "sweep complete");
            if scheduled == 0 {
                break;
            }
        }
        let elapsed = started.elapsed().as_secs_f64();
        info!(
            updates = self.last_update_count(),
            elapsed, "synchronous run finished"
        );
        elapsed
    }

    /// Updates executed during the most recent run.
    pub fn last_update_count(&self) -> u64 {
        self.update_count.load(Ordering::Relaxed)
    }

    /// Stops the run at the next sweep boundary.
    pub fn abort(&self) {
        self.scheduler.abort();
    }

    /// Clears an abort and the scheduler's counts for reuse.
    pub fn restart(&self) {
        self.scheduler.restart();
    }
}
