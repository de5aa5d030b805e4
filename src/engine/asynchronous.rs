//! Continuous-pull asynchronous execution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info};

use super::{Callback, EngineOptions, Scope};
use crate::graph::Graph;
use crate::scheduler::{FifoScheduler, SchedulerMonitor, SchedulerStatus, Task, UpdateFn};
use crate::types::VertexId;

/// Asynchronous engine: a fixed pool of workers repeatedly pulls vertex
/// tasks from the scheduler, with no barriers between updates.
///
/// Each worker builds a [`Scope`] for its task's vertex, invokes the bound
/// update function (which may schedule follow-up tasks through its
/// [`Callback`]), and reports completion. A worker seeing `Waiting` yields
/// and retries; a worker seeing `Complete` exits. The run ends when the
/// termination detector observes zero outstanding jobs with no worker
/// mid-update.
pub struct AsyncEngine<'g, V, E, C> {
    graph: &'g Graph<V, E>,
    scheduler: FifoScheduler<V, E, C>,
    context: C,
    workers: usize,
    update_count: AtomicU64,
}

impl<'g, V, E, C> AsyncEngine<'g, V, E, C>
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
            update_count: AtomicU64::new(0),
        }
    }

    /// Attaches an observability monitor to the engine's scheduler.
    pub fn with_monitor(mut self, monitor: Arc<dyn SchedulerMonitor>) -> Self {
        self.scheduler = self.scheduler.with_monitor(monitor);
        self
    }

    /// The scheduler backing this engine.
    pub fn scheduler(&self) -> &FifoScheduler<V, E, C> {
        &self.scheduler
    }

    /// Schedules `update` on one vertex.
    pub fn add_task(&self, vertex: VertexId, update: UpdateFn<V, E, C>, priority: f64) {
        self.scheduler.add_task(Task::new(vertex, update), priority);
    }

    /// Schedules `update` on each listed vertex.
    pub fn add_tasks(&self, vertices: &[VertexId], update: UpdateFn<V, E, C>, priority: f64) {
        self.scheduler.add_tasks(vertices, update, priority);
    }

    /// Schedules `update` on every vertex.
    pub fn add_task_to_all(&self, update: UpdateFn<V, E, C>, priority: f64) {
        self.scheduler.add_task_to_all(update, priority);
    }

    /// Runs the worker pool until the scheduler reports completion.
    /// Returns wall-clock seconds.
    pub fn start(&self) -> f64 {
        self.update_count.store(0, Ordering::Relaxed);
        let started = Instant::now();
        thread::scope(|pool| {
            for worker in 0..self.workers {
                pool.spawn(move || self.worker_loop(worker));
            }
        });
        let elapsed = started.elapsed().as_secs_f64();
        info!(
            workers = self.workers,
            updates = self.last_update_count(),
            elapsed,
            "asynchronous run finished"
        );
        elapsed
    }

    fn worker_loop(&self, worker: usize) {
        let mut executed = 0u64;
        loop {
            match self.scheduler.get_next_task(worker) {
                SchedulerStatus::Complete => break,
                SchedulerStatus::Waiting => {
                    std::hint::spin_loop();
                    thread::yield_now();
                }
                SchedulerStatus::NewTask(task) => {
                    let mut scope = Scope::new(self.graph, task.vertex());
                    let mut callback = Callback::new(&self.scheduler, worker);
                    (task.update_fn())(&mut scope, &mut callback, &self.context);
                    drop(scope);
                    self.scheduler.completed_task(worker, &task);
                    executed += 1;
                }
            }
        }
        self.update_count.fetch_add(executed, Ordering::Relaxed);
        debug!(worker, executed, "worker exited");
    }

    /// Updates executed during the most recent [`AsyncEngine::start`].
    pub fn last_update_count(&self) -> u64 {
        self.update_count.load(Ordering::Relaxed)
    }

    /// Forces the run to wind down: workers exit as soon as they observe
    /// the aborted detector.
    pub fn abort(&self) {
        self.scheduler.abort();
    }

    /// Resets the scheduler so the engine can be reused for another run.
    pub fn restart(&self) {
        self.scheduler.restart();
    }
}
