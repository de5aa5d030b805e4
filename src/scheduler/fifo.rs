//! First-in-first-out task scheduling.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use super::monitor::SchedulerMonitor;
use super::task::{Task, UpdateFn};
use super::task_set::VertexTaskSet;
use super::termination::TaskCountTermination;
use crate::types::VertexId;

/// Outcome of a worker's pull from the scheduler.
pub enum SchedulerStatus<V, E, C> {
    /// A task to execute.
    NewTask(Task<V, E, C>),
    /// The queue is empty but jobs are outstanding elsewhere; retry.
    Waiting,
    /// No outstanding work remains anywhere; the worker may exit.
    Complete,
}

struct SchedState<V, E, C> {
    queue: VecDeque<Task<V, E, C>>,
    pending: VertexTaskSet,
}

/// FIFO scheduler: tasks are served in arrival order across all producers.
///
/// The queue and the per-vertex pending set mutate under a single mutex, so
/// a pull can never observe a task the dedup set does not know about. The
/// termination detector is updated while that lock is held on acceptance,
/// which keeps the outstanding count and the queue consistent.
pub struct FifoScheduler<V, E, C> {
    num_vertices: usize,
    state: Mutex<SchedState<V, E, C>>,
    terminator: TaskCountTermination,
    monitor: Option<Arc<dyn SchedulerMonitor>>,
}

impl<V, E, C> FifoScheduler<V, E, C> {
    /// Creates a scheduler for a graph of `num_vertices` vertices.
    pub fn new(num_vertices: usize) -> Self {
        Self {
            num_vertices,
            state: Mutex::new(SchedState {
                queue: VecDeque::new(),
                pending: VertexTaskSet::new(num_vertices),
            }),
            terminator: TaskCountTermination::new(),
            monitor: None,
        }
    }

    /// Attaches an observability monitor.
    pub fn with_monitor(mut self, monitor: Arc<dyn SchedulerMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Enqueues `task` unless its vertex already has a pending task, in
    /// which case the new task is silently dropped (no merge, no priority
    /// escalation).
    ///
    /// # Panics
    /// Panics when the task's vertex is outside the known vertex count.
    pub fn add_task(&self, task: Task<V, E, C>, priority: f64) {
        assert!(
            task.vertex().index() < self.num_vertices,
            "add_task({}) with only {} vertices",
            task.vertex(),
            self.num_vertices
        );
        let mut state = self.state.lock();
        if state.pending.add(task.vertex(), priority) {
            self.terminator.new_job();
            state.queue.push_back(task);
            drop(state);
            if let Some(monitor) = &self.monitor {
                monitor.task_added(task.vertex(), priority);
            }
        } else {
            drop(state);
            if let Some(monitor) = &self.monitor {
                monitor.task_pruned(task.vertex());
            }
        }
    }

    /// Enqueues `update` on each listed vertex, each deduplicated
    /// independently.
    pub fn add_tasks(&self, vertices: &[VertexId], update: UpdateFn<V, E, C>, priority: f64) {
        for &vertex in vertices {
            self.add_task(Task::new(vertex, update), priority);
        }
    }

    /// Enqueues `update` on every vertex of the graph.
    pub fn add_task_to_all(&self, update: UpdateFn<V, E, C>, priority: f64) {
        for vertex in 0..self.num_vertices {
            self.add_task(Task::new(VertexId(vertex as u32), update), priority);
        }
    }

    /// Pulls the next task for `worker`.
    ///
    /// Returns [`SchedulerStatus::Complete`] once the termination detector
    /// reports no outstanding jobs, [`SchedulerStatus::Waiting`] when the
    /// queue is empty but jobs are still running elsewhere, and a task
    /// otherwise.
    pub fn get_next_task(&self, worker: usize) -> SchedulerStatus<V, E, C> {
        if self.terminator.finished() {
            return SchedulerStatus::Complete;
        }
        let mut state = self.state.lock();
        let Some(task) = state.queue.pop_front() else {
            return SchedulerStatus::Waiting;
        };
        let priority = state.pending.top_priority(task.vertex()).unwrap_or_default();
        state.pending.remove(task.vertex());
        drop(state);
        trace!(worker, vertex = %task.vertex(), "task dequeued");
        if let Some(monitor) = &self.monitor {
            monitor.task_started(task.vertex(), priority);
        }
        SchedulerStatus::NewTask(task)
    }

    /// Reports that `worker` finished executing `task`.
    pub fn completed_task(&self, worker: usize, task: &Task<V, E, C>) {
        trace!(worker, vertex = %task.vertex(), "task completed");
        self.terminator.completed_job();
    }

    /// Number of tasks currently queued.
    pub fn num_pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Drops every queued task along with its job accounting and returns
    /// how many were dropped. The synchronous engine calls this at each
    /// sweep barrier: queued follow-ups only signal that another sweep is
    /// needed.
    pub fn drain_pending(&self) -> usize {
        let mut state = self.state.lock();
        let state = &mut *state;
        let drained = state.queue.len();
        for task in state.queue.drain(..) {
            state.pending.remove(task.vertex());
        }
        self.terminator.completed_jobs(drained as u64);
        drained
    }

    /// Forces the termination detector to report completion.
    pub fn abort(&self) {
        self.terminator.abort();
    }

    /// Whether an abort was requested.
    pub fn aborted(&self) -> bool {
        self.terminator.aborted()
    }

    /// Resets termination state so the scheduler can be reused for another
    /// run.
    pub fn restart(&self) {
        self.terminator.restart();
    }
}
