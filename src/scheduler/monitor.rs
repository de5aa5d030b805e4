//! Scheduler observability hooks.

use tracing::trace;

use crate::types::VertexId;

/// Observer injected into a scheduler at construction.
///
/// The scheduler reports task lifecycle events here, including the priority
/// each task carried; this is the only place priorities surface under the
/// FIFO strategy.
pub trait SchedulerMonitor: Send + Sync {
    /// A task was accepted for `vertex` at `priority`.
    fn task_added(&self, vertex: VertexId, priority: f64) {
        let _ = (vertex, priority);
    }

    /// A task for `vertex` was dropped because one was already pending.
    fn task_pruned(&self, vertex: VertexId) {
        let _ = vertex;
    }

    /// A task for `vertex` was handed to a worker.
    fn task_started(&self, vertex: VertexId, priority: f64) {
        let _ = (vertex, priority);
    }
}

/// Monitor that emits `tracing` events for every hook.
#[derive(Debug, Default)]
pub struct TracingMonitor;

impl SchedulerMonitor for TracingMonitor {
    fn task_added(&self, vertex: VertexId, priority: f64) {
        trace!(%vertex, priority, "task added");
    }

    fn task_pruned(&self, vertex: VertexId) {
        trace!(%vertex, "task pruned");
    }

    fn task_started(&self, vertex: VertexId, priority: f64) {
        trace!(%vertex, priority, "task started");
    }
}
