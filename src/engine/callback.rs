//! Per-worker scheduling handle.

use crate::scheduler::{FifoScheduler, Task, UpdateFn};
use crate::types::VertexId;

/// Handle bound to one scheduler, handed to update functions so they can
/// enqueue follow-up work for other vertices.
pub struct Callback<'s, V, E, C> {
    scheduler: &'s FifoScheduler<V, E, C>,
    worker: usize,
}

impl<'s, V, E, C> Callback<'s, V, E, C> {
    pub(crate) fn new(scheduler: &'s FifoScheduler<V, E, C>, worker: usize) -> Self {
        Self { scheduler, worker }
    }

    /// Schedules `update` on `vertex` at `priority`. Dropped silently when
    /// the vertex already has a pending task.
    pub fn add_task(&mut self, vertex: VertexId, update: UpdateFn<V, E, C>, priority: f64) {
        self.scheduler.add_task(Task::new(vertex, update), priority);
    }

    /// Id of the worker this callback belongs to.
    pub fn worker(&self) -> usize {
        self.worker
    }
}
