//! Scheduled work items.

use std::fmt;

use crate::engine::{Callback, Scope};
use crate::types::VertexId;

/// Per-vertex update computation invoked by the engines.
///
/// The function receives the vertex's [`Scope`] (read/write access to the
/// vertex payload and its incident edge payloads), a [`Callback`] for
/// scheduling follow-up tasks, and the run's shared context.
pub type UpdateFn<V, E, C> = fn(&mut Scope<'_, V, E>, &mut Callback<'_, V, E, C>, &C);

/// A scheduled (vertex, update-function) pair awaiting execution.
pub struct Task<V, E, C> {
    vertex: VertexId,
    update: UpdateFn<V, E, C>,
}

impl<V, E, C> Task<V, E, C> {
    /// Binds `update` to `vertex`.
    pub fn new(vertex: VertexId, update: UpdateFn<V, E, C>) -> Self {
        Self { vertex, update }
    }

    /// The vertex this task runs on.
    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    /// The update function this task invokes.
    pub fn update_fn(&self) -> UpdateFn<V, E, C> {
        self.update
    }
}

impl<V, E, C> Clone for Task<V, E, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V, E, C> Copy for Task<V, E, C> {}

impl<V, E, C> fmt::Debug for Task<V, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("vertex", &self.vertex)
            .finish_non_exhaustive()
    }
}
