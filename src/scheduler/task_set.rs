//! Per-vertex pending-task bookkeeping.

use crate::types::VertexId;

/// Tracks which vertices currently have a pending task, along with the
/// priority each was accepted at, so the scheduler never enqueues the same
/// vertex twice.
pub(crate) struct VertexTaskSet {
    pending: Vec<Option<f64>>,
}

impl VertexTaskSet {
    pub(crate) fn new(num_vertices: usize) -> Self {
        Self {
            pending: vec![None; num_vertices],
        }
    }

    /// Registers a pending task for `vertex`. Returns false when one is
    /// already pending; the caller must then drop the task, not merge it.
    pub(crate) fn add(&mut self, vertex: VertexId, priority: f64) -> bool {
        let slot = &mut self.pending[vertex.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(priority);
        true
    }

    pub(crate) fn remove(&mut self, vertex: VertexId) {
        self.pending[vertex.index()] = None;
    }

    /// Priority the pending task for `vertex` was accepted at, if any.
    pub(crate) fn top_priority(&self, vertex: VertexId) -> Option<f64> {
        self.pending[vertex.index()]
    }
}
