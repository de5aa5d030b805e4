//! Outstanding-job counting for termination detection.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Counts jobs outstanding across all workers.
///
/// Every accepted task increments the counter and every completion
/// decrements it; the computation is globally done exactly when the count
/// reaches zero (or an abort was requested). Increments and decrements use
/// acquire-release ordering, so a worker that observes zero happens-after
/// every completion that produced it.
#[derive(Debug, Default)]
pub struct TaskCountTermination {
    outstanding: AtomicU64,
    aborted: AtomicBool,
}

impl TaskCountTermination {
    /// Creates a detector with no outstanding jobs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an accepted job.
    pub fn new_job(&self) {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
    }

    /// Records a finished job.
    ///
    /// # Panics
    /// Panics when completions outnumber accepted jobs.
    pub fn completed_job(&self) {
        let prev = self.outstanding.fetch_sub(1, Ordering::AcqRel);
        assert!(prev > 0, "completed_job without a matching new_job");
    }

    /// Records `n` finished jobs at once.
    ///
    /// # Panics
    /// Panics when completions outnumber accepted jobs.
    pub fn completed_jobs(&self, n: u64) {
        if n == 0 {
            return;
        }
        let prev = self.outstanding.fetch_sub(n, Ordering::AcqRel);
        assert!(prev >= n, "completed {n} jobs with only {prev} outstanding");
    }

    /// Whether the computation is done: no outstanding jobs, or aborted.
    pub fn finished(&self) -> bool {
        self.aborted.load(Ordering::Acquire) || self.outstanding.load(Ordering::Acquire) == 0
    }

    /// Forces [`TaskCountTermination::finished`] to report true.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }

    /// Whether an abort was requested.
    pub fn aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Resets counts and the abort flag so the detector can be reused.
    pub fn restart(&self) {
        self.outstanding.store(0, Ordering::Release);
        self.aborted.store(false, Ordering::Release);
    }
}
