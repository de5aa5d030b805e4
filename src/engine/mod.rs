//! Execution engines driving update functions over scheduled vertices.
//!
//! Two engines share the same scheduler, scope, and callback primitives:
//! [`SyncEngine`] sweeps one global update function over every vertex with
//! a barrier between sweeps, and [`AsyncEngine`] runs a worker pool that
//! continuously pulls individual vertex tasks until the termination
//! detector reports completion. The mode is chosen once at construction
//! through [`EngineOptions`]; nothing inspects engine types at runtime.

mod asynchronous;
mod callback;
mod scope;
mod synchronous;

pub use asynchronous::AsyncEngine;
pub use callback::Callback;
pub use scope::Scope;
pub use synchronous::SyncEngine;

/// Default sweep cap for the synchronous engine.
pub const DEFAULT_ITERATION_LIMIT: usize = 100;

/// How an engine executes scheduled work.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EngineMode {
    /// Barrier-separated sweeps over every vertex.
    Synchronous,
    /// Continuous pull by a fixed worker pool, no barriers.
    Asynchronous,
}

/// Engine construction options.
#[derive(Clone, Debug)]
pub struct EngineOptions {
    /// Number of worker threads.
    pub workers: usize,
    /// Execution mode, chosen once per engine.
    pub mode: EngineMode,
    /// Sweep cap applied by the synchronous engine's `start`.
    pub iteration_limit: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(4),
            mode: EngineMode::Asynchronous,
            iteration_limit: DEFAULT_ITERATION_LIMIT,
        }
    }
}

impl EngineOptions {
    /// Overrides the worker count.
    ///
    /// # Panics
    /// Panics when `workers` is zero.
    pub fn workers(mut self, workers: usize) -> Self {
        assert!(workers >= 1, "engine needs at least one worker");
        self.workers = workers;
        self
    }

    /// Selects the execution mode.
    pub fn mode(mut self, mode: EngineMode) -> Self {
        self.mode = mode;
        self
    }

    /// Overrides the synchronous sweep cap.
    pub fn iteration_limit(mut self, iteration_limit: usize) -> Self {
        self.iteration_limit = iteration_limit;
        self
    }
}
