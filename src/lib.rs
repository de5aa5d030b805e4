//! Quiver is a vertex-centric graph-parallel computation runtime.
//!
//! User programs attach payloads to the vertices and edges of a directed
//! graph, then hand per-vertex update functions to an execution engine.
//! The engine schedules vertices through a dedup-aware FIFO scheduler and
//! runs them on a worker pool until the termination detector reports that
//! no work remains. Algorithms such as PageRank and connected components
//! are clients of this runtime (see `src/bin/`), not part of it.

#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod graph;
pub mod scheduler;
pub mod types;

pub use crate::engine::{
    AsyncEngine, Callback, EngineMode, EngineOptions, Scope, SyncEngine,
};
pub use crate::error::{GraphError, Result};
pub use crate::graph::{Graph, KwayPartitioner, PartitionStrategy, SelfLoopPolicy};
pub use crate::scheduler::{FifoScheduler, SchedulerStatus, Task, UpdateFn};
pub use crate::types::{Color, EdgeId, PartitionId, VertexId};
