use std::io;
use thiserror::Error;

/// Convenient alias for fallible operations across the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Recoverable errors surfaced by the graph store and its collaborators.
///
/// API-contract violations (out-of-range ids, shrinking resize, duplicate
/// finalized edges) are not represented here; they panic with a diagnostic
/// message because they indicate a caller bug, not a runtime condition.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An archive or edge-list file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// An archive failed its checksum or decoded to an impossible structure.
    #[error("corruption detected: {0}")]
    Corruption(String),
    /// Caller-supplied input was malformed (bad edge-list line, rejected
    /// self-loop, truncated payload).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The graph contains a cycle, so no complete topological order exists.
    #[error("graph contains a cycle; topological order is incomplete")]
    CycleDetected,
}
