//! Plain-text edge-list loading.
//!
//! Accepts lines of `source<sep>target[<sep>weight]` where the separator is
//! any mix of tabs, commas, and spaces. Lines starting with `#` or `%` are
//! comments. Vertex ids beyond the current count grow the graph implicitly.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use super::Graph;
use crate::error::{GraphError, Result};
use crate::types::VertexId;

/// How the loader treats a line whose source and target coincide.
///
/// Whether self-loops are data or garbage is an application decision; the
/// runtime itself never creates them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelfLoopPolicy {
    /// Drop the line and keep loading.
    Ignore,
    /// Fail the load with [`GraphError::InvalidArgument`].
    Reject,
}

/// Appends the edges listed in `path` to `graph` and finalizes it.
///
/// `make_edge` builds an edge payload from the line's weight column
/// (0.0 when absent). Returns the number of edges added.
///
/// # Errors
/// Surfaces unreadable files as [`GraphError::Io`] and malformed lines or
/// rejected self-loops as [`GraphError::InvalidArgument`].
pub fn load_edge_list<V, E, F>(
    path: impl AsRef<Path>,
    graph: &mut Graph<V, E>,
    policy: SelfLoopPolicy,
    make_edge: F,
) -> Result<usize>
where
    V: Default,
    F: Fn(f64) -> E,
{
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0usize;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
            continue;
        }
        let mut fields = line
            .split(|c: char| c == '\t' || c == ',' || c == ' ')
            .filter(|field| !field.is_empty());
        let source = parse_id(fields.next(), lineno, path)?;
        let target = parse_id(fields.next(), lineno, path)?;
        let weight = match fields.next() {
            Some(raw) => raw.parse::<f64>().map_err(|_| {
                GraphError::InvalidArgument(format!(
                    "{}: line {}: bad weight `{raw}`",
                    path.display(),
                    lineno + 1
                ))
            })?,
            None => 0.0,
        };

        let needed = source.max(target) as usize + 1;
        if needed > graph.num_vertices() {
            graph.resize(needed);
        }
        if source == target {
            match policy {
                SelfLoopPolicy::Ignore => {
                    debug!(line = lineno + 1, vertex = source, "ignoring self-loop");
                    continue;
                }
                SelfLoopPolicy::Reject => {
                    return Err(GraphError::InvalidArgument(format!(
                        "{}: line {}: self-loop on vertex {source}",
                        path.display(),
                        lineno + 1
                    )))
                }
            }
        }
        graph.add_edge(VertexId(source), VertexId(target), make_edge(weight));
        count += 1;
        if count % 1_000_000 == 0 {
            info!(count, "edges inserted");
        }
    }
    graph.finalize();
    info!(
        path = %path.display(),
        edges = count,
        vertices = graph.num_vertices(),
        "loaded edge list"
    );
    Ok(count)
}

fn parse_id(field: Option<&str>, lineno: usize, path: &Path) -> Result<u32> {
    let raw = field.ok_or_else(|| {
        GraphError::InvalidArgument(format!(
            "{}: line {}: expected `source target [weight]`",
            path.display(),
            lineno + 1
        ))
    })?;
    raw.parse::<u32>().map_err(|_| {
        GraphError::InvalidArgument(format!(
            "{}: line {}: bad vertex id `{raw}`",
            path.display(),
            lineno + 1
        ))
    })
}
