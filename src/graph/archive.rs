//! Binary graph archives and the adjacency text dump.
//!
//! Archives store, in one fixed order: vertex payloads, edge records
//! (source, target, payload), the in-adjacency index, the out-adjacency
//! index, vertex colors, and the finalized flag, framed by a magic header
//! and a crc32 trailer. Load consumes the identical order and refuses
//! archives whose checksum or structure does not hold up.

use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crc32fast::Hasher;
use parking_lot::RwLock;
use tracing::info;

use super::{AdjacencyList, EdgeRecord, Graph};
use crate::error::{GraphError, Result};
use crate::types::{EdgeId, VertexId};

const ARCHIVE_MAGIC: &[u8; 4] = b"QVR1";

/// Byte encoding for vertex and edge payloads stored in archives.
///
/// Implementations must read back exactly the bytes they wrote; the archive
/// framing supplies no per-payload length.
pub trait Codec: Sized {
    /// Appends this value's encoding to `out`.
    fn encode(&self, out: &mut Vec<u8>);
    /// Decodes one value from the front of `src`, advancing it.
    ///
    /// # Errors
    /// Returns [`GraphError::Corruption`] when `src` is too short or holds
    /// an impossible encoding.
    fn decode(src: &mut &[u8]) -> Result<Self>;
}

fn take<'a>(src: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if src.len() < n {
        return Err(GraphError::Corruption(format!(
            "archive truncated: needed {n} bytes, {} left",
            src.len()
        )));
    }
    let (head, tail) = src.split_at(n);
    *src = tail;
    Ok(head)
}

macro_rules! scalar_codec {
    ($($ty:ty),+) => {
        $(
            impl Codec for $ty {
                fn encode(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn decode(src: &mut &[u8]) -> Result<Self> {
                    let bytes = take(src, std::mem::size_of::<$ty>())?;
                    Ok(<$ty>::from_le_bytes(
                        bytes.try_into().expect("length checked by take"),
                    ))
                }
            }
        )+
    };
}

scalar_codec!(u8, u16, u32, u64, i32, i64, f32, f64);

impl Codec for () {
    fn encode(&self, _out: &mut Vec<u8>) {}

    fn decode(_src: &mut &[u8]) -> Result<Self> {
        Ok(())
    }
}

fn encode_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn decode_u32(src: &mut &[u8]) -> Result<u32> {
    u32::decode(src)
}

fn encode_adjacency(out: &mut Vec<u8>, lists: &[AdjacencyList]) {
    for list in lists {
        encode_u32(out, list.len() as u32);
        for eid in list {
            encode_u32(out, eid.0);
        }
    }
}

fn decode_adjacency(
    src: &mut &[u8],
    num_vertices: usize,
    num_edges: usize,
) -> Result<Vec<AdjacencyList>> {
    let mut lists = Vec::with_capacity(num_vertices);
    for _ in 0..num_vertices {
        let len = decode_u32(src)? as usize;
        let mut list = AdjacencyList::with_capacity(len);
        for _ in 0..len {
            let eid = decode_u32(src)?;
            if eid as usize >= num_edges {
                return Err(GraphError::Corruption(format!(
                    "adjacency entry references edge {eid} of {num_edges}"
                )));
            }
            list.push(EdgeId(eid));
        }
        lists.push(list);
    }
    Ok(lists)
}

impl<V: Codec, E: Codec> Graph<V, E> {
    /// Serializes the whole graph into an archive byte buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(ARCHIVE_MAGIC);
        encode_u32(&mut out, self.vertices.len() as u32);
        for cell in &self.vertices {
            cell.read().encode(&mut out);
        }
        encode_u32(&mut out, self.edges.len() as u32);
        for record in &self.edges {
            encode_u32(&mut out, record.source.0);
            encode_u32(&mut out, record.target.0);
            record.data.read().encode(&mut out);
        }
        encode_adjacency(&mut out, &self.in_edges);
        encode_adjacency(&mut out, &self.out_edges);
        out.extend_from_slice(&self.colors);
        out.push(u8::from(self.finalized));

        let mut hasher = Hasher::new();
        hasher.update(&out);
        out.extend_from_slice(&hasher.finalize().to_le_bytes());
        out
    }

    /// Deserializes a graph from an archive byte buffer.
    ///
    /// # Errors
    /// Returns [`GraphError::Corruption`] on checksum mismatch, truncation,
    /// out-of-range ids, or trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < ARCHIVE_MAGIC.len() + 4 {
            return Err(GraphError::Corruption("archive too short".into()));
        }
        let (body, trailer) = bytes.split_at(bytes.len() - 4);
        let expected = u32::from_le_bytes(trailer.try_into().expect("trailer is four bytes"));
        let mut hasher = Hasher::new();
        hasher.update(body);
        if hasher.finalize() != expected {
            return Err(GraphError::Corruption("archive checksum mismatch".into()));
        }

        let mut src = body;
        if take(&mut src, ARCHIVE_MAGIC.len())? != ARCHIVE_MAGIC {
            return Err(GraphError::Corruption("unrecognized archive header".into()));
        }

        let num_vertices = decode_u32(&mut src)? as usize;
        let mut vertices = Vec::with_capacity(num_vertices);
        for _ in 0..num_vertices {
            vertices.push(RwLock::new(V::decode(&mut src)?));
        }

        let num_edges = decode_u32(&mut src)? as usize;
        let mut edges = Vec::with_capacity(num_edges);
        for _ in 0..num_edges {
            let source = decode_u32(&mut src)?;
            let target = decode_u32(&mut src)?;
            if source as usize >= num_vertices || target as usize >= num_vertices {
                return Err(GraphError::Corruption(format!(
                    "edge {source} -> {target} references a vertex beyond {num_vertices}"
                )));
            }
            edges.push(EdgeRecord {
                source: VertexId(source),
                target: VertexId(target),
                data: RwLock::new(E::decode(&mut src)?),
            });
        }

        let in_edges = decode_adjacency(&mut src, num_vertices, num_edges)?;
        let out_edges = decode_adjacency(&mut src, num_vertices, num_edges)?;
        let colors = take(&mut src, num_vertices)?.to_vec();
        let finalized = match take(&mut src, 1)?[0] {
            0 => false,
            1 => true,
            other => {
                return Err(GraphError::Corruption(format!(
                    "finalized flag holds {other}"
                )))
            }
        };
        if !src.is_empty() {
            return Err(GraphError::Corruption(format!(
                "{} trailing bytes after archive body",
                src.len()
            )));
        }

        Ok(Self {
            vertices,
            edges,
            in_edges,
            out_edges,
            colors,
            finalized,
        })
    }

    /// Writes the archive to a file.
    ///
    /// # Errors
    /// Surfaces file-system failures as [`GraphError::Io`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes())?;
        info!(
            path = %path.display(),
            vertices = self.vertices.len(),
            edges = self.edges.len(),
            "saved graph archive"
        );
        Ok(())
    }

    /// Reads an archive from a file.
    ///
    /// # Errors
    /// Surfaces file-system failures as [`GraphError::Io`] and malformed
    /// content as [`GraphError::Corruption`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

impl<V, E> Graph<V, E> {
    /// Writes the adjacency structure as text, one `"<source>, <target>"`
    /// line per edge, for external tooling.
    ///
    /// # Errors
    /// Surfaces file-system failures as [`GraphError::Io`].
    pub fn save_adjacency(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        for record in &self.edges {
            writeln!(writer, "{}, {}", record.source, record.target)?;
        }
        writer.flush()?;
        Ok(())
    }
}
