//! Splitting row sequences into batch-sized chunks.
//!
//! A chunk closes when it hits the row-count bound or when adding the next
//! row would cross the byte bound, whichever comes first. Sizes are
//! estimated per row from cell lengths plus a per-format overhead: CSV
//! rows carry only separators, while JSON and XML repeat every column
//! name in every row.

use crate::error::{Error, ErrorKind, Result};
use crate::types::ContentType;

/// Default row-count bound per batch.
pub const DEFAULT_MAX_ROWS: usize = 10_000;

/// Default payload-size bound per batch, in bytes.
pub const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Bounds applied when splitting input into batches.
#[derive(Debug, Clone)]
pub struct ChunkPolicy {
    /// Maximum rows per chunk. Must be greater than zero.
    pub max_rows: usize,
    /// Maximum estimated payload bytes per chunk.
    pub max_bytes: usize,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl ChunkPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// Estimated serialized size of one row: cell bytes plus a separator per
/// cell and a line ending.
pub(crate) fn row_size(row: &[String]) -> usize {
    row.iter().map(|cell| cell.len() + 1).sum::<usize>() + 1
}

/// Extra bytes one row costs in the given format beyond [`row_size`].
///
/// CSV writes column names once per payload, so rows carry none. A JSON
/// row repeats every column name with its quotes and punctuation inside
/// a braced object; an XML row repeats every name as an indented tag
/// pair inside an sObject element.
pub(crate) fn row_overhead(columns: &[String], content_type: ContentType) -> usize {
    match content_type {
        ContentType::Csv => 0,
        ContentType::Json => columns.iter().map(|name| name.len() + 5).sum::<usize>() + 2,
        ContentType::Xml => columns.iter().map(|name| 2 * name.len() + 8).sum::<usize>() + 23,
    }
}

/// Split rows into contiguous chunks honoring the policy's bounds.
///
/// Every row is charged the same `overhead` on top of its [`row_size`].
/// Chunks concatenate back to the input in order. A single row larger than
/// the byte bound cannot be split and is rejected.
pub(crate) fn split_rows<'a>(
    rows: &'a [Vec<String>],
    policy: &ChunkPolicy,
    overhead: usize,
) -> Result<Vec<&'a [Vec<String>]>> {
    if policy.max_rows == 0 {
        return Err(Error::new(ErrorKind::InvalidOperation(
            "Chunk row bound must be greater than zero".to_string(),
        )));
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chunk_rows = 0;
    let mut chunk_bytes = 0;

    for (index, row) in rows.iter().enumerate() {
        let size = row_size(row) + overhead;
        if size > policy.max_bytes {
            return Err(Error::new(ErrorKind::ChunkTooLarge {
                bytes: size,
                limit: policy.max_bytes,
            }));
        }
        if chunk_rows == policy.max_rows || (chunk_rows > 0 && chunk_bytes + size > policy.max_bytes)
        {
            chunks.push(&rows[start..index]);
            start = index;
            chunk_rows = 0;
            chunk_bytes = 0;
        }
        chunk_rows += 1;
        chunk_bytes += size;
    }
    if chunk_rows > 0 {
        chunks.push(&rows[start..]);
    }
    Ok(chunks)
}
