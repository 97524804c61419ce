//! Reassembly of complete lines from arbitrarily split response chunks.
//!
//! A response is only ever cut immediately before a `#datatype` annotation row.
//! Everything before the last such row in the buffered bytes is complete: no
//! line in it can still be growing, and no annotation group in it can be
//! missing its column-name row. The tail starting at that row is carried into
//! the next call.

use log::trace;

use crate::error::{Error, Result};

/// Row that opens every annotation group.
pub(crate) const GROUP_MARKER: &[u8] = b"#datatype";

/// Accumulates chunks and releases complete, trimmed, non-empty lines.
#[derive(Debug, Default)]
pub struct StreamBuffer {
    pending: Vec<u8>,
    /// Bytes of `pending` already searched for a marker.
    scanned: usize,
}

impl StreamBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk and return the lines it completed.
    ///
    /// Returns an empty list while no group boundary has been seen yet.
    pub fn append(&mut self, chunk: &[u8]) -> Result<Vec<String>> {
        self.pending.extend_from_slice(chunk);

        let Some(cut) = self.last_group_start() else {
            // Leave room for a marker straddling this chunk and the next.
            self.scanned = self.pending.len().saturating_sub(GROUP_MARKER.len());
            return Ok(Vec::new());
        };

        let tail = self.pending.split_off(cut);
        let region = std::mem::replace(&mut self.pending, tail);
        self.scanned = 0;
        trace!(
            "released {} bytes, {} bytes pending",
            region.len(),
            self.pending.len()
        );
        split_lines(&region)
    }

    /// Release everything still buffered. Call once the response has ended.
    pub fn finish(&mut self) -> Result<Vec<String>> {
        let region = std::mem::take(&mut self.pending);
        self.scanned = 0;
        split_lines(&region)
    }

    /// Bytes held back waiting for more input.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Offset of the last marker that starts a line, other than at offset 0.
    fn last_group_start(&self) -> Option<usize> {
        let from = self.scanned.saturating_sub(1);
        let haystack = &self.pending[from..];
        (1..haystack.len())
            .rev()
            .find(|&i| haystack[i - 1] == b'\n' && haystack[i..].starts_with(GROUP_MARKER))
            .map(|i| from + i)
    }
}

fn split_lines(region: &[u8]) -> Result<Vec<String>> {
    let text = std::str::from_utf8(region).map_err(|e| Error::Parse {
        message: format!("Response is not valid UTF-8: {}", e),
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
