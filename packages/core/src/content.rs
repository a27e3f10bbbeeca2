//! Byte storage behind a file entry.

use crate::error::{FsError, Result};

/// Payload of a file entry: one owned byte buffer.
///
/// The buffer length is the file size. Writes past the end grow the buffer
/// by exactly the missing amount; any gap between the old end and the write
/// offset reads back as zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    data: Vec<u8>,
}

/// Borrowed view of a file's contents, valid until the next write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contents<'a> {
    pub data: &'a [u8],
    pub size: usize,
}

impl Contents<'_> {
    /// Contents as text, replacing invalid UTF-8.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.data).into_owned()
    }
}

impl File {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write `buf` at `offset` and return the number of bytes written.
    ///
    /// Offset 0 replaces the whole buffer, so the file ends up exactly
    /// `buf.len()` bytes long even if it was longer before. Any other offset
    /// overwrites in place, extending the file when `offset + buf.len()`
    /// passes the current end.
    pub fn write(&mut self, buf: &[u8], offset: usize) -> Result<usize> {
        if offset == 0 {
            self.data = buf.to_vec();
            return Ok(buf.len());
        }

        let end = offset
            .checked_add(buf.len())
            .ok_or_else(|| FsError::invalid(format!("write past addressable range at {}", offset)))?;

        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(buf);

        Ok(buf.len())
    }

    /// The whole buffer and its size.
    pub fn read(&self) -> Contents<'_> {
        Contents {
            data: &self.data,
            size: self.data.len(),
        }
    }

    /// Up to `len` bytes starting at `offset`; empty when `offset` is at or
    /// past the end.
    pub fn read_at(&self, offset: usize, len: usize) -> &[u8] {
        if offset >= self.data.len() {
            return &[];
        }
        let end = offset.saturating_add(len).min(self.data.len());
        &self.data[offset..end]
    }

    /// Resize to `size` bytes, zero-filling when growing.
    pub fn truncate(&mut self, size: usize) {
        self.data.resize(size, 0);
    }
}
