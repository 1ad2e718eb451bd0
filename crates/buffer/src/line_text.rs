// Chunk: docs/chunks/line_store - Fixed-width line storage with significant length

//! Byte storage for a single line.
//!
//! A line holds `len` allocated columns of which the first `used` are
//! significant: `used` is the column of the last non-blank byte. Every byte
//! past `used` is a blank, so shrinking `used` never needs to clear anything
//! and a column past the end of the text reads as a blank.
//!
//! Columns are 1-based throughout; column `c` lives at byte `c - 1`.
//!
//! Growth goes through `try_reserve` so the owning primitive can report
//! allocation failure before it has changed anything.

use std::collections::TryReserveError;
use std::fmt;

/// The padding byte beyond a line's significant length.
pub const BLANK: u8 = b' ';

/// Returns the significant length of `bytes`: the position of the last
/// non-blank byte, or 0.
pub fn significant_len(bytes: &[u8]) -> usize {
    bytes.iter().rposition(|&b| b != BLANK).map_or(0, |i| i + 1)
}

/// The bytes of one line, padded with blanks past the significant length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineText {
    bytes: Vec<u8>,
    used: usize,
}

impl LineText {
    /// Creates an empty line with no storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a blank line with `len` columns allocated.
    pub fn with_len(len: usize) -> Result<Self, TryReserveError> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len)?;
        bytes.resize(len, BLANK);
        Ok(Self { bytes, used: 0 })
    }

    /// Creates a line holding `text`. Trailing blanks are kept as storage but
    /// are not significant.
    pub fn from_bytes(text: &[u8]) -> Result<Self, TryReserveError> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(text.len())?;
        bytes.extend_from_slice(text);
        Ok(Self {
            used: significant_len(&bytes),
            bytes,
        })
    }

    /// Returns the allocated length in columns.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the significant length.
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Returns the significant bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.used]
    }

    /// Returns the byte at column `col`, blank past the end.
    pub fn byte_at(&self, col: usize) -> u8 {
        debug_assert!(col >= 1, "columns are 1-based");
        self.bytes.get(col - 1).copied().unwrap_or(BLANK)
    }

    /// Returns the significant bytes from column `from` on.
    pub fn tail(&self, from: usize) -> &[u8] {
        let start = (from - 1).min(self.used);
        &self.bytes[start..self.used]
    }

    /// Returns the significant length the line would have if everything from
    /// column `col` on were dropped.
    pub fn used_before(&self, col: usize) -> usize {
        let upper = (col - 1).min(self.used);
        significant_len(&self.bytes[..upper])
    }

    /// Returns true if `used` matches the stored bytes.
    pub fn is_well_formed(&self) -> bool {
        self.used <= self.bytes.len() && significant_len(&self.bytes) == self.used
    }

    /// Returns the column of the first non-blank byte, if any.
    pub fn first_non_blank(&self) -> Option<usize> {
        self.as_bytes().iter().position(|&b| b != BLANK).map(|i| i + 1)
    }

    /// Appends the bytes of columns `[from, to)` to `out`, padding with
    /// blanks past the end of the line.
    pub fn copy_columns(
        &self,
        from: usize,
        to: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), TryReserveError> {
        if to <= from {
            return Ok(());
        }
        out.try_reserve(to - from)?;
        let stored_end = (to - 1).min(self.used);
        if from - 1 < stored_end {
            out.extend_from_slice(&self.bytes[from - 1..stored_end]);
        }
        let padding = (to - from) - stored_end.saturating_sub(from - 1);
        out.extend(std::iter::repeat(BLANK).take(padding));
        Ok(())
    }

    /// Resizes storage to exactly `len` columns, keeping the bytes of the
    /// first `min(len, old len)` columns.
    pub fn set_len(&mut self, len: usize) -> Result<(), TryReserveError> {
        if len > self.bytes.len() {
            self.bytes.try_reserve_exact(len - self.bytes.len())?;
            self.bytes.resize(len, BLANK);
        } else {
            self.bytes.truncate(len);
            self.bytes.shrink_to_fit();
            if self.used > len {
                self.used = significant_len(&self.bytes);
            }
        }
        Ok(())
    }

    /// Grows storage to at least `len` columns.
    pub fn ensure_len(&mut self, len: usize) -> Result<(), TryReserveError> {
        if len > self.bytes.len() {
            self.set_len(len)?;
        }
        Ok(())
    }

    /// Inserts `count` copies of `text` before column `col`, pushing the
    /// rest of the line right.
    ///
    /// Storage must already hold `max(used, col - 1) + width` columns.
    pub fn insert(&mut self, col: usize, text: &[u8], count: usize) {
        let at = col - 1;
        let width = text.len() * count;
        let end = self.used.max(at) + width;
        debug_assert!(end <= self.bytes.len(), "insert past allocated length");

        if at < self.used {
            self.bytes.copy_within(at..self.used, at + width);
        }
        self.fill(at, text, count);
        self.used = significant_len(&self.bytes[..end]);
    }

    /// Writes `count` copies of `text` starting at column `col`.
    ///
    /// Storage must already hold `col - 1 + width` columns.
    pub fn overwrite(&mut self, col: usize, text: &[u8], count: usize) {
        let at = col - 1;
        let end = at + text.len() * count;
        debug_assert!(end <= self.bytes.len(), "overwrite past allocated length");

        self.fill(at, text, count);
        let upper = self.used.max(end);
        self.used = significant_len(&self.bytes[..upper]);
    }

    /// Removes columns `[from, to)`, pulling the rest of the line left.
    pub fn remove(&mut self, from: usize, to: usize) {
        let start = from - 1;
        if start >= self.used || to <= from {
            return;
        }
        let stop = (to - 1).min(self.used);
        let removed = stop - start;
        self.bytes.copy_within(stop..self.used, start);
        let old_used = self.used;
        self.bytes[old_used - removed..old_used].fill(BLANK);
        self.used = significant_len(&self.bytes[..old_used - removed]);
    }

    /// Blanks everything from column `col` on.
    pub fn truncate_at(&mut self, col: usize) {
        let start = col - 1;
        if start >= self.used {
            return;
        }
        self.bytes[start..self.used].fill(BLANK);
        self.used = significant_len(&self.bytes[..start]);
    }

    fn fill(&mut self, at: usize, text: &[u8], count: usize) {
        let mut pos = at;
        for _ in 0..count {
            self.bytes[pos..pos + text.len()].copy_from_slice(text);
            pos += text.len();
        }
    }
}

impl fmt::Display for LineText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}
