// Chunk: docs/chunks/mark_registry - Per-line mark lists without heap allocation

//! The mark registry.
//!
//! A mark is a (line, column) position that keeps addressing the same logical
//! place while text around it changes. Each line lists the marks positioned
//! on it; a mark records its line. Both sides are kept in step by every
//! operation here.
//!
//! Mark slots come from a pool that is topped up `mark_pool_batch` slots at a
//! time. Mutation primitives reserve the marks they may need before touching
//! the document so that placing them afterwards cannot fail.
//!
//! The two bulk relocations, [`TextBuffer::marks_squeeze`] and
//! [`TextBuffer::marks_shift`], only visit marks on the lines involved.

use std::cmp::Ordering;

use crate::error::{BufferError, Result};
use crate::text_buffer::TextBuffer;
use crate::types::{LineId, MarkId, Position};

/// A position that follows the text it points at through every edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub(crate) line: LineId,
    pub(crate) col: usize,
}

impl TextBuffer {
    // ==================== Pool ====================

    /// Makes sure `n` marks can be allocated without touching the allocator.
    pub(crate) fn reserve_marks(&mut self, n: usize) -> Result<()> {
        let batch = self.config.mark_pool_batch;
        while self.marks.free_slots() < n {
            self.marks
                .refill(batch)
                .map_err(BufferError::out_of_memory("marks"))?;
        }
        Ok(())
    }

    /// Links a new mark from the pool. The pool must hold a free slot.
    fn mark_link_new(&mut self, line: LineId, col: usize) -> MarkId {
        debug_assert!(self.marks.free_slots() > 0, "mark pool not reserved");
        let mark = self.marks.insert(Mark { line, col });
        self.lines[line].marks.push(mark);
        mark
    }

    fn unlink_mark(&mut self, mark: MarkId) {
        let line = self.marks[mark].line;
        let list = &mut self.lines[line].marks;
        match list.iter().position(|&m| m == mark) {
            Some(index) => {
                list.swap_remove(index);
            }
            None => debug_assert!(false, "mark {mark:?} missing from its line's list"),
        }
    }

    /// Repositions an existing mark.
    pub(crate) fn mark_relink(&mut self, mark: MarkId, line: LineId, col: usize) {
        if self.marks[mark].line != line {
            self.unlink_mark(mark);
            self.lines[line].marks.push(mark);
            self.marks[mark].line = line;
        }
        self.marks[mark].col = col;
    }

    /// Places `slot` at (line, col), allocating from a pool that has already
    /// been reserved when `slot` is unset.
    pub(crate) fn mark_place(&mut self, slot: &mut Option<MarkId>, line: LineId, col: usize) {
        match *slot {
            Some(mark) => self.mark_relink(mark, line, col),
            None => *slot = Some(self.mark_link_new(line, col)),
        }
    }

    // ==================== Create / destroy ====================

    /// Positions `mark` at (line, col).
    ///
    /// An unset handle gets a fresh mark from the pool; a set one is moved.
    /// No other mark is touched.
    pub fn mark_create(&mut self, line: LineId, col: usize, mark: &mut Option<MarkId>) -> Result<()> {
        debug_assert!(
            (1..=self.max_col()).contains(&col),
            "mark column {col} out of range"
        );
        if mark.is_none() {
            self.reserve_marks(1)?;
        }
        self.mark_place(mark, line, col);
        Ok(())
    }

    /// Unlinks `mark`, returns its slot to the pool and clears the handle.
    pub fn mark_destroy(&mut self, mark: &mut Option<MarkId>) {
        if let Some(handle) = mark.take() {
            self.unlink_mark(handle);
            self.marks.remove(handle);
        }
    }

    // ==================== Queries ====================

    pub fn mark_position(&self, mark: MarkId) -> Position {
        let m = &self.marks[mark];
        Position::new(m.line, m.col)
    }

    /// Returns the line `mark` sits on.
    pub fn mark_line(&self, mark: MarkId) -> LineId {
        self.marks[mark].line
    }

    /// Returns the 1-based column of `mark`.
    pub fn mark_col(&self, mark: MarkId) -> usize {
        self.marks[mark].col
    }

    /// Returns the marks currently positioned on `line`, in no particular order.
    pub fn marks_on_line(&self, line: LineId) -> &[MarkId] {
        &self.lines[line].marks
    }

    /// Orders two positions of the same document.
    pub fn compare_positions(&self, a: Position, b: Position) -> Ordering {
        if a.line == b.line {
            return a.col.cmp(&b.col);
        }
        debug_assert_eq!(
            self.line_frame(a.line),
            self.line_frame(b.line),
            "comparing positions of different documents"
        );
        self.line_to_number(a.line)
            .cmp(&self.line_to_number(b.line))
            .then(a.col.cmp(&b.col))
    }

    // ==================== Bulk relocation ====================

    /// Collapses every mark inside `[first_line:first_col, last_line:last_col)`
    /// onto the end of the range.
    ///
    /// Used right before that range disappears. A mark exactly at the end is
    /// already there; marks before `first_col` on `first_line` stay put.
    pub fn marks_squeeze(
        &mut self,
        first_line: LineId,
        first_col: usize,
        last_line: LineId,
        last_col: usize,
    ) {
        if first_line == last_line {
            for i in 0..self.lines[first_line].marks.len() {
                let mark = self.lines[first_line].marks[i];
                let m = &mut self.marks[mark];
                if m.col >= first_col && m.col < last_col {
                    m.col = last_col;
                }
            }
            return;
        }

        for i in 0..self.lines[last_line].marks.len() {
            let mark = self.lines[last_line].marks[i];
            let m = &mut self.marks[mark];
            if m.col < last_col {
                m.col = last_col;
            }
        }

        // Tail of the first line.
        let mut i = 0;
        while i < self.lines[first_line].marks.len() {
            let mark = self.lines[first_line].marks[i];
            if self.marks[mark].col >= first_col {
                self.lines[first_line].marks.swap_remove(i);
                self.adopt_mark(mark, last_line, last_col);
            } else {
                i += 1;
            }
        }

        // Everything on the lines in between.
        let mut cursor = self.next_linked(first_line);
        while cursor != last_line {
            let moved = std::mem::take(&mut self.lines[cursor].marks);
            for mark in moved {
                self.adopt_mark(mark, last_line, last_col);
            }
            cursor = self.next_linked(cursor);
        }
    }

    /// Relocates the marks of a moved column window.
    ///
    /// Every mark on `source_line` with a column in
    /// `[source_col, source_col + width - 1]` goes to `dest_line` at
    /// `col - source_col + dest_col`, clamped to the last valid column.
    pub fn marks_shift(
        &mut self,
        source_line: LineId,
        source_col: usize,
        width: usize,
        dest_line: LineId,
        dest_col: usize,
    ) {
        if width == 0 {
            return;
        }
        let max_col = self.max_col();
        let end = source_col + width;
        let target = |col: usize| (col - source_col + dest_col).min(max_col);

        if source_line == dest_line {
            for i in 0..self.lines[source_line].marks.len() {
                let mark = self.lines[source_line].marks[i];
                let m = &mut self.marks[mark];
                if m.col >= source_col && m.col < end {
                    m.col = target(m.col);
                }
            }
            return;
        }

        let mut i = 0;
        while i < self.lines[source_line].marks.len() {
            let mark = self.lines[source_line].marks[i];
            let col = self.marks[mark].col;
            if col >= source_col && col < end {
                self.lines[source_line].marks.swap_remove(i);
                self.adopt_mark(mark, dest_line, target(col));
            } else {
                i += 1;
            }
        }
    }

    /// Attaches a mark that has already been taken off its old line's list.
    fn adopt_mark(&mut self, mark: MarkId, line: LineId, col: usize) {
        self.marks[mark] = Mark { line, col };
        self.lines[line].marks.push(mark);
    }

    /// Returns the largest valid mark column.
    pub(crate) fn max_col(&self) -> usize {
        self.config.max_line_len + 1
    }
}
