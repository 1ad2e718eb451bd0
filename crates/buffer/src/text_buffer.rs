// Chunk: docs/chunks/text_buffer - Engine state and the in-line mutation primitives

//! TextBuffer is the main public API of the engine.
//!
//! It owns every line, group, mark and frame, plus the optional display
//! surface. The line/group store, the mark registry, frames, splitting and
//! moving are implemented as further `impl TextBuffer` blocks in their own
//! modules; this module holds the state itself, the consistency checker and
//! the three primitives that work on marks directly: insert, overtype and
//! remove.
//!
//! Every primitive checks lengths and reserves storage before its first
//! structural change, so a failed call leaves the document untouched.

use std::cmp::Ordering;
use std::fmt;

use tracing::{trace, warn};

use crate::arena::Arena;
use crate::config::BufferConfig;
use crate::display::DisplaySurface;
use crate::error::{BufferError, ConfigError, Result};
use crate::frame::Frame;
use crate::line_store::{Group, Line};
use crate::marks::Mark;
use crate::types::{FrameId, LineId, MarkId, Position};

/// The buffer engine: every document and the marks into them.
pub struct TextBuffer {
    pub(crate) config: BufferConfig,
    pub(crate) lines: Arena<Line>,
    pub(crate) groups: Arena<Group>,
    pub(crate) marks: Arena<Mark>,
    pub(crate) frames: Arena<Frame>,
    pub(crate) display: Option<Box<dyn DisplaySurface>>,
    /// Number of lines currently assigned a screen row.
    pub(crate) mapped_lines: usize,
    /// Mutation counter for sampling debug assertions (debug builds only).
    #[cfg(debug_assertions)]
    debug_mutation_count: u64,
}

impl TextBuffer {
    /// Creates an engine with the default limits.
    pub fn new() -> Self {
        Self::build(BufferConfig::default())
    }

    /// Creates an engine with custom limits.
    pub fn with_config(config: BufferConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: BufferConfig) -> Self {
        Self {
            config,
            lines: Arena::new(),
            groups: Arena::new(),
            marks: Arena::new(),
            frames: Arena::new(),
            display: None,
            mapped_lines: 0,
            #[cfg(debug_assertions)]
            debug_mutation_count: 0,
        }
    }

    // ==================== Accessors ====================

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Returns the number of live documents.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Returns the number of live marks across all documents.
    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }

    // ==================== Validation ====================

    /// Checks every structural invariant of `frame`, panicking on the first
    /// violation.
    ///
    /// Walks the whole document; meant for tests and debug builds.
    pub fn assert_consistent(&self, frame: FrameId) {
        let f = &self.frames[frame];
        let max = self.config.max_line_len;
        let cap = self.config.group_capacity;

        let mut expected_nr = 1;
        let mut prev_group = None;
        let mut prev_line: Option<LineId> = None;
        let mut expected_first = None;
        let mut last_group = f.first_group;
        let mut cursor = Some(f.first_group);

        while let Some(group) = cursor {
            let g = &self.groups[group];
            assert_eq!(g.frame, frame, "group {group:?} belongs to another frame");
            assert_eq!(g.prev, prev_group, "group {group:?} back link");
            assert_eq!(g.first_line_nr, expected_nr, "group {group:?} numbering");
            assert!(
                (1..=cap).contains(&g.nr_lines),
                "group {group:?} holds {} lines",
                g.nr_lines
            );
            if let Some(expected) = expected_first {
                assert_eq!(g.first_line, expected, "group {group:?} first line");
            }

            let mut line = g.first_line;
            for offset in 0..g.nr_lines {
                let l = &self.lines[line];
                assert_eq!(l.group, Some(group), "line {line:?} group");
                assert_eq!(l.offset, offset, "line {line:?} offset");
                assert_eq!(l.prev, prev_line, "line {line:?} back link");
                assert!(l.text.is_well_formed(), "line {line:?} significant length");
                assert!(l.text.len() <= max, "line {line:?} longer than {max}");
                for &mark in &l.marks {
                    let m = &self.marks[mark];
                    assert_eq!(m.line, line, "mark {mark:?} listed on the wrong line");
                    assert!((1..=max + 1).contains(&m.col), "mark {mark:?} column {}", m.col);
                }
                prev_line = Some(line);

                let last_in_group = offset + 1 == g.nr_lines;
                if last_in_group {
                    assert_eq!(g.last_line, line, "group {group:?} last line");
                }
                match l.next {
                    Some(next) if last_in_group => expected_first = Some(next),
                    Some(next) => line = next,
                    None => {
                        assert!(last_in_group && g.next.is_none(), "chain ends early");
                        assert_eq!(line, f.eop_line, "terminal line");
                        assert!(l.text.is_empty(), "terminal line holds text");
                    }
                }
            }

            expected_nr += g.nr_lines;
            prev_group = Some(group);
            last_group = group;
            cursor = g.next;
        }
        assert_eq!(f.last_group, last_group, "frame last group");
    }

    /// Runs [`TextBuffer::assert_consistent`] on every 64th mutation.
    #[cfg(debug_assertions)]
    pub(crate) fn debug_check(&mut self, frame: FrameId) {
        self.debug_mutation_count += 1;
        if self.debug_mutation_count % 64 != 0 {
            return;
        }
        self.assert_consistent(frame);
    }

    #[cfg(not(debug_assertions))]
    pub(crate) fn debug_check(&mut self, _frame: FrameId) {}

    // ==================== Mutations ====================

    /// Inserts `count` copies of `text` before the column of `dst`.
    ///
    /// Every mark at or after that column, `dst` included, moves right by the
    /// inserted width, so `dst` ends up just after the new text. A `dst` on
    /// the terminal line realizes it first.
    pub fn text_insert(&mut self, count: usize, text: &[u8], dst: MarkId) -> Result<()> {
        let max = self.config.max_line_len;
        let Some(width) = text.len().checked_mul(count) else {
            return Err(BufferError::NoRoomOnLine {
                required: usize::MAX,
                max,
            });
        };
        if width == 0 {
            return Ok(());
        }

        let Position { line, col } = self.mark_position(dst);
        let required = self.lines[line].text.used().max(col - 1).saturating_add(width);
        if required > max {
            warn!(required, max, "insert refused: no room on line");
            return Err(BufferError::NoRoomOnLine { required, max });
        }
        self.reserve_marks(1)?;

        let frame = self.line_frame(line);
        let line = if self.is_eop(line) {
            self.realize_eop(line, required)?
        } else {
            self.lines[line]
                .text
                .ensure_len(required)
                .map_err(BufferError::out_of_memory("line text"))?;
            line
        };

        self.marks_shift(line, col, self.max_col() - col + 1, line, col + width);
        self.lines[line].text.insert(col, text, count);
        self.screen_insert_chars(line, col, width);
        self.note_modified(frame, line, col + width);

        trace!(width, col, "inserted text");
        self.debug_check(frame);
        Ok(())
    }

    /// Writes `count` copies of `text` over the line starting at the column
    /// of `dst`, then advances `dst` past them. No other mark moves.
    pub fn text_overtype(&mut self, count: usize, text: &[u8], dst: MarkId) -> Result<()> {
        let max = self.config.max_line_len;
        let Some(width) = text.len().checked_mul(count) else {
            return Err(BufferError::NoRoomOnLine {
                required: usize::MAX,
                max,
            });
        };
        if width == 0 {
            return Ok(());
        }

        let Position { line, col } = self.mark_position(dst);
        let required = (col - 1).saturating_add(width);
        if required > max {
            warn!(required, max, "overtype refused: no room on line");
            return Err(BufferError::NoRoomOnLine { required, max });
        }
        self.reserve_marks(1)?;

        let frame = self.line_frame(line);
        let line = if self.is_eop(line) {
            self.realize_eop(line, required)?
        } else {
            self.lines[line]
                .text
                .ensure_len(required)
                .map_err(BufferError::out_of_memory("line text"))?;
            line
        };

        self.lines[line].text.overwrite(col, text, count);
        self.mark_relink(dst, line, col + width);
        self.repaint_line(line, col);
        self.note_modified(frame, line, col + width);

        trace!(width, col, "overtyped text");
        self.debug_check(frame);
        Ok(())
    }

    /// Removes the text in `[mark_one, mark_two)`.
    ///
    /// Marks inside the range collapse onto its start; marks after it move
    /// with the text that follows. When the range ends on the terminal line
    /// everything from `mark_one` to the end of the document goes; a
    /// `mark_one` past column 1 keeps its line and that line's break.
    pub fn text_remove(&mut self, mark_one: MarkId, mark_two: MarkId) -> Result<()> {
        let one = self.mark_position(mark_one);
        let two = self.mark_position(mark_two);
        debug_assert!(
            self.compare_positions(one, two) != Ordering::Greater,
            "remove range is reversed"
        );
        if one == two {
            return Ok(());
        }
        self.reserve_marks(1)?;
        let frame = self.line_frame(one.line);

        if one.line == two.line {
            self.remove_within_line(one.line, one.col, two.col);
        } else if self.is_eop(two.line) {
            self.remove_to_end(frame, one, two);
        } else {
            self.remove_across_lines(frame, one, two)?;
        }

        let end = self.mark_position(mark_two);
        self.note_modified(frame, end.line, end.col);
        trace!(?one, ?two, "removed text");
        self.debug_check(frame);
        Ok(())
    }

    /// Significant length of the line left after removing `[one, two)`,
    /// both ends on stored lines.
    pub(crate) fn joined_used(&self, one: Position, two: Position) -> usize {
        let suffix = self.lines[two.line].text.used().saturating_sub(two.col - 1);
        if suffix > 0 {
            one.col - 1 + suffix
        } else {
            self.lines[one.line].text.used_before(one.col)
        }
    }

    fn remove_within_line(&mut self, line: LineId, from: usize, to: usize) {
        self.marks_squeeze(line, from, line, to);
        self.marks_shift(line, to, self.max_col() - to + 1, line, from);
        self.lines[line].text.remove(from, to);
        self.screen_delete_chars(line, from, to - from);
    }

    fn remove_across_lines(&mut self, frame: FrameId, one: Position, two: Position) -> Result<()> {
        let max = self.config.max_line_len;
        let suffix = self.lines[two.line].text.used().saturating_sub(two.col - 1);
        let merged = self.joined_used(one, two);
        if merged > max {
            warn!(required = merged, max, "remove refused: joined line too long");
            return Err(BufferError::NoRoomOnLine {
                required: merged,
                max,
            });
        }
        self.lines[one.line]
            .text
            .ensure_len(merged)
            .map_err(BufferError::out_of_memory("line text"))?;

        self.invalidate_view(frame);
        self.marks_squeeze(one.line, one.col, two.line, two.col);
        self.marks_shift(
            two.line,
            two.col,
            self.max_col() - two.col + 1,
            one.line,
            one.col,
        );

        let tail = std::mem::take(&mut self.lines[two.line].text);
        let text = &mut self.lines[one.line].text;
        text.truncate_at(one.col);
        if suffix > 0 {
            text.overwrite(one.col, tail.tail(two.col), 1);
        }

        let first_gone = self.next_linked(one.line);
        self.lines_extract(first_gone, two.line);
        self.lines_destroy(first_gone, two.line);
        Ok(())
    }

    fn remove_to_end(&mut self, frame: FrameId, one: Position, two: Position) {
        let eop = two.line;
        self.invalidate_view(frame);
        self.marks_squeeze(one.line, one.col, eop, two.col);
        self.marks_shift(eop, two.col, self.max_col() - two.col + 1, eop, 1);

        let first_gone = if one.col == 1 {
            one.line
        } else {
            self.lines[one.line].text.truncate_at(one.col);
            self.next_linked(one.line)
        };
        if first_gone != eop {
            let last_gone = match self.lines[eop].prev {
                Some(prev) => prev,
                None => unreachable!("terminal line has a predecessor here"),
            };
            self.lines_extract(first_gone, last_gone);
            self.lines_destroy(first_gone, last_gone);
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBuffer")
            .field("config", &self.config)
            .field("frames", &self.frames.len())
            .field("lines", &self.lines.len())
            .field("groups", &self.groups.len())
            .field("marks", &self.marks.len())
            .field("display", &self.display.is_some())
            .finish_non_exhaustive()
    }
}
