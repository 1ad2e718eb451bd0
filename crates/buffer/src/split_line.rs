// Chunk: docs/chunks/split_line - Line splitting with auto-indent and two strategies

//! Splitting a line in two.
//!
//! The part before the split column stays as one line; the rest continues on
//! the next line starting at a chosen column. Which physical line ends up
//! holding which half is decided by [`choose_split_strategy`]; callers only
//! ever see the logical result, which is the same either way.

use tracing::{debug, warn};

use crate::error::{BufferError, Result};
use crate::line_text::{LineText, BLANK};
use crate::split_cost::{choose_split_strategy, ScreenGeometry, SplitCostInputs, SplitStrategy};
use crate::text_buffer::TextBuffer;
use crate::types::{FrameId, LineId, MarkId, Position};

impl TextBuffer {
    /// Splits the line of `before_mark` before its column.
    ///
    /// The second half starts at `new_col`; `0` asks for the auto-indent
    /// column. Marks before the split column stay on the first half; the rest
    /// move to the second half, translated to `new_col`. When `equals_out` is
    /// given it is placed at the split point on the first half.
    pub fn split_line(
        &mut self,
        before_mark: MarkId,
        new_col: usize,
        equals_out: Option<&mut Option<MarkId>>,
    ) -> Result<()> {
        self.split_line_using(before_mark, new_col, equals_out, None)
    }

    /// [`TextBuffer::split_line`] with the strategy optionally forced.
    pub(crate) fn split_line_using(
        &mut self,
        before_mark: MarkId,
        new_col: usize,
        equals_out: Option<&mut Option<MarkId>>,
        forced: Option<SplitStrategy>,
    ) -> Result<()> {
        let Position { line, col } = self.mark_position(before_mark);
        if self.is_eop(line) {
            return Err(BufferError::AtEndOfDocument);
        }
        let frame = self.line_frame(line);
        let new_col = if new_col == 0 {
            self.auto_indent_column(frame, line)
        } else {
            new_col
        };

        let max = self.config.max_line_len;
        let used = self.lines[line].text.used();
        let suffix = used.saturating_sub(col - 1);
        let second_len = if suffix > 0 { new_col - 1 + suffix } else { 0 };
        if second_len > max {
            warn!(required = second_len, max, "split refused: no room on line");
            return Err(BufferError::NoRoomOnLine {
                required: second_len,
                max,
            });
        }
        self.reserve_marks(2)?;

        let inputs = SplitCostInputs {
            before_col: col,
            used,
            new_col,
            screen: self.screen_geometry(line),
        };
        let strategy = forced.unwrap_or_else(|| choose_split_strategy(&inputs));
        let first_half = match strategy {
            SplitStrategy::MoveSuffix => self.split_move_suffix(line, col, new_col, second_len)?,
            SplitStrategy::MovePrefix => self.split_move_prefix(line, col, new_col, second_len)?,
        };

        if let Some(slot) = equals_out {
            self.mark_place(slot, first_half, col);
        }
        let second_half = self.next_linked(first_half);
        self.note_modified(frame, second_half, new_col);

        debug!(?strategy, col, new_col, "split line");
        self.debug_check(frame);
        Ok(())
    }

    /// Returns the column a new line starts at when no column is given.
    ///
    /// With auto-indent on this is the indentation of `line`, provided it lies
    /// inside the margins; otherwise the left margin.
    pub fn auto_indent_column(&self, frame: FrameId, line: LineId) -> usize {
        let f = &self.frames[frame];
        if !f.auto_indent {
            return f.margin_left;
        }
        match self.lines[line].text.first_non_blank() {
            Some(col) if (f.margin_left..=f.margin_right).contains(&col) => col,
            _ => f.margin_left,
        }
    }

    fn screen_geometry(&self, line: LineId) -> Option<ScreenGeometry> {
        let row = self.lines[line].screen_row?;
        let caps = self.display.as_ref()?.caps();
        Some(ScreenGeometry {
            offset: self.frames[self.line_frame(line)].scr_offset,
            caps,
            rows_below: caps.height.saturating_sub(row),
        })
    }

    /// Moves the suffix onto a new line below. Returns the first half.
    fn split_move_suffix(
        &mut self,
        line: LineId,
        col: usize,
        new_col: usize,
        second_len: usize,
    ) -> Result<LineId> {
        let mut text =
            LineText::with_len(second_len).map_err(BufferError::out_of_memory("line text"))?;
        if second_len > 0 {
            text.overwrite(new_col, self.lines[line].text.tail(col), 1);
        }

        let (new_line, _) = self.lines_create(1)?;
        self.lines[new_line].text = text;
        let next = self.next_linked(line);
        if let Err(err) = self.lines_inject(new_line, new_line, next) {
            self.lines_destroy(new_line, new_line);
            return Err(err);
        }

        self.marks_shift(line, col, self.max_col() - col + 1, new_line, new_col);
        self.lines[line].text.truncate_at(col);
        self.repaint_line(line, col);
        Ok(line)
    }

    /// Moves the prefix onto a new line above and slides the suffix to
    /// `new_col`. Returns the first half.
    fn split_move_prefix(
        &mut self,
        line: LineId,
        col: usize,
        new_col: usize,
        second_len: usize,
    ) -> Result<LineId> {
        let prefix_len = self.lines[line].text.used_before(col);
        let mut text =
            LineText::with_len(prefix_len).map_err(BufferError::out_of_memory("line text"))?;
        if prefix_len > 0 {
            text.overwrite(1, &self.lines[line].text.as_bytes()[..prefix_len], 1);
        }
        self.lines[line]
            .text
            .ensure_len(second_len)
            .map_err(BufferError::out_of_memory("line text"))?;

        let (new_line, _) = self.lines_create(1)?;
        self.lines[new_line].text = text;
        if let Err(err) = self.lines_inject(new_line, new_line, line) {
            self.lines_destroy(new_line, new_line);
            return Err(err);
        }

        self.marks_shift(line, 1, col - 1, new_line, 1);
        let remaining = &mut self.lines[line].text;
        remaining.remove(1, col);
        if new_col > 1 && !remaining.is_empty() {
            remaining.insert(1, &[BLANK], new_col - 1);
        }
        self.marks_shift(line, col, self.max_col() - col + 1, line, new_col);
        self.repaint_line(line, 1);
        Ok(new_line)
    }
}
