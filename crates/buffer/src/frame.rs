// Chunk: docs/chunks/frames - Per-document context: margins, flags, special marks

//! Frames.
//!
//! A frame is one document held by the engine: its group chain and terminal
//! line, the margins used by auto-indent, the modified flag, the caret
//! ("dot") and the special marks every successful mutation keeps current.

use tracing::{debug, warn};

use crate::error::{BufferError, Result};
use crate::text_buffer::TextBuffer;
use crate::types::{FrameId, GroupId, LineId, MarkId, SpecialMark};

/// One open document: its group chain, terminal line and frame-owned marks.
#[derive(Debug)]
pub struct Frame {
    pub(crate) first_group: GroupId,
    pub(crate) last_group: GroupId,
    pub(crate) eop_line: LineId,
    pub(crate) margin_left: usize,
    pub(crate) margin_right: usize,
    pub(crate) auto_indent: bool,
    pub(crate) modified: bool,
    pub(crate) dot: MarkId,
    pub(crate) equals: Option<MarkId>,
    pub(crate) modified_mark: Option<MarkId>,
    /// Leftmost document column shown on screen, less one.
    pub(crate) scr_offset: usize,
}

impl TextBuffer {
    /// Creates an empty document: a terminal line in its own group, with the
    /// caret on it.
    pub fn create_frame(&mut self) -> Result<FrameId> {
        self.frames
            .try_reserve(1)
            .map_err(BufferError::out_of_memory("frames"))?;
        self.reserve_marks(1)?;

        let frame = self.frames.next_handle();
        let (group, eop) = self.line_eop_create(frame)?;
        let mut dot = None;
        self.mark_place(&mut dot, eop, 1);
        let Some(dot) = dot else {
            unreachable!("mark_place always sets the slot");
        };

        let stored = self.frames.insert(Frame {
            first_group: group,
            last_group: group,
            eop_line: eop,
            margin_left: self.config.default_margin_left,
            margin_right: self.config.default_margin_right,
            auto_indent: false,
            modified: false,
            dot,
            equals: None,
            modified_mark: None,
            scr_offset: 0,
        });
        debug_assert_eq!(stored, frame);
        debug!(frame = ?frame, "created frame");
        Ok(frame)
    }

    /// Frees a document with every line and mark still in it.
    ///
    /// Marks other than the caret and special marks belong to their creators;
    /// any still present are freed with a warning, leaving those handles stale.
    pub fn destroy_frame(&mut self, frame: FrameId) {
        self.invalidate_view(frame);

        let mut dot = Some(self.frames[frame].dot);
        self.mark_destroy(&mut dot);
        let mut equals = self.frames[frame].equals.take();
        self.mark_destroy(&mut equals);
        let mut modified = self.frames[frame].modified_mark.take();
        self.mark_destroy(&mut modified);

        let mut leaked = 0;
        let mut cursor = Some(self.first_line(frame));
        while let Some(line) = cursor {
            for mark in std::mem::take(&mut self.lines[line].marks) {
                self.marks.remove(mark);
                leaked += 1;
            }
            cursor = self.lines[line].next;
        }
        if leaked > 0 {
            warn!(frame = ?frame, leaked, "destroying frame with live marks");
        }

        let eop = self.frames[frame].eop_line;
        if let Some(last) = self.lines[eop].prev {
            let first = self.first_line(frame);
            self.lines_extract(first, last);
            self.lines_destroy(first, last);
        }
        self.line_eop_destroy(frame);
        self.frames.remove(frame);
        debug!(frame = ?frame, "destroyed frame");
    }

    /// Sets the margins used by auto-indent.
    pub fn set_margins(&mut self, frame: FrameId, left: usize, right: usize) -> Result<()> {
        if left == 0 || left >= right || right > self.config.max_line_len {
            return Err(BufferError::InvalidMargins { left, right });
        }
        let f = &mut self.frames[frame];
        f.margin_left = left;
        f.margin_right = right;
        Ok(())
    }

    /// Returns the `(left, right)` margin columns.
    pub fn margins(&self, frame: FrameId) -> (usize, usize) {
        let f = &self.frames[frame];
        (f.margin_left, f.margin_right)
    }

    /// Enables or disables auto-indent for line splits in `frame`.
    pub fn set_auto_indent(&mut self, frame: FrameId, on: bool) {
        self.frames[frame].auto_indent = on;
    }

    pub fn auto_indent(&self, frame: FrameId) -> bool {
        self.frames[frame].auto_indent
    }

    /// Returns true if the document changed since creation or the last
    /// [`TextBuffer::clear_modified`].
    pub fn is_modified(&self, frame: FrameId) -> bool {
        self.frames[frame].modified
    }

    /// Resets the modified flag, typically after the document is saved.
    pub fn clear_modified(&mut self, frame: FrameId) {
        self.frames[frame].modified = false;
    }

    /// Returns the caret mark.
    pub fn dot(&self, frame: FrameId) -> MarkId {
        self.frames[frame].dot
    }

    /// Returns the frame's `Equals` or `Modified` mark, if it has been placed.
    pub fn special_mark(&self, frame: FrameId, which: SpecialMark) -> Option<MarkId> {
        let f = &self.frames[frame];
        match which {
            SpecialMark::Equals => f.equals,
            SpecialMark::Modified => f.modified_mark,
        }
    }

    /// Places one of the frame's special marks, allocating it on first use.
    pub fn set_special_mark(
        &mut self,
        frame: FrameId,
        which: SpecialMark,
        line: LineId,
        col: usize,
    ) -> Result<()> {
        let mut slot = self.special_mark(frame, which);
        self.mark_create(line, col, &mut slot)?;
        self.store_special_mark(frame, which, slot);
        Ok(())
    }

    /// Records a successful mutation ending at (line, col). A mark slot must
    /// have been reserved by the caller.
    pub(crate) fn note_modified(&mut self, frame: FrameId, line: LineId, col: usize) {
        let mut slot = self.frames[frame].modified_mark;
        self.mark_place(&mut slot, line, col.min(self.max_col()));
        self.frames[frame].modified_mark = slot;
        self.frames[frame].modified = true;
    }

    fn store_special_mark(&mut self, frame: FrameId, which: SpecialMark, slot: Option<MarkId>) {
        let f = &mut self.frames[frame];
        match which {
            SpecialMark::Equals => f.equals = slot,
            SpecialMark::Modified => f.modified_mark = slot,
        }
    }
}
