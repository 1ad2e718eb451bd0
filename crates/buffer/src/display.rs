// Chunk: docs/chunks/display_surface - Screen row bookkeeping and redraw requests

//! The display surface seam.
//!
//! The engine never owns a screen. An embedder hands it a [`DisplaySurface`]
//! and tells it which line sits on which row; from then on every mutation
//! keeps that mapping right and asks the surface to redraw exactly the
//! cells it disturbed. A line that is not mapped to a row is off screen and
//! costs nothing to edit.
//!
//! Screen rows and columns are 0-based. Document columns are 1-based and
//! are translated through the frame's horizontal screen offset.

use crate::text_buffer::TextBuffer;
use crate::types::{FrameId, LineId};

/// What a surface can do cheaply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayCaps {
    /// Columns per row.
    pub width: u16,
    /// Rows on the surface.
    pub height: u16,
    /// Can open a gap inside a row, pushing the rest right.
    pub insert_char: bool,
    /// Can close a gap inside a row, pulling the rest left.
    pub delete_char: bool,
    /// Can open blank rows, pushing the rows below down.
    pub insert_line: bool,
    /// Can delete rows, pulling the rows below up.
    pub delete_line: bool,
}

/// A screen the engine can ask to redraw.
///
/// This trait is object-safe: the engine stores it as
/// `Box<dyn DisplaySurface>`.
pub trait DisplaySurface {
    /// Size and capabilities. Read before every request, so a surface may
    /// change them between edits.
    fn caps(&self) -> DisplayCaps;

    /// Draws `text` on `row` starting at `col`.
    fn draw_span(&mut self, row: u16, col: u16, text: &[u8]);

    /// Clears `row` from `col` to the right edge.
    fn clear_eol(&mut self, row: u16, col: u16);

    /// Places the hardware cursor.
    fn move_cursor(&mut self, row: u16, col: u16);

    /// Opens `count` blank cells at `col`. Only called when
    /// [`DisplayCaps::insert_char`] is set.
    fn insert_chars(&mut self, row: u16, col: u16, count: u16);

    /// Closes `count` cells at `col`. Only called when
    /// [`DisplayCaps::delete_char`] is set.
    fn delete_chars(&mut self, row: u16, col: u16, count: u16);

    /// Opens `count` blank rows at `row`; rows pushed past the bottom are lost.
    fn insert_lines(&mut self, row: u16, count: u16);

    /// Deletes `count` rows at `row`; blank rows appear at the bottom.
    fn delete_lines(&mut self, row: u16, count: u16);

    /// Forgets everything on screen; the embedder will remap and redraw.
    fn invalidate(&mut self);

    /// Draws the end-of-document marker row.
    fn draw_end_of_document(&mut self, row: u16) {
        self.clear_eol(row, 0);
    }
}

impl TextBuffer {
    // ==================== Surface ====================

    /// Installs a surface, returning the previous one.
    pub fn set_display(
        &mut self,
        surface: Box<dyn DisplaySurface>,
    ) -> Option<Box<dyn DisplaySurface>> {
        self.display.replace(surface)
    }

    /// Removes the surface. Row assignments are kept; nothing is drawn until a
    /// surface is installed again.
    pub fn take_display(&mut self) -> Option<Box<dyn DisplaySurface>> {
        self.display.take()
    }

    /// Moves the surface's cursor to the cell showing column `col` of `line`.
    ///
    /// Does nothing when the line is off screen, there is no surface, or the
    /// column is scrolled out of view.
    pub fn show_cursor(&mut self, line: LineId, col: usize) {
        let Some(row) = self.lines[line].screen_row else {
            return;
        };
        let offset = self.frames[self.line_frame(line)].scr_offset;
        let Some(display) = self.display.as_mut() else {
            return;
        };
        if col > offset && col - 1 - offset < usize::from(display.caps().width) {
            display.move_cursor(row, (col - 1 - offset) as u16);
        }
    }

    // ==================== Row mapping ====================

    /// Puts `line` on screen `row` and draws it, or takes it off screen.
    ///
    /// Returns false when there is no surface or the row is below it.
    pub fn set_screen_row(&mut self, line: LineId, row: Option<u16>) -> bool {
        match row {
            Some(row) => {
                let Some(display) = self.display.as_ref() else {
                    return false;
                };
                if row >= display.caps().height {
                    return false;
                }
                self.map_row(line, row);
                self.repaint_line(line, 1);
            }
            None => self.unmap_row(line),
        }
        true
    }

    /// Returns the surface row showing `line`, or `None` when it is off screen.
    pub fn screen_row(&self, line: LineId) -> Option<u16> {
        self.lines[line].screen_row
    }

    /// Scrolls a frame horizontally. The view is invalidated so the embedder
    /// redraws it.
    pub fn set_screen_offset(&mut self, frame: FrameId, offset: usize) {
        if self.frames[frame].scr_offset != offset {
            self.frames[frame].scr_offset = offset;
            self.invalidate_view(frame);
        }
    }

    /// Returns the horizontal scroll of `frame` in columns.
    pub fn screen_offset(&self, frame: FrameId) -> usize {
        self.frames[frame].scr_offset
    }

    fn map_row(&mut self, line: LineId, row: u16) {
        if self.lines[line].screen_row.replace(row).is_none() {
            self.mapped_lines += 1;
        }
    }

    fn unmap_row(&mut self, line: LineId) {
        if self.lines[line].screen_row.take().is_some() {
            self.mapped_lines -= 1;
        }
    }

    /// Takes every line of `frame` off screen and tells the surface to forget
    /// its contents.
    pub fn invalidate_view(&mut self, frame: FrameId) {
        if self.mapped_lines > 0 {
            let mut seen = false;
            let mut cursor = Some(self.first_line(frame));
            while let Some(line) = cursor {
                if self.lines[line].screen_row.is_some() {
                    self.unmap_row(line);
                    seen = true;
                } else if seen {
                    break;
                }
                cursor = self.lines[line].next;
            }
        }
        if let Some(display) = self.display.as_mut() {
            display.invalidate();
        }
    }

    // ==================== Drawing ====================

    /// Redraws a mapped line from document column `from_col` to the right edge.
    pub(crate) fn repaint_line(&mut self, line: LineId, from_col: usize) {
        let Some(row) = self.lines[line].screen_row else {
            return;
        };
        let eop = self.is_eop(line);
        let offset = self.frames[self.line_frame(line)].scr_offset;
        let Some(display) = self.display.as_mut() else {
            return;
        };
        if eop {
            display.draw_end_of_document(row);
            return;
        }

        let width = usize::from(display.caps().width);
        let start = from_col.max(offset + 1);
        if start > offset + width {
            return;
        }
        let col = start - 1 - offset;
        let text = self.lines[line].text.as_bytes();
        let end = text.len().min(offset + width);
        let span = if start <= end { &text[start - 1..end] } else { &[][..] };
        if !span.is_empty() {
            display.draw_span(row, col as u16, span);
        }
        if col + span.len() < width {
            display.clear_eol(row, (col + span.len()) as u16);
        }
    }

    /// Shows `width` columns inserted at `col` of a mapped line.
    pub(crate) fn screen_insert_chars(&mut self, line: LineId, col: usize, width: usize) {
        let Some(row) = self.lines[line].screen_row else {
            return;
        };
        let offset = self.frames[self.line_frame(line)].scr_offset;
        let has_tail = self.lines[line].text.used() >= col + width;
        let Some(display) = self.display.as_mut() else {
            return;
        };
        let caps = display.caps();
        let screen_width = usize::from(caps.width);

        if caps.insert_char && has_tail && col > offset && col - 1 - offset < screen_width {
            let at = col - 1 - offset;
            let count = width.min(screen_width - at);
            display.insert_chars(row, at as u16, count as u16);
            let text = self.lines[line].text.as_bytes();
            display.draw_span(row, at as u16, &text[col - 1..col - 1 + count]);
        } else {
            self.repaint_line(line, col);
        }
    }

    /// Shows `width` columns removed at `col` of a mapped line.
    pub(crate) fn screen_delete_chars(&mut self, line: LineId, col: usize, width: usize) {
        let Some(row) = self.lines[line].screen_row else {
            return;
        };
        let offset = self.frames[self.line_frame(line)].scr_offset;
        let has_tail = self.lines[line].text.used() >= col;
        let Some(display) = self.display.as_mut() else {
            return;
        };
        let caps = display.caps();
        let screen_width = usize::from(caps.width);

        if caps.delete_char && has_tail && col > offset && col - 1 - offset < screen_width {
            let at = col - 1 - offset;
            let count = width.min(screen_width - at);
            display.delete_chars(row, at as u16, count as u16);
            // Text pulled in at the right edge.
            self.repaint_line(line, offset + screen_width - count + 1);
        } else {
            self.repaint_line(line, col);
        }
    }

    // ==================== Structural changes ====================

    /// Makes room on screen for `n` lines just linked in as `first..=last`.
    pub(crate) fn screen_lines_injected(&mut self, first: LineId, last: LineId, n: usize) {
        if self.mapped_lines == 0 {
            return;
        }
        let Some(caps) = self.display.as_ref().map(|display| display.caps()) else {
            return;
        };
        let height = usize::from(caps.height);
        let before = self.next_linked(last);

        let anchor = match self.lines[before].screen_row {
            Some(row) => usize::from(row),
            None => match self.lines[first].prev.and_then(|p| self.lines[p].screen_row) {
                Some(row) if usize::from(row) + 1 < height => usize::from(row) + 1,
                _ => return,
            },
        };
        if caps.insert_line {
            if let Some(display) = self.display.as_mut() {
                display.insert_lines(anchor as u16, n.min(height - anchor) as u16);
            }
        }

        let mut cursor = Some(before);
        while let Some(line) = cursor {
            let Some(row) = self.lines[line].screen_row else {
                break;
            };
            let shifted = usize::from(row) + n;
            if shifted < height {
                self.lines[line].screen_row = Some(shifted as u16);
                if !caps.insert_line {
                    self.repaint_line(line, 1);
                }
            } else {
                self.unmap_row(line);
            }
            cursor = self.lines[line].next;
        }

        let mut row = anchor;
        let mut cursor = first;
        while row < height {
            self.map_row(cursor, row as u16);
            self.repaint_line(cursor, 1);
            if cursor == last {
                break;
            }
            cursor = self.next_linked(cursor);
            row += 1;
        }
    }

    /// Takes the lines `first..=last` off screen, returning the top vacated
    /// row and how many rows were vacated.
    pub(crate) fn screen_unmap_run(&mut self, first: LineId, last: LineId) -> Option<(u16, u16)> {
        if self.mapped_lines == 0 {
            return None;
        }
        let mut top: Option<u16> = None;
        let mut count = 0u16;
        let mut cursor = first;
        loop {
            if let Some(row) = self.lines[cursor].screen_row {
                top = Some(top.map_or(row, |t| t.min(row)));
                count += 1;
                self.unmap_row(cursor);
            }
            if cursor == last {
                break;
            }
            cursor = self.next_linked(cursor);
        }
        top.map(|top| (top, count))
    }

    /// Closes `count` vacated rows starting at `row`, pulling `next` and the
    /// lines below it up and filling the freed bottom rows.
    pub(crate) fn screen_lines_extracted(&mut self, next: LineId, row: u16, count: u16) {
        let Some(display) = self.display.as_mut() else {
            return;
        };
        let caps = display.caps();
        let height = usize::from(caps.height);
        if caps.delete_line {
            display.delete_lines(row, count);
        }

        let mut free_row = usize::from(row);
        let mut cursor = Some(next);
        while let Some(line) = cursor {
            let Some(old) = self.lines[line].screen_row else {
                break;
            };
            let new = old - count;
            self.lines[line].screen_row = Some(new);
            if !caps.delete_line {
                self.repaint_line(line, 1);
            }
            free_row = usize::from(new) + 1;
            cursor = self.lines[line].next;
        }

        while let Some(line) = cursor {
            if free_row >= height {
                break;
            }
            self.map_row(line, free_row as u16);
            self.repaint_line(line, 1);
            free_row += 1;
            cursor = self.lines[line].next;
        }

        if !caps.delete_line {
            if let Some(display) = self.display.as_mut() {
                for stale in free_row..height {
                    display.clear_eol(stale as u16, 0);
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Op {
        Draw(u16, u16, String),
        ClearEol(u16, u16),
        Cursor(u16, u16),
        InsertChars(u16, u16, u16),
        DeleteChars(u16, u16, u16),
        InsertLines(u16, u16),
        DeleteLines(u16, u16),
        Invalidate,
        EndOfDocument(u16),
    }

    /// Surface that records every request.
    pub(crate) struct Recorder {
        pub(crate) caps: DisplayCaps,
        pub(crate) ops: Rc<RefCell<Vec<Op>>>,
    }

    impl Recorder {
        pub(crate) fn install(buf: &mut TextBuffer, caps: DisplayCaps) -> Rc<RefCell<Vec<Op>>> {
            let ops = Rc::new(RefCell::new(Vec::new()));
            buf.set_display(Box::new(Recorder {
                caps,
                ops: Rc::clone(&ops),
            }));
            ops
        }
    }

    impl DisplaySurface for Recorder {
        fn caps(&self) -> DisplayCaps {
            self.caps
        }
        fn draw_span(&mut self, row: u16, col: u16, text: &[u8]) {
            let text = String::from_utf8_lossy(text).into_owned();
            self.ops.borrow_mut().push(Op::Draw(row, col, text));
        }
        fn clear_eol(&mut self, row: u16, col: u16) {
            self.ops.borrow_mut().push(Op::ClearEol(row, col));
        }
        fn move_cursor(&mut self, row: u16, col: u16) {
            self.ops.borrow_mut().push(Op::Cursor(row, col));
        }
        fn insert_chars(&mut self, row: u16, col: u16, count: u16) {
            self.ops.borrow_mut().push(Op::InsertChars(row, col, count));
        }
        fn delete_chars(&mut self, row: u16, col: u16, count: u16) {
            self.ops.borrow_mut().push(Op::DeleteChars(row, col, count));
        }
        fn insert_lines(&mut self, row: u16, count: u16) {
            self.ops.borrow_mut().push(Op::InsertLines(row, count));
        }
        fn delete_lines(&mut self, row: u16, count: u16) {
            self.ops.borrow_mut().push(Op::DeleteLines(row, count));
        }
        fn invalidate(&mut self) {
            self.ops.borrow_mut().push(Op::Invalidate);
        }
        fn draw_end_of_document(&mut self, row: u16) {
            self.ops.borrow_mut().push(Op::EndOfDocument(row));
        }
    }

    pub(crate) fn full_caps(width: u16, height: u16) -> DisplayCaps {
        DisplayCaps {
            width,
            height,
            insert_char: true,
            delete_char: true,
            insert_line: true,
            delete_line: true,
        }
    }

    /// Frame with `contents` loaded and shown from row 0.
    fn shown(contents: &[&str], caps: DisplayCaps) -> (TextBuffer, FrameId, Rc<RefCell<Vec<Op>>>) {
        let mut buf = TextBuffer::new();
        let frame = buf.create_frame().unwrap();
        let eop = buf.eop_line(frame);
        buf.load_lines(eop, contents).unwrap();
        let ops = Recorder::install(&mut buf, caps);
        let mut cursor = Some(buf.first_line(frame));
        let mut row = 0;
        while let Some(line) = cursor {
            if !buf.set_screen_row(line, Some(row)) {
                break;
            }
            row += 1;
            cursor = buf.next_line(line);
        }
        ops.borrow_mut().clear();
        (buf, frame, ops)
    }

    #[test]
    fn test_set_screen_row_draws_line() {
        let mut buf = TextBuffer::new();
        let frame = buf.create_frame().unwrap();
        let eop = buf.eop_line(frame);
        let (line, _) = buf.load_lines(eop, &["hello"]).unwrap().unwrap();
        let ops = Recorder::install(&mut buf, full_caps(20, 5));

        assert!(buf.set_screen_row(line, Some(2)));
        assert!(!buf.set_screen_row(eop, Some(5)));
        assert_eq!(
            *ops.borrow(),
            vec![Op::Draw(2, 0, "hello".into()), Op::ClearEol(2, 5)]
        );
        assert_eq!(buf.screen_row(line), Some(2));
    }

    #[test]
    fn test_repaint_respects_screen_offset() {
        let (mut buf, frame, ops) = shown(&["abcdefghij"], full_caps(4, 3));
        buf.frames[frame].scr_offset = 3;
        let line = buf.first_line(frame);
        buf.repaint_line(line, 1);
        assert_eq!(*ops.borrow(), vec![Op::Draw(0, 0, "defg".into())]);
    }

    #[test]
    fn test_insert_uses_insert_chars_when_tail_visible() {
        let (mut buf, frame, ops) = shown(&["ABCDEF"], full_caps(20, 3));
        let line = buf.first_line(frame);
        let mut mark = None;
        buf.mark_create(line, 4, &mut mark).unwrap();
        buf.text_insert(1, b"XY", mark.unwrap()).unwrap();
        assert_eq!(
            *ops.borrow(),
            vec![Op::InsertChars(0, 3, 2), Op::Draw(0, 3, "XY".into())]
        );
    }

    #[test]
    fn test_insert_without_capability_repaints_tail() {
        let caps = DisplayCaps {
            insert_char: false,
            ..full_caps(20, 3)
        };
        let (mut buf, frame, ops) = shown(&["ABCDEF"], caps);
        let line = buf.first_line(frame);
        let mut mark = None;
        buf.mark_create(line, 4, &mut mark).unwrap();
        buf.text_insert(1, b"XY", mark.unwrap()).unwrap();
        assert_eq!(
            *ops.borrow(),
            vec![Op::Draw(0, 3, "XYDEF".into()), Op::ClearEol(0, 8)]
        );
    }

    #[test]
    fn test_split_opens_row_below() {
        let (mut buf, frame, ops) = shown(&["abcdef", "second"], full_caps(20, 4));
        let line = buf.first_line(frame);
        let mut mark = None;
        buf.mark_create(line, 4, &mut mark).unwrap();
        buf.split_line(mark.unwrap(), 1, None).unwrap();

        let first = buf.first_line(frame);
        let second = buf.next_line(first).unwrap();
        let third = buf.next_line(second).unwrap();
        assert_eq!(buf.screen_row(first), Some(0));
        assert_eq!(buf.screen_row(second), Some(1));
        assert_eq!(buf.screen_row(third), Some(2));
        assert_eq!(buf.screen_row(buf.eop_line(frame)), Some(3));
        assert!(ops.borrow().contains(&Op::InsertLines(1, 1)));
        assert!(ops.borrow().contains(&Op::Draw(1, 0, "def".into())));
    }

    #[test]
    fn test_extract_pulls_rows_up_and_fills_bottom() {
        let (mut buf, frame, ops) = shown(&["a", "b", "c", "d", "e"], full_caps(10, 3));
        let first = buf.first_line(frame);
        let second = buf.next_line(first).unwrap();
        buf.lines_extract(second, second);

        let third = buf.next_line(first).unwrap();
        let fourth = buf.next_line(third).unwrap();
        assert_eq!(buf.screen_row(second), None);
        assert_eq!(buf.screen_row(third), Some(1));
        assert_eq!(buf.screen_row(fourth), Some(2));
        assert_eq!(
            *ops.borrow(),
            vec![
                Op::DeleteLines(1, 1),
                Op::Draw(2, 0, "d".into()),
                Op::ClearEol(2, 1)
            ]
        );
        buf.lines_destroy(second, second);
    }

    #[test]
    fn test_invalidate_view_unmaps_frame() {
        let (mut buf, frame, ops) = shown(&["a", "b"], full_caps(10, 5));
        buf.invalidate_view(frame);
        assert_eq!(buf.screen_row(buf.first_line(frame)), None);
        assert_eq!(buf.screen_row(buf.eop_line(frame)), None);
        assert_eq!(buf.mapped_lines, 0);
        assert_eq!(*ops.borrow(), vec![Op::Invalidate]);
    }

    #[test]
    fn test_show_cursor_translates_through_offset() {
        let (mut buf, frame, ops) = shown(&["abcdefghij", "k"], full_caps(4, 3));
        let line = buf.first_line(frame);
        buf.show_cursor(line, 3);
        assert_eq!(*ops.borrow(), vec![Op::Cursor(0, 2)]);

        buf.set_screen_offset(frame, 3);
        ops.borrow_mut().clear();
        // The offset change took the frame off screen.
        buf.show_cursor(line, 5);
        assert!(ops.borrow().is_empty());

        buf.set_screen_row(line, Some(0));
        ops.borrow_mut().clear();
        buf.show_cursor(line, 5);
        buf.show_cursor(line, 3);
        buf.show_cursor(line, 8);
        assert_eq!(*ops.borrow(), vec![Op::Cursor(0, 1)]);
    }

    #[test]
    fn test_set_screen_offset_invalidates_once() {
        let (mut buf, frame, ops) = shown(&["a", "b"], full_caps(10, 5));
        buf.set_screen_offset(frame, 4);
        assert_eq!(buf.screen_offset(frame), 4);
        assert_eq!(buf.screen_row(buf.first_line(frame)), None);
        assert_eq!(*ops.borrow(), vec![Op::Invalidate]);

        buf.set_screen_offset(frame, 4);
        assert_eq!(ops.borrow().len(), 1);
    }

    #[test]
    fn test_take_display_stops_drawing_but_keeps_rows() {
        let (mut buf, frame, ops) = shown(&["abc"], full_caps(10, 3));
        let line = buf.first_line(frame);
        let surface = buf.take_display();
        assert!(surface.is_some());
        assert!(buf.take_display().is_none());

        let mut mark = None;
        buf.mark_create(line, 4, &mut mark).unwrap();
        buf.text_insert(1, b"d", mark.unwrap()).unwrap();
        buf.show_cursor(line, 2);
        assert!(ops.borrow().is_empty());
        assert_eq!(buf.screen_row(line), Some(0));

        assert!(buf.set_display(surface.unwrap()).is_none());
        buf.show_cursor(line, 2);
        assert_eq!(*ops.borrow(), vec![Op::Cursor(0, 1)]);
    }
}
