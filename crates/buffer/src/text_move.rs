// Chunk: docs/chunks/text_move - Copy and transfer of mark-delimited text

//! Copying and transferring text between positions.
//!
//! The source range is snapshotted before anything changes, so a copy into
//! itself or a transfer that shifts its own destination reads the original
//! text. A transfer removes the source first and then inserts at the
//! destination's relocated position.
//!
//! Everything that can fail is decided before the removal: the length of
//! every affected line is computed against where the destination will land,
//! and all storage the insertion needs is allocated up front.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::error::{BufferError, Result};
use crate::line_text::{significant_len, LineText};
use crate::text_buffer::TextBuffer;
use crate::types::{LineId, MarkId, Position};

/// The line the text will be inserted into, as it will look when the
/// insertion starts.
#[derive(Debug, Clone, Copy)]
struct InsertSite {
    line: LineId,
    col: usize,
    used: usize,
    on_eop: bool,
}

impl InsertSite {
    /// Significant bytes at and after the insertion column.
    fn tail_len(&self) -> usize {
        self.used.saturating_sub(self.col - 1)
    }

    /// True when multi-line text ending in a line break lands on the terminal
    /// line. The realized line supplies that break, so no stored line is
    /// created for the empty last segment.
    fn keeps_last_on_eop(&self, segments: &[Vec<u8>]) -> bool {
        self.on_eop
            && segments.len() > 1
            && segments.last().is_some_and(|last| significant_len(last) == 0)
    }
}

/// Storage allocated before the document changes.
#[derive(Debug, Default)]
struct Prepared {
    realized: Option<LineText>,
    middle: Vec<LineText>,
    last: Option<LineText>,
}

impl TextBuffer {
    /// Copies (`copy == true`) or transfers the text in `[mark_one,
    /// mark_two)` to the position of `dst`, `count` times over.
    ///
    /// `new_start` and `new_end` are placed around the inserted text. With a
    /// `count` of zero or an empty range both land on `dst` and nothing
    /// changes. A transfer within one frame into the strict interior of its
    /// own source fails with [`BufferError::DestinationInsideSource`].
    pub fn text_move(
        &mut self,
        copy: bool,
        count: usize,
        mark_one: MarkId,
        mark_two: MarkId,
        dst: MarkId,
        new_start: &mut Option<MarkId>,
        new_end: &mut Option<MarkId>,
    ) -> Result<()> {
        let one = self.mark_position(mark_one);
        let two = self.mark_position(mark_two);
        let at = self.mark_position(dst);
        debug_assert!(
            self.compare_positions(one, two) != Ordering::Greater,
            "move range is reversed"
        );
        let dst_frame = self.line_frame(at.line);
        let same_frame = self.line_frame(one.line) == dst_frame;

        if !copy
            && same_frame
            && self.compare_positions(one, at) == Ordering::Less
            && self.compare_positions(at, two) == Ordering::Less
        {
            return Err(BufferError::DestinationInsideSource);
        }
        self.reserve_marks(4)?;
        if count == 0 || one == two {
            self.mark_place(new_start, at.line, at.col);
            self.mark_place(new_end, at.line, at.col);
            return Ok(());
        }

        let max = self.config.max_line_len;
        let segments = repeat_segments(self.snapshot_range(one, two)?, count, max)?;
        let site = if !copy && same_frame {
            self.site_after_removal(at, one, two)
        } else {
            self.insert_site(at)
        };
        self.check_fit(&segments, &site)?;
        let prepared = self.prepare_insert(&segments, &site)?;

        if !copy {
            self.text_remove(mark_one, mark_two)?;
        }
        let at = self.mark_position(dst);
        debug_assert_eq!((at.line, at.col), (site.line, site.col), "destination drifted");

        let (start, end) = self.insert_segments(at, &segments, prepared)?;
        self.mark_place(new_start, start.line, start.col);
        self.mark_place(new_end, end.line, end.col);
        self.note_modified(dst_frame, end.line, end.col);

        debug!(copy, count, lines = segments.len(), "moved text");
        self.debug_check(dst_frame);
        Ok(())
    }

    /// Copies `[one, two)` into one byte run per line touched. Columns past
    /// the significant text on the last line read as blanks.
    fn snapshot_range(&self, one: Position, two: Position) -> Result<Vec<Vec<u8>>> {
        let mut segments: Vec<Vec<u8>> = Vec::new();
        let mut line = one.line;
        let mut from = one.col;
        loop {
            let text = &self.lines[line].text;
            let to = if line == two.line {
                two.col
            } else {
                (text.used() + 1).max(from)
            };
            let mut segment = Vec::new();
            text.copy_columns(from, to, &mut segment)
                .map_err(BufferError::out_of_memory("scratch text"))?;
            segments
                .try_reserve(1)
                .map_err(BufferError::out_of_memory("scratch text"))?;
            segments.push(segment);

            if line == two.line {
                return Ok(segments);
            }
            line = self.next_linked(line);
            from = 1;
        }
    }

    fn insert_site(&self, at: Position) -> InsertSite {
        InsertSite {
            line: at.line,
            col: at.col,
            used: self.lines[at.line].text.used(),
            on_eop: self.is_eop(at.line),
        }
    }

    /// Where `at` will be once `[one, two)` has been removed from its frame.
    /// `at` must not lie strictly inside the range.
    fn site_after_removal(&self, at: Position, one: Position, two: Position) -> InsertSite {
        let to_end = one.line != two.line && self.is_eop(two.line);

        if at.line == two.line && at.col >= two.col {
            if to_end {
                return InsertSite {
                    line: two.line,
                    col: at.col - two.col + 1,
                    used: 0,
                    on_eop: true,
                };
            }
            return InsertSite {
                line: one.line,
                col: one.col + (at.col - two.col),
                used: self.joined_used(one, two),
                on_eop: self.is_eop(one.line),
            };
        }

        if at.line == one.line && at.col <= one.col {
            if !to_end {
                return InsertSite {
                    line: one.line,
                    col: at.col,
                    used: self.joined_used(one, two),
                    on_eop: self.is_eop(one.line),
                };
            }
            // A mark at the range start collapses onto the terminal line.
            if at.col == one.col {
                return InsertSite {
                    line: two.line,
                    col: 1,
                    used: 0,
                    on_eop: true,
                };
            }
            return InsertSite {
                line: one.line,
                col: at.col,
                used: self.lines[one.line].text.used_before(one.col),
                on_eop: false,
            };
        }

        self.insert_site(at)
    }

    /// Fails with `NoRoomOnLine` if any line the insertion produces would be
    /// too long.
    fn check_fit(&self, segments: &[Vec<u8>], site: &InsertSite) -> Result<()> {
        let max = self.config.max_line_len;
        let required = match segments {
            [only] => site.used.max(site.col - 1).saturating_add(only.len()),
            [first, middle @ .., last] => {
                let head = site.col - 1 + significant_len(first);
                let body = middle.iter().map(|s| significant_len(s)).max().unwrap_or(0);
                let tail = site.tail_len();
                let end = if site.keeps_last_on_eop(segments) {
                    0
                } else if tail > 0 {
                    last.len() + tail
                } else {
                    significant_len(last)
                };
                head.max(body).max(end)
            }
            [] => 0,
        };
        if required > max {
            warn!(required, max, "move refused: no room on line");
            return Err(BufferError::NoRoomOnLine { required, max });
        }
        Ok(())
    }

    /// Allocates every line text and arena slot the insertion will use.
    fn prepare_insert(&mut self, segments: &[Vec<u8>], site: &InsertSite) -> Result<Prepared> {
        let oom = BufferError::out_of_memory;
        let mut prepared = Prepared::default();
        let head_len = match segments {
            [only] => site.used.max(site.col - 1) + only.len(),
            [first, ..] => site.col - 1 + significant_len(first),
            [] => 0,
        };

        if site.on_eop {
            prepared.realized = Some(LineText::with_len(head_len).map_err(oom("line text"))?);
        } else {
            self.lines[site.line]
                .text
                .ensure_len(head_len)
                .map_err(oom("line text"))?;
        }

        if let [_, middle @ .., last] = segments {
            prepared
                .middle
                .try_reserve_exact(middle.len())
                .map_err(oom("line text"))?;
            for segment in middle {
                let text = LineText::from_bytes(&segment[..significant_len(segment)])
                    .map_err(oom("line text"))?;
                prepared.middle.push(text);
            }
            if !site.keeps_last_on_eop(segments) {
                let tail = site.tail_len();
                let last_len = if tail > 0 {
                    last.len() + tail
                } else {
                    significant_len(last)
                };
                prepared.last = Some(LineText::with_len(last_len).map_err(oom("line text"))?);
            }
        }

        let new_lines = prepared.middle.len()
            + usize::from(prepared.last.is_some())
            + usize::from(site.on_eop);
        self.lines.try_reserve(new_lines).map_err(oom("lines"))?;
        self.groups
            .try_reserve(new_lines + 1)
            .map_err(oom("groups"))?;
        Ok(prepared)
    }

    /// Splices the segments in at `at`. Returns the positions just before
    /// and just after the inserted text.
    fn insert_segments(
        &mut self,
        at: Position,
        segments: &[Vec<u8>],
        mut prepared: Prepared,
    ) -> Result<(Position, Position)> {
        let Position { col, .. } = at;
        let max_col = self.max_col();
        let line = match prepared.realized.take() {
            Some(text) => self.realize_eop_with(at.line, text)?,
            None => at.line,
        };

        let (first, last) = match segments {
            [only] => {
                let width = only.len();
                self.marks_shift(line, col, max_col - col + 1, line, col + width);
                self.lines[line].text.insert(col, only, 1);
                self.screen_insert_chars(line, col, width);
                return Ok((Position::new(line, col), Position::new(line, col + width)));
            }
            [first, .., last] => (first, last),
            [] => return Ok((at, at)),
        };

        self.invalidate_view(self.line_frame(line));

        // Without a prepared last line the empty last segment stays on the
        // terminal line that follows the realized one.
        let tail = self.lines[line].text.tail(col);
        let last_text = prepared.last.take().map(|mut text| {
            if tail.is_empty() {
                let keep = significant_len(last);
                if keep > 0 {
                    text.overwrite(1, &last[..keep], 1);
                }
            } else {
                text.overwrite(1, last, 1);
                text.overwrite(last.len() + 1, tail, 1);
            }
            text
        });

        let head = &mut self.lines[line].text;
        head.truncate_at(col);
        let keep = significant_len(first);
        if keep > 0 {
            head.overwrite(col, &first[..keep], 1);
        }

        let next = self.next_linked(line);
        let stored = prepared.middle.len() + usize::from(last_text.is_some());
        let end_line = if stored == 0 {
            next
        } else {
            let ends_stored = last_text.is_some();
            let (first_new, last_new) = self.lines_create(stored)?;
            let mut slot = first_new;
            for text in prepared.middle.into_iter().chain(last_text) {
                self.lines[slot].text = text;
                slot = self.lines[slot].next.unwrap_or(slot);
            }
            if let Err(err) = self.lines_inject(first_new, last_new, next) {
                self.lines_destroy(first_new, last_new);
                return Err(err);
            }
            if ends_stored {
                last_new
            } else {
                next
            }
        };

        let end_col = (last.len() + 1).min(max_col);
        self.marks_shift(line, col, max_col - col + 1, end_line, end_col);
        Ok((Position::new(line, col), Position::new(end_line, end_col)))
    }
}

/// Repeats a snapshot `count` times, joining the last segment of each copy
/// with the first segment of the next. A single-line snapshot longer than
/// `max` once repeated is refused before it is built.
fn repeat_segments(segments: Vec<Vec<u8>>, count: usize, max: usize) -> Result<Vec<Vec<u8>>> {
    let oom = BufferError::out_of_memory;
    if count == 1 {
        return Ok(segments);
    }

    if let [only] = segments.as_slice() {
        let total = only.len().saturating_mul(count);
        if total > max {
            warn!(required = total, max, "move refused: no room on line");
            return Err(BufferError::NoRoomOnLine {
                required: total,
                max,
            });
        }
        let mut joined = Vec::new();
        joined.try_reserve_exact(total).map_err(oom("scratch text"))?;
        for _ in 0..count {
            joined.extend_from_slice(only);
        }
        return Ok(vec![joined]);
    }

    let k = segments.len();
    let mut out: Vec<Vec<u8>> = Vec::new();
    out.try_reserve_exact((k - 1) * count + 1)
        .map_err(oom("scratch text"))?;
    out.push(scratch(&[segments[0].as_slice()])?);
    for round in 0..count {
        for (i, segment) in segments.iter().enumerate().skip(1) {
            if i == k - 1 && round + 1 < count {
                out.push(scratch(&[segment.as_slice(), segments[0].as_slice()])?);
            } else {
                out.push(scratch(&[segment.as_slice()])?);
            }
        }
    }
    Ok(out)
}

fn scratch(parts: &[&[u8]]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(parts.iter().map(|p| p.len()).sum())
        .map_err(BufferError::out_of_memory("scratch text"))?;
    for part in parts {
        bytes.extend_from_slice(part);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrameId;
    use pretty_assertions::assert_eq;

    fn doc(contents: &[&str]) -> (TextBuffer, FrameId, Vec<LineId>) {
        let mut buf = TextBuffer::new();
        let frame = buf.create_frame().unwrap();
        let lines = load(&mut buf, frame, contents);
        (buf, frame, lines)
    }

    fn load(buf: &mut TextBuffer, frame: FrameId, contents: &[&str]) -> Vec<LineId> {
        let eop = buf.eop_line(frame);
        buf.load_lines(eop, contents).unwrap();
        let mut lines = Vec::new();
        let mut line = Some(buf.first_line(frame));
        while let Some(l) = line.filter(|&l| !buf.is_eop(l)) {
            lines.push(l);
            line = buf.next_line(l);
        }
        lines
    }

    fn mark_at(buf: &mut TextBuffer, line: LineId, col: usize) -> MarkId {
        let mut mark = None;
        buf.mark_create(line, col, &mut mark).unwrap();
        mark.unwrap()
    }

    fn text(buf: &TextBuffer, frame: FrameId) -> Vec<String> {
        buf.frame_lines(frame)
            .into_iter()
            .map(|l| String::from_utf8(l).unwrap())
            .collect()
    }

    fn where_is(buf: &TextBuffer, mark: Option<MarkId>) -> (usize, usize) {
        let pos = buf.mark_position(mark.unwrap());
        (buf.line_to_number(pos.line), pos.col)
    }

    /// Runs a move between marks created at the given (line index, col).
    fn run(
        buf: &mut TextBuffer,
        lines: &[LineId],
        copy: bool,
        count: usize,
        one: (usize, usize),
        two: (usize, usize),
        dst: (usize, usize),
    ) -> Result<(Option<MarkId>, Option<MarkId>)> {
        let one = mark_at(buf, lines[one.0], one.1);
        let two = mark_at(buf, lines[two.0], two.1);
        let dst = mark_at(buf, lines[dst.0], dst.1);
        let (mut start, mut end) = (None, None);
        buf.text_move(copy, count, one, two, dst, &mut start, &mut end)?;
        Ok((start, end))
    }

    #[test]
    fn test_copy_within_line() {
        let (mut buf, frame, lines) = doc(&["abcdef"]);
        let (start, end) = run(&mut buf, &lines, true, 1, (0, 2), (0, 4), (0, 6)).unwrap();
        assert_eq!(text(&buf, frame), vec!["abcdebcf"]);
        assert_eq!(where_is(&buf, start), (1, 6));
        assert_eq!(where_is(&buf, end), (1, 8));
        assert!(buf.is_modified(frame));
        buf.assert_consistent(frame);
    }

    #[test]
    fn test_copy_repeated() {
        let (mut buf, frame, lines) = doc(&["xy"]);
        let (_, end) = run(&mut buf, &lines, true, 3, (0, 1), (0, 3), (0, 3)).unwrap();
        assert_eq!(text(&buf, frame), vec!["xyxyxyxy"]);
        assert_eq!(where_is(&buf, end), (1, 9));
    }

    #[test]
    fn test_copy_into_own_range_reads_original() {
        let (mut buf, frame, lines) = doc(&["abcdef"]);
        run(&mut buf, &lines, true, 1, (0, 2), (0, 5), (0, 3)).unwrap();
        assert_eq!(text(&buf, frame), vec!["abbcdcdef"]);
    }

    #[test]
    fn test_transfer_within_line_forward_and_back() {
        let (mut buf, frame, lines) = doc(&["abcdef"]);
        let (start, end) = run(&mut buf, &lines, false, 1, (0, 2), (0, 4), (0, 6)).unwrap();
        assert_eq!(text(&buf, frame), vec!["adebcf"]);
        assert_eq!(where_is(&buf, start), (1, 4));
        assert_eq!(where_is(&buf, end), (1, 6));

        let (mut buf, frame, lines) = doc(&["abcdef"]);
        run(&mut buf, &lines, false, 1, (0, 4), (0, 6), (0, 1)).unwrap();
        assert_eq!(text(&buf, frame), vec!["deabcf"]);
        buf.assert_consistent(frame);
    }

    #[test]
    fn test_transfer_into_own_interior_fails() {
        let (mut buf, frame, lines) = doc(&["abcdef", "ghi"]);
        let err = run(&mut buf, &lines, false, 1, (0, 2), (1, 2), (0, 5));
        assert_eq!(err, Err(BufferError::DestinationInsideSource));
        assert_eq!(text(&buf, frame), vec!["abcdef", "ghi"]);
        assert!(!buf.is_modified(frame));
    }

    #[test]
    fn test_transfer_to_range_edges_is_allowed() {
        let (mut buf, frame, lines) = doc(&["abcdef"]);
        run(&mut buf, &lines, false, 1, (0, 2), (0, 4), (0, 4)).unwrap();
        assert_eq!(text(&buf, frame), vec!["abcdef"]);
        buf.assert_consistent(frame);
    }

    #[test]
    fn test_copy_across_lines() {
        let (mut buf, frame, lines) = doc(&["one two", "three", "four five", "XY"]);
        let (start, end) = run(&mut buf, &lines, true, 1, (0, 5), (2, 5), (3, 2)).unwrap();
        assert_eq!(
            text(&buf, frame),
            vec!["one two", "three", "four five", "Xtwo", "three", "fourY"]
        );
        assert_eq!(where_is(&buf, start), (4, 2));
        assert_eq!(where_is(&buf, end), (6, 5));
        buf.assert_consistent(frame);
    }

    #[test]
    fn test_transfer_whole_lines_down() {
        let (mut buf, frame, lines) = doc(&["a1", "b2", "c3", "d4"]);
        let dst = mark_at(&mut buf, lines[3], 1);
        let (mut start, mut end) = (None, None);
        let one = mark_at(&mut buf, lines[0], 1);
        let two = mark_at(&mut buf, lines[2], 1);
        buf.text_move(false, 1, one, two, dst, &mut start, &mut end)
            .unwrap();
        assert_eq!(text(&buf, frame), vec!["c3", "a1", "b2", "d4"]);
        assert_eq!(where_is(&buf, start), (2, 1));
        assert_eq!(where_is(&buf, end), (4, 1));
        assert_eq!(where_is(&buf, Some(dst)), (4, 1));
        buf.assert_consistent(frame);
    }

    #[test]
    fn test_copy_repeated_lines_onto_terminal_line() {
        let (mut buf, frame, lines) = doc(&["ab", "cd"]);
        let one = mark_at(&mut buf, lines[0], 2);
        let two = mark_at(&mut buf, lines[1], 2);
        let dot = buf.dot(frame);
        let (mut start, mut end) = (None, None);
        buf.text_move(true, 2, one, two, dot, &mut start, &mut end)
            .unwrap();
        assert_eq!(text(&buf, frame), vec!["ab", "cd", "b", "cb", "c"]);
        assert_eq!(buf.line_count(frame), 6);
        assert_eq!(where_is(&buf, end), (5, 2));
        buf.assert_consistent(frame);
    }

    #[test]
    fn test_transfer_between_frames() {
        let (mut buf, source, lines) = doc(&["hello world"]);
        let target = buf.create_frame().unwrap();
        let target_lines = load(&mut buf, target, &["there"]);

        let one = mark_at(&mut buf, lines[0], 1);
        let two = mark_at(&mut buf, lines[0], 7);
        let dst = mark_at(&mut buf, target_lines[0], 1);
        let (mut start, mut end) = (None, None);
        buf.text_move(false, 1, one, two, dst, &mut start, &mut end)
            .unwrap();

        assert_eq!(text(&buf, source), vec!["world"]);
        assert_eq!(text(&buf, target), vec!["hello there"]);
        assert!(buf.is_modified(source));
        assert!(buf.is_modified(target));
        buf.assert_consistent(source);
        buf.assert_consistent(target);
    }

    #[test]
    fn test_zero_count_places_marks_only() {
        let (mut buf, frame, lines) = doc(&["abc"]);
        let (start, end) = run(&mut buf, &lines, true, 0, (0, 1), (0, 3), (0, 2)).unwrap();
        assert_eq!(where_is(&buf, start), (1, 2));
        assert_eq!(where_is(&buf, end), (1, 2));
        assert!(!buf.is_modified(frame));
    }

    #[test]
    fn test_copy_too_long_changes_nothing() {
        let wide = "w".repeat(300);
        let (mut buf, frame, lines) = doc(&[&wide, "short"]);
        let err = run(&mut buf, &lines, true, 1, (0, 1), (0, 301), (0, 1));
        assert_eq!(err, Err(BufferError::NoRoomOnLine { required: 600, max: 400 }));
        assert_eq!(buf.line_count(frame), 3);
        assert!(!buf.is_modified(frame));
    }

    #[test]
    fn test_transfer_too_long_changes_nothing() {
        let left = "l".repeat(250);
        let right = "r".repeat(300);
        let (mut buf, frame, lines) = doc(&[&left, "middle", &right]);
        let err = run(&mut buf, &lines, false, 1, (0, 200), (2, 50), (0, 1));
        assert!(matches!(err, Err(BufferError::NoRoomOnLine { .. })));
        assert_eq!(buf.line_count(frame), 4);
        assert_eq!(buf.line_used(lines[1]), 6);
        assert!(!buf.is_modified(frame));
    }

    #[test]
    fn test_copy_whole_lines_to_terminal_line() {
        let (mut buf, frame, lines) = doc(&["ab", "cd"]);
        let one = mark_at(&mut buf, lines[0], 1);
        let two = mark_at(&mut buf, lines[1], 1);
        let dot = buf.dot(frame);
        let (mut start, mut end) = (None, None);
        buf.text_move(true, 1, one, two, dot, &mut start, &mut end)
            .unwrap();

        assert_eq!(text(&buf, frame), vec!["ab", "cd", "ab"]);
        assert_eq!(buf.line_count(frame), 4);
        assert_eq!(where_is(&buf, start), (3, 1));
        assert_eq!(where_is(&buf, end), (4, 1));
        assert!(buf.is_eop(buf.mark_line(dot)));
        assert_eq!(buf.mark_col(dot), 1);
        buf.assert_consistent(frame);
    }

    #[test]
    fn test_transfer_whole_lines_to_terminal_line() {
        let (mut buf, frame, lines) = doc(&["ab", "cd"]);
        let one = mark_at(&mut buf, lines[0], 1);
        let two = mark_at(&mut buf, lines[1], 1);
        let dot = buf.dot(frame);
        let (mut start, mut end) = (None, None);
        buf.text_move(false, 1, one, two, dot, &mut start, &mut end)
            .unwrap();

        assert_eq!(text(&buf, frame), vec!["cd", "ab"]);
        assert_eq!(buf.line_count(frame), 3);
        assert_eq!(where_is(&buf, start), (2, 1));
        assert_eq!(where_is(&buf, end), (3, 1));
        buf.assert_consistent(frame);
    }

    #[test]
    fn test_copy_repeated_whole_lines_to_terminal_line() {
        let (mut buf, frame, lines) = doc(&["ab"]);
        let one = mark_at(&mut buf, lines[0], 1);
        let dot = buf.dot(frame);
        let eop = buf.eop_line(frame);
        let two = mark_at(&mut buf, eop, 1);
        let (mut start, mut end) = (None, None);
        buf.text_move(true, 2, one, two, dot, &mut start, &mut end)
            .unwrap();

        assert_eq!(text(&buf, frame), vec!["ab", "ab", "ab"]);
        assert_eq!(where_is(&buf, end), (4, 1));
        buf.assert_consistent(frame);
    }

    #[test]
    fn test_transfer_range_ending_on_terminal_line_to_terminal_line() {
        let (mut buf, frame, lines) = doc(&["abcd", "ef"]);
        let one = mark_at(&mut buf, lines[0], 3);
        let eop = buf.eop_line(frame);
        let two = mark_at(&mut buf, eop, 1);
        let dot = buf.dot(frame);
        let (mut start, mut end) = (None, None);
        buf.text_move(false, 1, one, two, dot, &mut start, &mut end)
            .unwrap();

        assert_eq!(text(&buf, frame), vec!["ab", "cd", "ef"]);
        assert_eq!(where_is(&buf, start), (2, 1));
        assert_eq!(where_is(&buf, end), (4, 1));
        buf.assert_consistent(frame);
    }

    #[test]
    fn test_transfer_range_ending_on_terminal_line_to_line_start() {
        let (mut buf, frame, lines) = doc(&["abcd", "ef"]);
        let one = mark_at(&mut buf, lines[0], 3);
        let eop = buf.eop_line(frame);
        let two = mark_at(&mut buf, eop, 1);
        let dst = mark_at(&mut buf, lines[0], 1);
        let (mut start, mut end) = (None, None);
        buf.text_move(false, 1, one, two, dst, &mut start, &mut end)
            .unwrap();

        assert_eq!(text(&buf, frame), vec!["cd", "ef", "ab"]);
        assert_eq!(buf.line_count(frame), 4);
        assert_eq!(where_is(&buf, start), (1, 1));
        assert_eq!(where_is(&buf, end), (3, 1));
        assert_eq!(where_is(&buf, Some(dst)), (3, 1));
        buf.assert_consistent(frame);
    }
}
