// Chunk: docs/chunks/line_store - Grouped line chain with absolute line numbers

//! The line/group store.
//!
//! A document is one doubly linked chain of [`Line`]s. The chain is cut into
//! [`Group`]s of at most `group_capacity` consecutive lines; each group caches
//! the absolute number of its first line and how many lines it holds, so a
//! line's number is its group's first number plus its offset inside the group.
//!
//! The last line of every document is the terminal line: it has no forward
//! link, holds no text and stands for end-of-document. Text cannot be put on
//! it directly; it is first realized into a stored line with a fresh terminal
//! line after it.
//!
//! Groups split evenly when an injection overflows them, vanish when an
//! extraction empties them, and merge with their neighbour when an extraction
//! leaves two adjacent groups that fit in one.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{BufferError, Result};
use crate::line_text::{significant_len, LineText};
use crate::text_buffer::TextBuffer;
use crate::types::{FrameId, GroupId, LineId, MarkId};

/// One line of a document.
#[derive(Debug)]
pub struct Line {
    /// Owning group; `None` while the line is not linked into a document.
    pub(crate) group: Option<GroupId>,
    /// 0-based position inside the owning group.
    pub(crate) offset: usize,
    pub(crate) prev: Option<LineId>,
    pub(crate) next: Option<LineId>,
    /// Marks positioned on this line, unordered.
    pub(crate) marks: SmallVec<[MarkId; 4]>,
    pub(crate) text: LineText,
    /// Screen row the line is shown on, if any.
    pub(crate) screen_row: Option<u16>,
}

impl Line {
    fn unlinked(text: LineText) -> Self {
        Self {
            group: None,
            offset: 0,
            prev: None,
            next: None,
            marks: SmallVec::new(),
            text,
            screen_row: None,
        }
    }

    pub fn text(&self) -> &LineText {
        &self.text
    }
}

/// A run of consecutive lines with a cached absolute line number.
#[derive(Debug)]
pub struct Group {
    pub(crate) frame: FrameId,
    pub(crate) first_line: LineId,
    pub(crate) last_line: LineId,
    /// Absolute 1-based number of `first_line`.
    pub(crate) first_line_nr: usize,
    pub(crate) nr_lines: usize,
    pub(crate) prev: Option<GroupId>,
    pub(crate) next: Option<GroupId>,
}

impl TextBuffer {
    // ==================== Allocation ====================

    /// Allocates `n` blank lines chained to each other but not linked into
    /// any document. Returns the first and last of the run.
    ///
    /// `n` must be at least one; debug builds check it.
    pub fn lines_create(&mut self, n: usize) -> Result<(LineId, LineId)> {
        debug_assert!(n > 0, "lines_create needs at least one line");
        self.lines
            .try_reserve(n)
            .map_err(BufferError::out_of_memory("lines"))?;

        let first = self.lines.insert(Line::unlinked(LineText::new()));
        let mut last = first;
        for _ in 1..n {
            let line = self.lines.insert(Line {
                prev: Some(last),
                ..Line::unlinked(LineText::new())
            });
            self.lines[last].next = Some(line);
            last = line;
        }
        trace!(n, "created lines");
        Ok((first, last))
    }

    /// Frees an unlinked run of lines. The run must carry no marks.
    pub fn lines_destroy(&mut self, first: LineId, last: LineId) {
        let mut cursor = first;
        loop {
            let Some(line) = self.lines.remove(cursor) else {
                panic!("destroying stale line {cursor:?}");
            };
            debug_assert!(line.group.is_none(), "destroying a linked line");
            debug_assert!(line.marks.is_empty(), "destroying a line that carries marks");
            if cursor == last {
                break;
            }
            match line.next {
                Some(next) => cursor = next,
                None => panic!("run ends before {last:?}"),
            }
        }
    }

    // ==================== Splicing ====================

    /// Links the unlinked run `first..=last` into the document immediately
    /// before `before`.
    ///
    /// The run joins `before`'s group; if that overflows the group it is split
    /// into evenly sized groups. Line numbers of everything after the run are
    /// corrected.
    pub fn lines_inject(&mut self, first: LineId, last: LineId, before: LineId) -> Result<()> {
        let group = self.owning_group(before);
        let n = self.run_len(first, last);
        let total = self.groups[group].nr_lines + n;
        let extra_groups = total.div_ceil(self.config.group_capacity) - 1;
        self.groups
            .try_reserve(extra_groups)
            .map_err(BufferError::out_of_memory("groups"))?;

        let prev = self.lines[before].prev;
        self.lines[first].prev = prev;
        if let Some(prev) = prev {
            self.lines[prev].next = Some(first);
        }
        self.lines[last].next = Some(before);
        self.lines[before].prev = Some(last);

        if self.groups[group].first_line == before {
            self.groups[group].first_line = first;
        }
        self.groups[group].nr_lines = total;
        self.renumber_group(group);
        if total > self.config.group_capacity {
            self.split_group(group);
        }
        self.renumber_groups_from(group);

        trace!(n, "injected lines");
        self.screen_lines_injected(first, last, n);
        Ok(())
    }

    /// Unlinks the run `first..=last` from its document without freeing it.
    ///
    /// Emptied groups are deleted; the groups left on either side of the gap
    /// are merged when they fit in one group. The terminal line cannot be
    /// extracted.
    pub fn lines_extract(&mut self, first: LineId, last: LineId) {
        let first_group = self.owning_group(first);
        let last_group = self.owning_group(last);
        let frame = self.groups[first_group].frame;
        let prev = self.lines[first].prev;
        let Some(next) = self.lines[last].next else {
            panic!("cannot extract the end-of-document line");
        };

        let vacated = self.screen_unmap_run(first, last);

        let mut cursor = first;
        let mut n = 0;
        loop {
            let group = self.owning_group(cursor);
            self.lines[cursor].group = None;
            self.groups[group].nr_lines -= 1;
            n += 1;
            if cursor == last {
                break;
            }
            cursor = self.next_linked(cursor);
        }

        if let Some(prev) = prev {
            self.lines[prev].next = Some(next);
        }
        self.lines[next].prev = prev;
        self.lines[first].prev = None;
        self.lines[last].next = None;

        // Every group between the first and last touched one is now empty.
        let mut cursor = Some(first_group);
        while let Some(group) = cursor {
            let following = self.groups[group].next;
            if self.groups[group].nr_lines == 0 {
                self.group_delete(group);
            } else {
                let (head, tail) = (self.groups[group].first_line, self.groups[group].last_line);
                if self.lines[head].group.is_none() {
                    self.groups[group].first_line = next;
                }
                if self.lines[tail].group.is_none() {
                    if let Some(prev) = prev {
                        self.groups[group].last_line = prev;
                    }
                }
                self.renumber_group(group);
            }
            if group == last_group {
                break;
            }
            cursor = following;
        }

        let left = prev.map(|line| self.owning_group(line));
        let right = self.owning_group(next);
        if let Some(left) = left {
            let combined = self.groups[left].nr_lines + self.groups[right].nr_lines;
            if left != right && combined <= self.config.group_capacity {
                self.merge_groups(left, right);
            }
        }

        let start = match left {
            Some(group) => group,
            None => {
                let group = self.frames[frame].first_group;
                self.groups[group].first_line_nr = 1;
                group
            }
        };
        self.renumber_groups_from(start);

        trace!(n, "extracted lines");
        if let Some((row, count)) = vacated {
            self.screen_lines_extracted(next, row, count);
        }
    }

    // ==================== Storage ====================

    /// Resizes a line's storage, keeping the bytes of the first
    /// `min(old, new_len)` columns.
    pub fn line_change_length(&mut self, line: LineId, new_len: usize) -> Result<()> {
        let max = self.config.max_line_len;
        if new_len > max {
            return Err(BufferError::NoRoomOnLine {
                required: new_len,
                max,
            });
        }
        self.lines[line]
            .text
            .set_len(new_len)
            .map_err(BufferError::out_of_memory("line text"))
    }

    // ==================== Terminal line ====================

    /// Builds the terminal line and first group of the frame that will be
    /// stored under `frame`.
    pub(crate) fn line_eop_create(&mut self, frame: FrameId) -> Result<(GroupId, LineId)> {
        self.lines
            .try_reserve(1)
            .map_err(BufferError::out_of_memory("lines"))?;
        self.groups
            .try_reserve(1)
            .map_err(BufferError::out_of_memory("groups"))?;

        let line = self.lines.insert(Line::unlinked(LineText::new()));
        let group = self.groups.insert(Group {
            frame,
            first_line: line,
            last_line: line,
            first_line_nr: 1,
            nr_lines: 1,
            prev: None,
            next: None,
        });
        self.lines[line].group = Some(group);
        Ok((group, line))
    }

    /// Frees the terminal line and its group. The frame must hold no other
    /// lines and no marks may remain on the terminal line.
    pub(crate) fn line_eop_destroy(&mut self, frame: FrameId) {
        let eop = self.frames[frame].eop_line;
        let group = self.owning_group(eop);
        debug_assert_eq!(self.groups[group].nr_lines, 1, "frame still holds lines");
        debug_assert!(self.lines[eop].marks.is_empty(), "terminal line carries marks");
        self.groups.remove(group);
        self.lines.remove(eop);
    }

    /// Turns the terminal line into a stored line with `capacity` columns
    /// allocated, leaving a fresh terminal line after it.
    ///
    /// Marks on the terminal line move to the realized line, keeping their
    /// columns. Returns the realized line.
    pub fn realize_eop(&mut self, eop: LineId, capacity: usize) -> Result<LineId> {
        let text =
            LineText::with_len(capacity).map_err(BufferError::out_of_memory("line text"))?;
        self.realize_eop_with(eop, text)
    }

    /// [`TextBuffer::realize_eop`] with storage prepared by the caller.
    pub(crate) fn realize_eop_with(&mut self, eop: LineId, text: LineText) -> Result<LineId> {
        debug_assert!(self.is_eop(eop), "realizing a line that is not terminal");
        self.lines
            .try_reserve(1)
            .map_err(BufferError::out_of_memory("lines"))?;
        let line = self.lines.insert(Line::unlinked(text));
        if let Err(err) = self.lines_inject(line, line, eop) {
            self.lines.remove(line);
            return Err(err);
        }

        let marks = std::mem::take(&mut self.lines[eop].marks);
        for &mark in &marks {
            self.marks[mark].line = line;
        }
        self.lines[line].marks = marks;

        debug!(line = ?line, "realized end-of-document line");
        Ok(line)
    }

    // ==================== Loading ====================

    /// Creates one stored line per entry of `contents` and links them before
    /// `before`. Returns the first and last new line, or `None` when
    /// `contents` is empty.
    ///
    /// Fails without allocating if any entry is longer than the maximum line
    /// length once trailing blanks are dropped.
    pub fn load_lines<T: AsRef<[u8]>>(
        &mut self,
        before: LineId,
        contents: &[T],
    ) -> Result<Option<(LineId, LineId)>> {
        if contents.is_empty() {
            return Ok(None);
        }
        let max = self.config.max_line_len;
        if let Some(required) = contents
            .iter()
            .map(|text| significant_len(text.as_ref()))
            .find(|&used| used > max)
        {
            return Err(BufferError::NoRoomOnLine { required, max });
        }

        let mut texts = Vec::new();
        texts
            .try_reserve_exact(contents.len())
            .map_err(BufferError::out_of_memory("line list"))?;
        for text in contents {
            let text = text.as_ref();
            let stored = LineText::from_bytes(&text[..significant_len(text)])
                .map_err(BufferError::out_of_memory("line text"))?;
            texts.push(stored);
        }

        let (first, last) = self.lines_create(contents.len())?;
        let mut cursor = first;
        for text in texts {
            self.lines[cursor].text = text;
            if let Some(next) = self.lines[cursor].next {
                cursor = next;
            }
        }
        if let Err(err) = self.lines_inject(first, last, before) {
            self.lines_destroy(first, last);
            return Err(err);
        }
        debug!(lines = contents.len(), "loaded lines");
        Ok(Some((first, last)))
    }

    // ==================== Numbering ====================

    /// Returns the absolute 1-based number of a linked line.
    pub fn line_to_number(&self, line: LineId) -> usize {
        let group = self.owning_group(line);
        self.groups[group].first_line_nr + self.lines[line].offset
    }

    /// Returns the line numbered `number` in `frame`, counting the terminal
    /// line. Walks groups, then at most one group's lines.
    pub fn line_from_number(&self, frame: FrameId, number: usize) -> Option<LineId> {
        let mut cursor = Some(self.frames[frame].first_group);
        while let Some(group) = cursor {
            let g = &self.groups[group];
            if number >= g.first_line_nr && number < g.first_line_nr + g.nr_lines {
                let mut line = g.first_line;
                for _ in 0..number - g.first_line_nr {
                    line = self.next_linked(line);
                }
                return Some(line);
            }
            cursor = g.next;
        }
        None
    }

    // ==================== Queries ====================

    /// Returns the number of lines in `frame`, the terminal line included.
    pub fn line_count(&self, frame: FrameId) -> usize {
        let last = &self.groups[self.frames[frame].last_group];
        last.first_line_nr + last.nr_lines - 1
    }

    /// Returns the number of groups `frame` is currently cut into.
    pub fn group_count(&self, frame: FrameId) -> usize {
        let mut count = 0;
        let mut cursor = Some(self.frames[frame].first_group);
        while let Some(group) = cursor {
            count += 1;
            cursor = self.groups[group].next;
        }
        count
    }

    /// Returns the first line of `frame`; the terminal line when it is empty.
    pub fn first_line(&self, frame: FrameId) -> LineId {
        self.groups[self.frames[frame].first_group].first_line
    }

    /// Returns the terminal line of `frame`.
    pub fn eop_line(&self, frame: FrameId) -> LineId {
        self.frames[frame].eop_line
    }

    /// Returns the line after `line`, or `None` for a terminal line.
    pub fn next_line(&self, line: LineId) -> Option<LineId> {
        self.lines[line].next
    }

    /// Returns the line before `line`, or `None` for the first line.
    pub fn prev_line(&self, line: LineId) -> Option<LineId> {
        self.lines[line].prev
    }

    /// Returns the significant bytes of a line.
    pub fn line_text(&self, line: LineId) -> &[u8] {
        self.lines[line].text.as_bytes()
    }

    /// Returns the significant length of `line`: trailing blanks are not counted.
    pub fn line_used(&self, line: LineId) -> usize {
        self.lines[line].text.used()
    }

    /// Returns the allocated length of a line.
    pub fn line_len(&self, line: LineId) -> usize {
        self.lines[line].text.len()
    }

    /// Returns the frame a linked line belongs to.
    pub fn line_frame(&self, line: LineId) -> FrameId {
        self.groups[self.owning_group(line)].frame
    }

    /// Returns true for a linked line with no successor.
    pub fn is_eop(&self, line: LineId) -> bool {
        let line = &self.lines[line];
        line.group.is_some() && line.next.is_none()
    }

    /// Returns false once `line` has been destroyed.
    pub fn line_is_live(&self, line: LineId) -> bool {
        self.lines.contains(line)
    }

    /// Returns a copy of every stored line of `frame`, terminal line excluded.
    pub fn frame_lines(&self, frame: FrameId) -> Vec<Vec<u8>> {
        let mut out = Vec::with_capacity(self.line_count(frame) - 1);
        let mut cursor = self.first_line(frame);
        while let Some(next) = self.lines[cursor].next {
            out.push(self.lines[cursor].text.as_bytes().to_vec());
            cursor = next;
        }
        out
    }

    // ==================== Internals ====================

    pub(crate) fn owning_group(&self, line: LineId) -> GroupId {
        match self.lines[line].group {
            Some(group) => group,
            None => panic!("line {line:?} is not linked into a document"),
        }
    }

    /// Successor of a line that is known not to be the last of its chain.
    pub(crate) fn next_linked(&self, line: LineId) -> LineId {
        match self.lines[line].next {
            Some(next) => next,
            None => panic!("line chain ends early at {line:?}"),
        }
    }

    fn run_len(&self, first: LineId, last: LineId) -> usize {
        let mut n = 1;
        let mut cursor = first;
        while cursor != last {
            cursor = self.next_linked(cursor);
            n += 1;
        }
        n
    }

    /// Resets group membership and offsets of every line in `group`.
    fn renumber_group(&mut self, group: GroupId) {
        let last = self.groups[group].last_line;
        let mut cursor = self.groups[group].first_line;
        let mut offset = 0;
        loop {
            let line = &mut self.lines[cursor];
            line.group = Some(group);
            line.offset = offset;
            offset += 1;
            if cursor == last {
                break;
            }
            cursor = self.next_linked(cursor);
        }
        debug_assert_eq!(offset, self.groups[group].nr_lines, "group count drift");
    }

    /// Recomputes first-line numbers of every group after `group`.
    fn renumber_groups_from(&mut self, group: GroupId) {
        let mut number = self.groups[group].first_line_nr + self.groups[group].nr_lines;
        let mut cursor = self.groups[group].next;
        while let Some(next) = cursor {
            let g = &mut self.groups[next];
            g.first_line_nr = number;
            number += g.nr_lines;
            cursor = g.next;
        }
    }

    /// Cuts an overfull group into evenly sized groups. Group slots must
    /// already be reserved.
    fn split_group(&mut self, group: GroupId) {
        let total = self.groups[group].nr_lines;
        let pieces = total.div_ceil(self.config.group_capacity);
        let (base, extra) = (total / pieces, total % pieces);
        let frame = self.groups[group].frame;
        let old_last = self.groups[group].last_line;

        let mut current = group;
        let mut start = self.groups[group].first_line;
        for piece in 0..pieces {
            let size = base + usize::from(piece < extra);
            let mut end = start;
            for _ in 1..size {
                end = self.next_linked(end);
            }

            if piece > 0 {
                let after = self.groups[current].next;
                let number = self.groups[current].first_line_nr + self.groups[current].nr_lines;
                let fresh = self.groups.insert(Group {
                    frame,
                    first_line: start,
                    last_line: end,
                    first_line_nr: number,
                    nr_lines: size,
                    prev: Some(current),
                    next: after,
                });
                self.groups[current].next = Some(fresh);
                match after {
                    Some(after) => self.groups[after].prev = Some(fresh),
                    None => self.frames[frame].last_group = fresh,
                }
                current = fresh;
            } else {
                self.groups[group].last_line = end;
                self.groups[group].nr_lines = size;
            }
            self.renumber_group(current);

            if end == old_last {
                break;
            }
            start = self.next_linked(end);
        }
        debug!(group = ?group, lines = total, pieces, "split group");
    }

    /// Moves every line of `right` onto the end of `left`, its predecessor,
    /// and deletes `right`.
    fn merge_groups(&mut self, left: GroupId, right: GroupId) {
        debug_assert_eq!(self.groups[left].next, Some(right));
        let moved = self.groups[right].nr_lines;
        self.groups[left].last_line = self.groups[right].last_line;
        self.groups[left].nr_lines += moved;
        self.groups[right].nr_lines = 0;
        self.renumber_group(left);
        self.group_delete(right);
        debug!(group = ?left, moved, "merged groups");
    }

    /// Unlinks and frees a group whose lines have already been rehomed.
    fn group_delete(&mut self, group: GroupId) {
        let Some(g) = self.groups.remove(group) else {
            panic!("deleting stale group {group:?}");
        };
        match g.prev {
            Some(prev) => self.groups[prev].next = g.next,
            None => {
                if let Some(next) = g.next {
                    self.frames[g.frame].first_group = next;
                }
            }
        }
        match g.next {
            Some(next) => self.groups[next].prev = g.prev,
            None => {
                if let Some(prev) = g.prev {
                    self.frames[g.frame].last_group = prev;
                }
            }
        }
    }
}
