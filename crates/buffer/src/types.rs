// Chunk: docs/chunks/text_buffer - Handle aliases and shared value types

use crate::arena::Handle;
use crate::frame::Frame;
use crate::line_store::{Group, Line};
use crate::marks::Mark;

/// Handle of a line, stored or terminal.
pub type LineId = Handle<Line>;
/// Handle of a group of consecutive lines.
pub type GroupId = Handle<Group>;
/// Handle of a mark.
pub type MarkId = Handle<Mark>;
/// Handle of a frame (one document).
pub type FrameId = Handle<Frame>;

/// Position in a document as (line, column). Columns are 1-based; a position
/// may lie past the significant end of its line, up to `max_line_len + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: LineId,
    pub col: usize,
}

impl Position {
    pub fn new(line: LineId, col: usize) -> Self {
        Self { line, col }
    }
}

/// The always-available marks a frame maintains besides its caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialMark {
    /// Split point left behind by the last `split_line` that asked for it.
    Equals,
    /// End of the most recent successful mutation.
    Modified,
}
