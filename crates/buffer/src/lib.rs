// Chunk: docs/chunks/text_buffer - Buffer engine for a screen-oriented editor
// Chunk: docs/chunks/line_store - Grouped line chain with absolute line numbers

//! screen-edit-buffer: the buffer engine of a screen-oriented text editor.
//!
//! Documents are held as chains of fixed-width lines, partitioned into
//! groups so line numbers can be computed without walking the whole chain.
//! Positions are expressed as marks that follow the text through every edit.
//!
//! # Overview
//!
//! The main type is [`TextBuffer`], which owns:
//! - Frames, one per open document, each ending in a terminal line
//! - Lines and the groups that number them
//! - Marks, including each frame's dot and its special marks
//! - An optional [`DisplaySurface`] kept in sync with on-screen lines
//!
//! # Example
//!
//! ```
//! use screen_edit_buffer::TextBuffer;
//!
//! let mut buffer = TextBuffer::new();
//! let frame = buffer.create_frame().unwrap();
//! let eop = buffer.eop_line(frame);
//! buffer.load_lines(eop, &["Hello, world!"]).unwrap();
//!
//! let line = buffer.first_line(frame);
//! let mut at = None;
//! buffer.mark_create(line, 6, &mut at).unwrap();
//! buffer.split_line(at.unwrap(), 1, None).unwrap();
//!
//! assert_eq!(buffer.line_count(frame), 3);
//! assert_eq!(buffer.frame_lines(frame), vec![b"Hello".to_vec(), b", world!".to_vec()]);
//! ```
//!
//! # Failure
//!
//! Every primitive either succeeds completely or returns a [`BufferError`]
//! with the document and all marks unchanged. Violated preconditions, such
//! as a stale handle or a reversed range, panic instead.

mod arena;
mod config;
mod display;
mod error;
mod frame;
mod line_store;
mod line_text;
mod marks;
mod split_cost;
mod split_line;
mod text_buffer;
mod text_move;
mod types;

pub use arena::{Arena, Handle};
pub use config::{
    BufferConfig, DEFAULT_GROUP_CAPACITY, DEFAULT_MARK_POOL_BATCH, DEFAULT_MAX_LINE_LEN,
};
pub use display::{DisplayCaps, DisplaySurface};
pub use error::{BufferError, ConfigError, Result};
pub use frame::Frame;
pub use line_store::{Group, Line};
pub use line_text::{significant_len, LineText, BLANK};
pub use marks::Mark;
pub use split_cost::{
    choose_split_strategy, estimate_split_cost, ScreenGeometry, SplitCostInputs, SplitStrategy,
};
pub use text_buffer::TextBuffer;
pub use types::{FrameId, GroupId, LineId, MarkId, Position, SpecialMark};
