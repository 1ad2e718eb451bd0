// Chunk: docs/chunks/buffer_errors - Typed failures for every primitive

//! Error types for buffer primitives and configuration.
//!
//! Every primitive either succeeds completely or returns one of these errors
//! without having mutated the document. Caller contract violations (stale
//! handles, mixing documents) are not represented here; they are asserted.

use std::collections::TryReserveError;

use thiserror::Error;

/// Failure of a buffer primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A line or scratch buffer would exceed the maximum line length.
    #[error("no room on line: {required} columns needed, maximum is {max}")]
    NoRoomOnLine { required: usize, max: usize },

    /// Line, group, mark or scratch storage could not be allocated.
    #[error("out of memory allocating {what}")]
    OutOfMemory {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    /// The terminal end-of-document line cannot be split.
    #[error("cannot split the end-of-document line")]
    AtEndOfDocument,

    /// A transfer was asked to land inside the range it removes.
    #[error("destination lies inside the range being moved")]
    DestinationInsideSource,

    #[error("invalid margins: left {left}, right {right}")]
    InvalidMargins { left: usize, right: usize },
}

impl BufferError {
    /// Adapter for `map_err` on fallible reservations.
    pub(crate) fn out_of_memory(what: &'static str) -> impl FnOnce(TryReserveError) -> Self {
        move |source| Self::OutOfMemory { what, source }
    }
}

/// Rejected configuration value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: usize,
        value: usize,
    },

    #[error("margins must satisfy 1 <= left < right <= max_line_len, got {left}..{right}")]
    Margins { left: usize, right: usize },

    #[error("environment variable {name} is not a number: {value:?}")]
    NotANumber { name: String, value: String },
}

pub type Result<T> = std::result::Result<T, BufferError>;
