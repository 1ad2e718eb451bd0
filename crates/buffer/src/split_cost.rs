// Chunk: docs/chunks/split_cost - Pure cost model for choosing a line-split strategy

//! Choosing how to split a line.
//!
//! A split can leave the original line holding the prefix and move the
//! suffix to a new line below it, or move the prefix to a new line above it
//! and slide the remaining suffix to its new column. Both give the same
//! document; they differ in how much is copied and, on screen, in how many
//! terminal operations it takes to show the result.
//!
//! The estimate is a pure function of the split geometry so the choice can be
//! tested apart from the mutation.

use crate::display::DisplayCaps;

/// How a line split is applied to the existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Keep the prefix in place; the suffix goes to a new line below.
    MoveSuffix,
    /// The prefix goes to a new line above; the suffix slides to its new
    /// column on the original line.
    MovePrefix,
}

/// Where the split line sits on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    /// Horizontal screen offset of the frame.
    pub offset: usize,
    pub caps: DisplayCaps,
    /// Rows from the split line to the bottom of the surface.
    pub rows_below: u16,
}

/// Everything the split-cost estimate needs to know about one split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitCostInputs {
    /// Column the line is split before.
    pub before_col: usize,
    /// Significant length of the line.
    pub used: usize,
    /// Column the suffix starts at on the second line.
    pub new_col: usize,
    /// Present when the line is on screen.
    pub screen: Option<ScreenGeometry>,
}

impl SplitCostInputs {
    fn prefix_len(&self) -> usize {
        (self.before_col - 1).min(self.used)
    }

    fn suffix_len(&self) -> usize {
        self.used.saturating_sub(self.before_col - 1)
    }
}

/// Estimates the work `strategy` needs: bytes moved off screen, terminal
/// operations and drawn cells on screen.
pub fn estimate_split_cost(strategy: SplitStrategy, inputs: &SplitCostInputs) -> usize {
    let prefix = inputs.prefix_len();
    let suffix = inputs.suffix_len();
    let slides = suffix > 0 && inputs.new_col != inputs.before_col;

    let Some(screen) = inputs.screen else {
        return match strategy {
            SplitStrategy::MoveSuffix => suffix,
            SplitStrategy::MovePrefix => prefix + if slides { suffix } else { 0 },
        };
    };

    let width = usize::from(screen.caps.width);
    let visible = |from_col: usize, len: usize| -> usize {
        let start = from_col.max(screen.offset + 1);
        let end = (from_col + len).min(screen.offset + width + 1);
        end.saturating_sub(start)
    };
    let open_line = if screen.caps.insert_line {
        1
    } else {
        usize::from(screen.rows_below) * width
    };

    match strategy {
        // Clear the tail of the first row, draw the suffix on the new row.
        SplitStrategy::MoveSuffix => open_line + 1 + visible(inputs.new_col, suffix),
        SplitStrategy::MovePrefix => {
            let slide = if !slides {
                0
            } else if inputs.new_col < inputs.before_col && screen.caps.delete_char {
                1
            } else if inputs.new_col > inputs.before_col && screen.caps.insert_char {
                1
            } else {
                visible(inputs.new_col, suffix)
            };
            open_line + visible(1, prefix) + slide
        }
    }
}

/// Picks the cheaper strategy; ties keep the prefix in place.
pub fn choose_split_strategy(inputs: &SplitCostInputs) -> SplitStrategy {
    let suffix = estimate_split_cost(SplitStrategy::MoveSuffix, inputs);
    let prefix = estimate_split_cost(SplitStrategy::MovePrefix, inputs);
    if prefix < suffix {
        SplitStrategy::MovePrefix
    } else {
        SplitStrategy::MoveSuffix
    }
}
