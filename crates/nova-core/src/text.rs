//! Text model primitives.

pub use text_size::{TextRange, TextSize};

/// Smallest range containing both `start` and `end`.
///
/// Used for diagnostics that span from one node to another, e.g. from a
/// modifier list to the end of a method declaration.
#[inline]
pub fn cover(start: TextRange, end: TextRange) -> TextRange {
    start.cover(end)
}
