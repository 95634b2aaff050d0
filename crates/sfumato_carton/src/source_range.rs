//! Byte spans shared by every layer of the pipeline.

use serde::{Deserialize, Serialize};

/// Source range in a document.
///
/// Offsets are UTF-8 byte offsets. The range is half-open: `start` is the
/// first byte inside, `end` is the first byte after.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    /// Start byte offset
    pub start: u32,
    /// End byte offset
    pub end: u32,
}

impl SourceRange {
    /// Create a new source range.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Create a range from `usize` offsets, saturating at `u32::MAX`.
    #[inline]
    pub fn from_usize(start: usize, end: usize) -> Self {
        Self {
            start: u32::try_from(start).unwrap_or(u32::MAX),
            end: u32::try_from(end).unwrap_or(u32::MAX),
        }
    }

    /// Create an empty range anchored at `offset`.
    #[inline]
    pub const fn empty(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Check if this range contains the given offset (end excluded).
    #[inline]
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Check if this range contains the given offset, counting `end` as inside.
    ///
    /// Cursor positions sit between characters, so a cursor right after the
    /// last character of a span still belongs to it.
    #[inline]
    pub fn contains_inclusive(&self, offset: u32) -> bool {
        offset >= self.start && offset <= self.end
    }

    /// Check if `other` lies entirely within this range.
    #[inline]
    pub fn covers(&self, other: SourceRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Check if two ranges share at least one byte.
    #[inline]
    pub fn intersects(&self, other: SourceRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Get the length of this range.
    #[inline]
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if this range is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Shift both ends by `delta`.
    #[inline]
    pub fn shifted(&self, delta: u32) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }

    /// The range as `usize` bounds, for slicing.
    #[inline]
    pub fn as_usize(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Slice `text` by this range, returning `None` when out of bounds.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.as_usize())
    }
}
