//! Source file spans and text offsets

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Byte offset into a source file
pub type TextOffset = u32;

/// A unique identifier for a source file
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a file id from its raw index
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A half-open byte range `[start, end)` in a source file
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// First byte covered by the span
    pub start: TextOffset,
    /// One past the last byte covered by the span
    pub end: TextOffset,
}

impl Span {
    /// Create a span; `start` must not exceed `end`
    pub const fn new(start: TextOffset, end: TextOffset) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// A zero-width span at `offset`
    pub const fn empty_at(offset: TextOffset) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` falls inside the span.
    ///
    /// The end offset is treated as inside so that a position sitting right
    /// after the last token of a node still belongs to that node.
    pub const fn contains(&self, offset: TextOffset) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Whether `other` lies entirely within this span
    pub const fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest span covering both spans
    #[must_use]
    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A span with associated file
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct FileSpan {
    pub file: FileId,
    pub span: Span,
}

impl FileSpan {
    pub const fn new(file: FileId, span: Span) -> Self {
        Self { file, span }
    }

    pub fn range(&self) -> Range<usize> {
        self.span.range()
    }
}
