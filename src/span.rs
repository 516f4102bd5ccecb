//! Source span tracking, shared by the lexer, parser and diagnostics.

use serde::Serialize;
use std::ops::Range;

/// A half-open byte range in the source text, with 1-indexed line/column
/// for the start of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end, line: 1, column: 1 }
    }

    pub fn with_location(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self { start, end, line, column }
    }

    /// A span with no real source position, used for synthesized nodes
    /// (builtin environment entries, error recovery placeholders).
    pub fn dummy() -> Self {
        Self { start: 0, end: 0, line: 1, column: 1 }
    }

    pub fn to_range(self) -> Range<usize> {
        self.start..self.end
    }

    /// The smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line,
            column: self.column,
        }
    }
}
