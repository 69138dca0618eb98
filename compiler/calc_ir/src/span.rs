//! Source location spans.

use std::fmt;

/// Byte range into the script source.
///
/// - start: byte offset from the start of the source
/// - end: byte offset (exclusive)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Span for synthesized nodes.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create from a byte range, saturating offsets past `u32::MAX`.
    ///
    /// Scripts are bounded by the chat message size long before this matters;
    /// saturating keeps span construction total.
    #[inline]
    pub fn from_range(range: std::ops::Range<usize>) -> Self {
        let start = u32::try_from(range.start).unwrap_or(u32::MAX);
        let end = u32::try_from(range.end).unwrap_or(u32::MAX);
        Span { start, end }
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans to create one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Zero-width span at the start of this span.
    #[inline]
    #[must_use]
    pub const fn point(self) -> Span {
        Span {
            start: self.start,
            end: self.start,
        }
    }

    /// Move the span right by `by` bytes.
    ///
    /// Used when a fragment (an f-string field) is lexed on its own.
    #[inline]
    #[must_use]
    pub const fn shifted(self, by: u32) -> Span {
        Span {
            start: self.start.saturating_add(by),
            end: self.end.saturating_add(by),
        }
    }

    /// Convert to a `usize` range for slicing the source.
    #[inline]
    pub fn to_range(self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }

    /// 1-based line and column of the span start within `source`.
    pub fn line_col(self, source: &str) -> (usize, usize) {
        let offset = (self.start as usize).min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let col = before
            .rfind('\n')
            .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
            + 1;
        (line, col)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let a = Span::new(4, 8);
        let b = Span::new(1, 5);
        assert_eq!(a.merge(b), Span::new(1, 8));
    }

    #[test]
    fn test_len_and_empty() {
        assert_eq!(Span::new(3, 10).len(), 7);
        assert!(Span::new(3, 3).is_empty());
        assert!(!Span::new(3, 4).is_empty());
    }

    #[test]
    fn test_line_col() {
        let source = "x = 1\ny = 2\n  z";
        assert_eq!(Span::new(0, 1).line_col(source), (1, 1));
        assert_eq!(Span::new(6, 7).line_col(source), (2, 1));
        assert_eq!(Span::new(14, 15).line_col(source), (3, 3));
    }

    #[test]
    fn test_from_range() {
        assert_eq!(Span::from_range(2..9), Span::new(2, 9));
    }
}
