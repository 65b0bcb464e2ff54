//! Source positions.
//!
//! The visitor only needs a line and a column per node: they feed
//! diagnostics and the position-derived block labels (`if.then.12_4`).

use std::fmt;

/// Source position of a syntax node.
///
/// Both fields are 1-based. [`Span::DUMMY`] (`0:0`) marks synthesized nodes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    /// Dummy span for generated code.
    pub const DUMMY: Span = Span { line: 0, column: 0 };

    /// Create a new span.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Span { line, column }
    }

    /// Check if this is the dummy span.
    #[inline]
    pub const fn is_dummy(self) -> bool {
        self.line == 0 && self.column == 0
    }

    /// Suffix used to make block labels unique per source position.
    pub fn label_suffix(self) -> String {
        format!("{}_{}", self.line, self.column)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_span_is_dummy() {
        assert!(Span::DUMMY.is_dummy());
        assert!(!Span::new(1, 1).is_dummy());
    }

    #[test]
    fn label_suffix_joins_line_and_column() {
        assert_eq!(Span::new(12, 4).label_suffix(), "12_4");
    }

    #[test]
    fn spans_order_by_line_then_column() {
        assert!(Span::new(1, 9) < Span::new(2, 1));
        assert!(Span::new(3, 2) < Span::new(3, 5));
    }
}
