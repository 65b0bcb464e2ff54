//! Parse error type.

use std::path::Path;

use arc_ast::Span;
use arc_diagnostic::{Diagnostic, ErrorCode, SourceLocation};

/// An error found while lexing or parsing.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl ParseError {
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
        }
    }

    /// Convert to a diagnostic located in `file`.
    pub fn to_diagnostic(&self, file: Option<&Path>) -> Diagnostic {
        Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_location(SourceLocation::new(file, self.span))
    }
}
