//! Recursive descent parser for Arc.
//!
//! [`parse`] turns source text into an [`arc_ast::SourceFile`] plus the
//! errors found along the way. Errors never stop parsing: the parser
//! resynchronizes at the next statement or declaration and keeps going, so
//! one run reports every syntax error in a file.

mod context;
mod cursor;
mod error;
mod grammar;
pub mod lexer;

pub use context::ParseContext;
pub use cursor::Cursor;
pub use error::ParseError;
pub use grammar::Parser;

use arc_ast::SourceFile;

use crate::lexer::TokenKind;

/// Result of parsing one file.
#[derive(Clone, PartialEq, Debug)]
pub struct ParseOutput {
    pub file: SourceFile,
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Lex and parse `source`.
pub fn parse(source: &str) -> ParseOutput {
    let (tokens, mut errors) = lexer::lex(source);
    // Lex errors are already recorded; the parser never sees those tokens.
    let tokens = tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Error)
        .collect();
    let mut parser = Parser::new(tokens);
    let file = parser.parse_file();
    errors.extend(parser.into_errors());
    tracing::debug!(
        items = file.items.len(),
        errors = errors.len(),
        "parsed source file"
    );
    ParseOutput { file, errors }
}

#[cfg(test)]
mod tests;
