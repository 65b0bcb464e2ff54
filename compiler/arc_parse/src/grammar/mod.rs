//! Grammar productions, one submodule per syntactic category.

mod expr;
mod item;
mod stmt;
mod ty;

use crate::cursor::Cursor;
use crate::lexer::Token;
use crate::{ParseContext, ParseError};

/// Parser state.
pub struct Parser {
    cursor: Cursor,
    context: ParseContext,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            context: ParseContext::default(),
            errors: Vec::new(),
        }
    }

    /// Errors recorded so far.
    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    fn record(&mut self, error: ParseError) {
        tracing::trace!(code = %error.code, span = %error.span, "{}", error.message);
        self.errors.push(error);
    }

    /// Run `f` with `context` replacing the current flags.
    fn with_context<T>(&mut self, context: ParseContext, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.context, context);
        let result = f(self);
        self.context = saved;
        result
    }
}
