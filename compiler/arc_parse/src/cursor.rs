//! Token cursor for navigating the token stream.

use arc_ast::Span;
use arc_diagnostic::ErrorCode;

use crate::lexer::{Token, TokenKind};
use crate::ParseError;

/// Cursor over a token list that always ends with [`TokenKind::Eof`].
pub struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let span = tokens.last().map_or(Span::new(1, 1), |t| t.span);
            tokens.push(Token {
                kind: TokenKind::Eof,
                span,
                newline_before: false,
            });
        }
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    #[inline]
    pub fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token.
    #[inline]
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    /// Kind of the token `n` positions ahead (Eof past the end).
    pub fn peek_kind(&self, n: usize) -> &TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    /// A line break precedes the current token.
    #[inline]
    pub fn at_line_start(&self) -> bool {
        self.current().newline_before
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    pub fn check_ident(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(_))
    }

    /// Advance and return the consumed token. Stays put at Eof.
    pub fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Consume `kind` if it is current.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            let code = if matches!(kind, TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket) {
                ErrorCode::E1005
            } else {
                ErrorCode::E1001
            };
            Err(ParseError::new(
                code,
                format!("expected {}, found {}", kind.describe(), self.current_kind()),
                self.current_span(),
            ))
        }
    }

    pub fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        if let TokenKind::Ident(name) = self.current_kind() {
            let name = name.clone();
            let span = self.advance().span;
            Ok((name, span))
        } else {
            Err(ParseError::new(
                ErrorCode::E1003,
                format!("expected identifier, found {}", self.current_kind()),
                self.current_span(),
            ))
        }
    }

    /// Whether a `;` appears inside the parenthesized group starting here.
    ///
    /// Distinguishes `for (init; cond; post)` from `for (cond)`.
    pub fn paren_group_has_semicolon(&self) -> bool {
        let mut depth = 0usize;
        for token in &self.tokens[self.pos..] {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return false;
                    }
                }
                TokenKind::Semicolon if depth == 1 => return true,
                TokenKind::LBrace | TokenKind::Eof => return false,
                _ => {}
            }
        }
        false
    }

    /// Skip tokens until a likely statement boundary.
    ///
    /// Stops before `}` or a token that starts a new line, and after `;`.
    pub fn synchronize_statement(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.eat(&TokenKind::Semicolon) {
                return;
            }
            if self.check(&TokenKind::RBrace) || self.at_line_start() {
                return;
            }
            self.advance();
        }
    }

    /// Skip tokens until the next top-level declaration keyword.
    pub fn synchronize_item(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.at_line_start()
                && matches!(
                    self.current_kind(),
                    TokenKind::Func
                        | TokenKind::Struct
                        | TokenKind::Class
                        | TokenKind::Extern
                        | TokenKind::Var
                        | TokenKind::Const
                        | TokenKind::Import
                )
            {
                return;
            }
            self.advance();
        }
    }
}
