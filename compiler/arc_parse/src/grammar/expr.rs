//! Expressions.
//!
//! Precedence cascade, loosest first:
//! `||` → `&&` → equality → relational → `..` → additive → multiplicative
//! → unary → postfix → primary.
//!
//! Each binary level produces one [`BinaryChain`]: the first operand plus
//! `(operator, operand)` pairs in source order.

use arc_ast::{BinaryChain, BinaryOp, Expr, ExprKind, FieldInit, Intrinsic, Precedence, UnaryOp};
use arc_diagnostic::ErrorCode;
use arc_stack::ensure_sufficient_stack;

use crate::lexer::TokenKind;
use crate::{ParseContext, ParseError};

use super::Parser;

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::PipePipe => BinaryOp::Or,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        _ => return None,
    })
}

fn unary_op(kind: &TokenKind) -> Option<UnaryOp> {
    Some(match kind {
        TokenKind::Minus => UnaryOp::Neg,
        TokenKind::Bang => UnaryOp::Not,
        TokenKind::Star => UnaryOp::Deref,
        TokenKind::Amp => UnaryOp::AddrOf,
        _ => return None,
    })
}

impl Parser {
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_binary(Precedence::LogicalOr))
    }

    /// One precedence level. An operator that starts a new line ends the
    /// expression instead of continuing it.
    fn parse_binary(&mut self, level: Precedence) -> Result<Expr, ParseError> {
        let head = self.parse_operand(level)?;
        let mut rest = Vec::new();
        while !self.cursor.at_line_start() {
            let Some(op) = binary_op(self.cursor.current_kind()) else {
                break;
            };
            if op.precedence() != level {
                break;
            }
            self.cursor.advance();
            rest.push((op, self.parse_operand(level)?));
        }
        if rest.is_empty() {
            return Ok(head);
        }
        let span = head.span;
        Ok(Expr::new(
            ExprKind::Binary(BinaryChain {
                head: Box::new(head),
                rest,
            }),
            span,
        ))
    }

    fn parse_operand(&mut self, level: Precedence) -> Result<Expr, ParseError> {
        match level {
            Precedence::LogicalOr => self.parse_binary(Precedence::LogicalAnd),
            Precedence::LogicalAnd => self.parse_binary(Precedence::Equality),
            Precedence::Equality => self.parse_binary(Precedence::Relational),
            Precedence::Relational => self.parse_range(),
            Precedence::Additive => self.parse_binary(Precedence::Multiplicative),
            Precedence::Multiplicative => self.parse_unary(),
        }
    }

    /// `start..end`
    fn parse_range(&mut self) -> Result<Expr, ParseError> {
        let start = self.parse_binary(Precedence::Additive)?;
        if self.cursor.at_line_start() || !self.cursor.check(&TokenKind::DotDot) {
            return Ok(start);
        }
        self.cursor.advance();
        let end = self.parse_binary(Precedence::Additive)?;
        let span = start.span;
        Ok(Expr::new(
            ExprKind::Range {
                start: Box::new(start),
                end: Box::new(end),
            },
            span,
        ))
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| {
            let Some(op) = unary_op(self.cursor.current_kind()) else {
                return self.parse_postfix();
            };
            let span = self.cursor.advance().span;
            let operand = Box::new(self.parse_unary()?);
            Ok(Expr::new(ExprKind::Unary { op, operand }, span))
        })
    }

    /// Calls and member access, left to right.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.cursor.check(&TokenKind::LParen) && !self.cursor.at_line_start() {
                self.cursor.advance();
                let args = self.parse_args()?;
                let span = expr.span;
                expr = Expr::new(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    span,
                );
            } else if self.cursor.eat(&TokenKind::Dot) {
                let (name, name_span) = self.cursor.expect_ident()?;
                let span = expr.span;
                expr = Expr::new(
                    ExprKind::Member {
                        base: Box::new(expr),
                        name,
                        name_span,
                    },
                    span,
                );
            } else {
                return Ok(expr);
            }
        }
    }

    /// Comma-separated arguments after `(`, through the closing `)`.
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.with_context(ParseContext::empty(), |p| {
            let mut args = Vec::new();
            while !p.cursor.check(&TokenKind::RParen) {
                args.push(p.parse_expr()?);
                if !p.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
            p.cursor.expect(&TokenKind::RParen)?;
            Ok(args)
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.cursor.current_span();
        let kind = match self.cursor.current_kind().clone() {
            TokenKind::Int(n) => ExprKind::Int(n),
            TokenKind::Float(f) => ExprKind::Float(f),
            TokenKind::Str(s) => ExprKind::Str(s),
            TokenKind::Char(c) => ExprKind::Char(c),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Null => ExprKind::Null,
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.with_context(ParseContext::empty(), Self::parse_expr)?;
                self.cursor.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::Ident(name) => return self.parse_ident_expr(name, span),
            other => {
                return Err(ParseError::new(
                    ErrorCode::E1002,
                    format!("expected expression, found {other}"),
                    span,
                ))
            }
        };
        self.cursor.advance();
        Ok(Expr::new(kind, span))
    }

    /// Identifiers, plus the forms introduced by a name: `cast<T>(e)`,
    /// `alloca(T)`, intrinsic calls and struct literals.
    fn parse_ident_expr(&mut self, name: String, span: arc_ast::Span) -> Result<Expr, ParseError> {
        let next = self.cursor.peek_kind(1).clone();
        if name == "cast" && next == TokenKind::Lt {
            self.cursor.advance();
            self.cursor.advance();
            let ty = self.parse_type()?;
            self.cursor.expect(&TokenKind::Gt)?;
            self.cursor.expect(&TokenKind::LParen)?;
            let value = Box::new(self.with_context(ParseContext::empty(), Self::parse_expr)?);
            self.cursor.expect(&TokenKind::RParen)?;
            return Ok(Expr::new(ExprKind::Cast { ty, value }, span));
        }
        if name == "alloca" && next == TokenKind::LParen {
            self.cursor.advance();
            self.cursor.advance();
            let ty = self.parse_type()?;
            let count = if self.cursor.eat(&TokenKind::Comma) {
                Some(Box::new(
                    self.with_context(ParseContext::empty(), Self::parse_expr)?,
                ))
            } else {
                None
            };
            self.cursor.expect(&TokenKind::RParen)?;
            return Ok(Expr::new(ExprKind::Alloca { ty, count }, span));
        }
        if next == TokenKind::LParen {
            if let Some(kind) = Intrinsic::from_name(&name) {
                self.cursor.advance();
                self.cursor.advance();
                return self.parse_intrinsic(kind, span);
            }
        }
        if next == TokenKind::LBrace
            && !self.context.contains(ParseContext::NO_STRUCT_LITERAL)
            && self.looks_like_struct_literal()
        {
            self.cursor.advance();
            self.cursor.advance();
            let fields = self.parse_field_inits()?;
            return Ok(Expr::new(ExprKind::StructLit { name, fields }, span));
        }
        self.cursor.advance();
        Ok(Expr::new(ExprKind::Ident(name), span))
    }

    /// `Name{}` or `Name{ident:` ahead.
    fn looks_like_struct_literal(&self) -> bool {
        match self.cursor.peek_kind(2) {
            TokenKind::RBrace => true,
            TokenKind::Ident(_) => self.cursor.peek_kind(3) == &TokenKind::Colon,
            _ => false,
        }
    }

    fn parse_field_inits(&mut self) -> Result<Vec<FieldInit>, ParseError> {
        self.with_context(ParseContext::empty(), |p| {
            let mut fields = Vec::new();
            while !p.cursor.check(&TokenKind::RBrace) {
                let (name, span) = p.cursor.expect_ident()?;
                p.cursor.expect(&TokenKind::Colon)?;
                let value = p.parse_expr()?;
                fields.push(FieldInit { name, value, span });
                if !p.cursor.eat(&TokenKind::Comma) && !p.cursor.at_line_start() {
                    break;
                }
            }
            p.cursor.expect(&TokenKind::RBrace)?;
            Ok(fields)
        })
    }

    /// Arguments of an intrinsic call, after its `(`.
    fn parse_intrinsic(&mut self, kind: Intrinsic, span: arc_ast::Span) -> Result<Expr, ParseError> {
        self.with_context(ParseContext::empty(), |p| {
            let mut ty = None;
            let mut args = Vec::new();
            if kind.takes_leading_type() {
                ty = Some(p.parse_type()?);
                while p.cursor.eat(&TokenKind::Comma) {
                    args.push(p.parse_expr()?);
                }
            } else if kind == Intrinsic::VaArg {
                args.push(p.parse_expr()?);
                p.cursor.expect(&TokenKind::Comma)?;
                ty = Some(p.parse_type()?);
            } else {
                while !p.cursor.check(&TokenKind::RParen) {
                    args.push(p.parse_expr()?);
                    if !p.cursor.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            p.cursor.expect(&TokenKind::RParen)?;
            Ok(Expr::new(ExprKind::Intrinsic { kind, ty, args }, span))
        })
    }
}
