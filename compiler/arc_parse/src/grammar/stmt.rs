//! Statements and blocks.

use arc_ast::{
    Assign, AssignTarget, Block, ConstDecl, Expr, ExprKind, ForKind, ForStmt, IfStmt, Stmt,
    TypeExpr, UnaryOp, VarDecl,
};
use arc_diagnostic::ErrorCode;
use arc_stack::ensure_sufficient_stack;

use crate::lexer::TokenKind;
use crate::{ParseContext, ParseError};

use super::Parser;

/// `name[: T] [= init]`, shared by `var` and `const`.
type Binding = (String, Option<TypeExpr>, Option<Expr>);

impl Parser {
    /// `{ stmt* }`
    ///
    /// A failed statement is recorded and skipped; the block itself only
    /// fails when its braces are missing.
    pub(super) fn parse_block(&mut self) -> Result<Block, ParseError> {
        ensure_sufficient_stack(|| {
            let span = self.cursor.expect(&TokenKind::LBrace)?;
            let mut stmts = Vec::new();
            self.with_context(ParseContext::empty(), |p| {
                while !p.cursor.check(&TokenKind::RBrace) && !p.cursor.is_at_end() {
                    if p.cursor.eat(&TokenKind::Semicolon) {
                        continue;
                    }
                    match p.parse_stmt() {
                        Ok(stmt) => stmts.push(stmt),
                        Err(error) => {
                            p.record(error);
                            p.cursor.synchronize_statement();
                        }
                    }
                }
            });
            self.cursor.expect(&TokenKind::RBrace)?;
            Ok(Block { stmts, span })
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.cursor.current_span();
        let stmt = match self.cursor.current_kind() {
            TokenKind::If => return self.parse_if().map(Stmt::If),
            TokenKind::For => return self.parse_for().map(Stmt::For),
            TokenKind::LBrace => return self.parse_block().map(Stmt::Block),
            TokenKind::Var => Stmt::Var(self.parse_var_decl()?),
            TokenKind::Const => Stmt::Const(self.parse_const_decl()?),
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                Stmt::Return { value, span }
            }
            TokenKind::Break => {
                self.cursor.advance();
                Stmt::Break(span)
            }
            TokenKind::Continue => {
                self.cursor.advance();
                Stmt::Continue(span)
            }
            TokenKind::Defer => {
                self.cursor.advance();
                let expr = self.parse_expr()?;
                Stmt::Defer { expr, span }
            }
            _ => self.parse_simple_stmt()?,
        };
        self.end_statement()?;
        Ok(stmt)
    }

    fn at_statement_end(&self) -> bool {
        self.cursor.at_line_start()
            || matches!(
                self.cursor.current_kind(),
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
            )
    }

    fn end_statement(&mut self) -> Result<(), ParseError> {
        if self.cursor.eat(&TokenKind::Semicolon) || self.at_statement_end() {
            Ok(())
        } else {
            Err(ParseError::new(
                ErrorCode::E1001,
                format!(
                    "expected end of statement, found {}",
                    self.cursor.current_kind()
                ),
                self.cursor.current_span(),
            ))
        }
    }

    /// A `var` declaration, an assignment, or an expression statement.
    fn parse_simple_stmt(&mut self) -> Result<Stmt, ParseError> {
        if self.cursor.check(&TokenKind::Var) {
            return self.parse_var_decl().map(Stmt::Var);
        }
        let span = self.cursor.current_span();
        let expr = self.parse_expr()?;
        if !self.cursor.eat(&TokenKind::Eq) {
            return Ok(Stmt::Expr(expr));
        }
        let value = self.parse_expr()?;
        let target = match expr.kind {
            ExprKind::Ident(name) => AssignTarget::Name(name),
            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand,
            } => AssignTarget::Deref(*operand),
            ExprKind::Member { base, name, .. } => AssignTarget::Field {
                base: *base,
                field: name,
            },
            _ => {
                return Err(ParseError::new(
                    ErrorCode::E1001,
                    "invalid assignment target",
                    expr.span,
                ))
            }
        };
        Ok(Stmt::Assign(Assign {
            target,
            value,
            span,
        }))
    }

    /// `var name[: T] [= init]`
    pub(super) fn parse_var_decl(&mut self) -> Result<VarDecl, ParseError> {
        let span = self.cursor.expect(&TokenKind::Var)?;
        let (name, ty, init) = self.parse_binding()?;
        Ok(VarDecl {
            name,
            ty,
            init,
            span,
        })
    }

    /// `const name[: T] = init`
    pub(super) fn parse_const_decl(&mut self) -> Result<ConstDecl, ParseError> {
        let span = self.cursor.expect(&TokenKind::Const)?;
        let (name, ty, init) = self.parse_binding()?;
        Ok(ConstDecl {
            name,
            ty,
            init,
            span,
        })
    }

    fn parse_binding(&mut self) -> Result<Binding, ParseError> {
        let (name, _) = self.cursor.expect_ident()?;
        let ty = if self.cursor.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.cursor.eat(&TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok((name, ty, init))
    }

    fn parse_header_expr(&mut self) -> Result<Expr, ParseError> {
        self.with_context(ParseContext::NO_STRUCT_LITERAL, Self::parse_expr)
    }

    /// `if c { } else if c { } else { }`
    fn parse_if(&mut self) -> Result<IfStmt, ParseError> {
        let span = self.cursor.expect(&TokenKind::If)?;
        let cond = self.parse_header_expr()?;
        let then = self.parse_block()?;
        let mut branches = vec![(cond, then)];
        let mut else_block = None;
        while self.cursor.eat(&TokenKind::Else) {
            if self.cursor.eat(&TokenKind::If) {
                let cond = self.parse_header_expr()?;
                let block = self.parse_block()?;
                branches.push((cond, block));
            } else {
                else_block = Some(self.parse_block()?);
                break;
            }
        }
        Ok(IfStmt {
            branches,
            else_block,
            span,
        })
    }

    /// All `for` header shapes:
    ///
    /// ```text
    /// for { }
    /// for cond { }
    /// for x in a..b { }
    /// for init; cond; post { }
    /// for (init; cond; post) { }
    /// ```
    fn parse_for(&mut self) -> Result<ForStmt, ParseError> {
        let span = self.cursor.expect(&TokenKind::For)?;
        let kind = self.with_context(ParseContext::NO_STRUCT_LITERAL, Self::parse_for_header)?;
        let body = self.parse_block()?;
        Ok(ForStmt { kind, body, span })
    }

    fn parse_for_header(&mut self) -> Result<ForKind, ParseError> {
        if self.cursor.check(&TokenKind::LBrace) {
            return Ok(ForKind::Cond(None));
        }
        if self.cursor.check_ident() && self.cursor.peek_kind(1) == &TokenKind::In {
            let (var, var_span) = self.cursor.expect_ident()?;
            self.cursor.expect(&TokenKind::In)?;
            let iterable = self.parse_expr()?;
            return Ok(ForKind::In {
                var,
                var_span,
                iterable,
            });
        }

        let parenthesized =
            self.cursor.check(&TokenKind::LParen) && self.cursor.paren_group_has_semicolon();
        if parenthesized {
            self.cursor.advance();
        }
        let init = if self.cursor.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_simple_stmt()?)
        };
        if !self.cursor.eat(&TokenKind::Semicolon) {
            return match init {
                Some(Stmt::Expr(cond)) => Ok(ForKind::Cond(Some(cond))),
                _ => Err(ParseError::new(
                    ErrorCode::E1001,
                    format!("expected `;` in for header, found {}", self.cursor.current_kind()),
                    self.cursor.current_span(),
                )),
            };
        }
        let cond = if self.cursor.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.cursor.expect(&TokenKind::Semicolon)?;
        let close = if parenthesized {
            TokenKind::RParen
        } else {
            TokenKind::LBrace
        };
        let post = if self.cursor.check(&close) {
            None
        } else {
            Some(Box::new(self.parse_simple_stmt()?))
        };
        if parenthesized {
            self.cursor.expect(&TokenKind::RParen)?;
        }
        Ok(ForKind::Clause {
            init: init.map(Box::new),
            cond,
            post,
        })
    }
}
