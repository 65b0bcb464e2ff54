//! Type expressions: `T`, `*T`, `[N]T`, `name<T, U>`.

use arc_ast::TypeExpr;
use arc_diagnostic::ErrorCode;

use crate::lexer::TokenKind;
use crate::ParseError;

use super::Parser;

impl Parser {
    pub(super) fn at_type_start(&self) -> bool {
        matches!(
            self.cursor.current_kind(),
            TokenKind::Ident(_) | TokenKind::Star | TokenKind::LBracket
        )
    }

    pub(super) fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        let span = self.cursor.current_span();
        match self.cursor.current_kind().clone() {
            TokenKind::Star => {
                self.cursor.advance();
                let pointee = Box::new(self.parse_type()?);
                Ok(TypeExpr::Pointer { pointee, span })
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let len = match self.cursor.current_kind() {
                    TokenKind::Int(n) => *n,
                    other => {
                        return Err(ParseError::new(
                            ErrorCode::E1004,
                            format!("expected array length, found {other}"),
                            self.cursor.current_span(),
                        ))
                    }
                };
                self.cursor.advance();
                self.cursor.expect(&TokenKind::RBracket)?;
                let elem = Box::new(self.parse_type()?);
                Ok(TypeExpr::Array { elem, len, span })
            }
            TokenKind::Ident(name) => {
                self.cursor.advance();
                if !self.cursor.eat(&TokenKind::Lt) {
                    return Ok(TypeExpr::Named { name, span });
                }
                let mut args = vec![self.parse_type()?];
                while self.cursor.eat(&TokenKind::Comma) {
                    args.push(self.parse_type()?);
                }
                self.cursor.expect(&TokenKind::Gt)?;
                Ok(TypeExpr::Generic { name, args, span })
            }
            other => Err(ParseError::new(
                ErrorCode::E1004,
                format!("expected type, found {other}"),
                span,
            )),
        }
    }
}
