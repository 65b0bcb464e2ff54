//! Top-level declarations.

use arc_ast::{
    ExternBlock, ExternFunction, FieldDecl, FunctionDecl, ImportDecl, Item, NamespaceDecl, Param,
    SourceFile, TypeDecl, TypeExpr,
};
use arc_diagnostic::ErrorCode;

use crate::lexer::TokenKind;
use crate::ParseError;

use super::Parser;

impl Parser {
    /// Parse a whole file: an optional namespace header, imports, items.
    pub fn parse_file(&mut self) -> SourceFile {
        let mut file = SourceFile::default();
        while !self.cursor.is_at_end() {
            if self.cursor.eat(&TokenKind::Semicolon) {
                continue;
            }
            let result = match self.cursor.current_kind() {
                TokenKind::Namespace => self.parse_namespace().map(|decl| {
                    if file.namespace.is_none() {
                        file.namespace = Some(decl);
                    }
                }),
                TokenKind::Import => self.parse_import().map(|decl| file.imports.push(decl)),
                _ => self.parse_item().map(|item| file.items.push(item)),
            };
            if let Err(error) = result {
                self.record(error);
                self.cursor.synchronize_item();
            }
        }
        file
    }

    fn parse_namespace(&mut self) -> Result<NamespaceDecl, ParseError> {
        let span = self.cursor.expect(&TokenKind::Namespace)?;
        let (name, _) = self.cursor.expect_ident()?;
        Ok(NamespaceDecl { name, span })
    }

    fn parse_import(&mut self) -> Result<ImportDecl, ParseError> {
        let span = self.cursor.expect(&TokenKind::Import)?;
        match self.cursor.current_kind().clone() {
            TokenKind::Str(path) => {
                self.cursor.advance();
                Ok(ImportDecl { path, span })
            }
            other => Err(ParseError::new(
                ErrorCode::E1001,
                format!("expected import path string, found {other}"),
                self.cursor.current_span(),
            )),
        }
    }

    fn parse_item(&mut self) -> Result<Item, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Func => self.parse_function().map(Item::Function),
            TokenKind::Struct => self.parse_type_decl().map(Item::Struct),
            TokenKind::Class => self.parse_type_decl().map(Item::Class),
            TokenKind::Extern => self.parse_extern().map(Item::Extern),
            TokenKind::Var => self.parse_var_decl().map(Item::Var),
            TokenKind::Const => self.parse_const_decl().map(Item::Const),
            other => Err(ParseError::new(
                ErrorCode::E1001,
                format!("expected declaration, found {other}"),
                self.cursor.current_span(),
            )),
        }
    }

    /// `func name(params) [-> ] [ret] [{ body }]`
    pub(super) fn parse_function(&mut self) -> Result<FunctionDecl, ParseError> {
        let span = self.cursor.expect(&TokenKind::Func)?;
        let (name, _) = self.cursor.expect_ident()?;
        self.cursor.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        let mut variadic = false;
        while !self.cursor.check(&TokenKind::RParen) {
            if self.cursor.eat(&TokenKind::Ellipsis) {
                variadic = true;
                break;
            }
            let (param_name, param_span) = self.cursor.expect_ident()?;
            self.cursor.eat(&TokenKind::Colon);
            let ty = self.parse_type()?;
            params.push(Param {
                name: param_name,
                ty,
                span: param_span,
            });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;
        let ret = self.parse_return_type()?;
        let body = if self.cursor.check(&TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(FunctionDecl {
            name,
            params,
            variadic,
            ret,
            body,
            span,
        })
    }

    fn parse_return_type(&mut self) -> Result<Option<TypeExpr>, ParseError> {
        if self.cursor.eat(&TokenKind::Arrow) {
            return self.parse_type().map(Some);
        }
        if self.at_type_start() && !self.cursor.at_line_start() {
            return self.parse_type().map(Some);
        }
        Ok(None)
    }

    /// `struct Name { fields, methods }` or `class Name { ..., deinit { } }`
    fn parse_type_decl(&mut self) -> Result<TypeDecl, ParseError> {
        let span = self.cursor.advance().span;
        let (name, _) = self.cursor.expect_ident()?;
        self.cursor.expect(&TokenKind::LBrace)?;
        let mut decl = TypeDecl {
            name,
            fields: Vec::new(),
            methods: Vec::new(),
            deinit: None,
            span,
        };
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.is_at_end() {
            if self.cursor.eat(&TokenKind::Semicolon) || self.cursor.eat(&TokenKind::Comma) {
                continue;
            }
            if self.cursor.check(&TokenKind::Func) {
                let method = self.parse_function()?;
                decl.methods.push(method);
                continue;
            }
            let (member, member_span) = self.cursor.expect_ident()?;
            if member == "deinit" && self.cursor.check(&TokenKind::LBrace) {
                decl.deinit = Some(self.parse_block()?);
                continue;
            }
            self.cursor.eat(&TokenKind::Colon);
            let ty = self.parse_type()?;
            decl.fields.push(FieldDecl {
                name: member,
                ty,
                span: member_span,
            });
        }
        self.cursor.expect(&TokenKind::RBrace)?;
        Ok(decl)
    }

    /// `extern [name | "name"] { func f(T, ...) R }`
    fn parse_extern(&mut self) -> Result<ExternBlock, ParseError> {
        let span = self.cursor.expect(&TokenKind::Extern)?;
        let namespace = match self.cursor.current_kind().clone() {
            TokenKind::Ident(name) | TokenKind::Str(name) => {
                self.cursor.advance();
                Some(name)
            }
            _ => None,
        };
        self.cursor.expect(&TokenKind::LBrace)?;
        let mut functions = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.is_at_end() {
            if self.cursor.eat(&TokenKind::Semicolon) {
                continue;
            }
            functions.push(self.parse_extern_function()?);
        }
        self.cursor.expect(&TokenKind::RBrace)?;
        Ok(ExternBlock {
            namespace,
            functions,
            span,
        })
    }

    fn parse_extern_function(&mut self) -> Result<ExternFunction, ParseError> {
        let span = self.cursor.expect(&TokenKind::Func)?;
        let (name, _) = self.cursor.expect_ident()?;
        self.cursor.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        let mut variadic = false;
        while !self.cursor.check(&TokenKind::RParen) {
            if self.cursor.eat(&TokenKind::Ellipsis) {
                variadic = true;
                break;
            }
            // Parameter names are optional in extern signatures.
            if self.cursor.check_ident() && self.cursor.peek_kind(1) == &TokenKind::Colon {
                self.cursor.advance();
                self.cursor.advance();
            }
            params.push(self.parse_type()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;
        let ret = self.parse_return_type()?;
        Ok(ExternFunction {
            name,
            params,
            variadic,
            ret,
            span,
        })
    }
}
