//! Top-level declarations and the per-file root.

use crate::Span;

use super::{Block, ConstDecl, TypeExpr, VarDecl};

/// A parsed source file.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct SourceFile {
    /// `namespace N` header, if any.
    pub namespace: Option<NamespaceDecl>,
    pub imports: Vec<ImportDecl>,
    pub items: Vec<Item>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct NamespaceDecl {
    pub name: String,
    pub span: Span,
}

/// `import "path"`; the path is stored unquoted.
#[derive(Clone, PartialEq, Debug)]
pub struct ImportDecl {
    pub path: String,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Item {
    Function(FunctionDecl),
    Struct(TypeDecl),
    Class(TypeDecl),
    Extern(ExternBlock),
    Const(ConstDecl),
    Var(VarDecl),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

/// `func name(params) [ret] { body }`
#[derive(Clone, PartialEq, Debug)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub variadic: bool,
    pub ret: Option<TypeExpr>,
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

/// Body of a `struct` or `class` declaration.
#[derive(Clone, PartialEq, Debug)]
pub struct TypeDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<FunctionDecl>,
    /// `deinit { }` (classes only).
    pub deinit: Option<Block>,
    pub span: Span,
}

/// Signature-only function inside an `extern` block.
#[derive(Clone, PartialEq, Debug)]
pub struct ExternFunction {
    pub name: String,
    pub params: Vec<TypeExpr>,
    pub variadic: bool,
    pub ret: Option<TypeExpr>,
    pub span: Span,
}

/// `extern [name] { ... }`
#[derive(Clone, PartialEq, Debug)]
pub struct ExternBlock {
    pub namespace: Option<String>,
    pub functions: Vec<ExternFunction>,
    pub span: Span,
}
