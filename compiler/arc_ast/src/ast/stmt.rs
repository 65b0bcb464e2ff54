//! Statement nodes.

use crate::Span;

use super::{Expr, TypeExpr};

/// `{ stmt* }`
#[derive(Clone, PartialEq, Debug)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// `var name[: T] [= init]`
#[derive(Clone, PartialEq, Debug)]
pub struct VarDecl {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub init: Option<Expr>,
    pub span: Span,
}

/// `const name[: T] = init`
///
/// The initializer is optional in the tree so the visitor, not the parser,
/// reports a missing one.
#[derive(Clone, PartialEq, Debug)]
pub struct ConstDecl {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Left-hand side of an assignment.
#[derive(Clone, PartialEq, Debug)]
pub enum AssignTarget {
    /// `name = v`
    Name(String),
    /// `*ptr = v`
    Deref(Expr),
    /// `base.field = v`
    Field { base: Expr, field: String },
}

/// `target = value`
#[derive(Clone, PartialEq, Debug)]
pub struct Assign {
    pub target: AssignTarget,
    pub value: Expr,
    pub span: Span,
}

/// `if c0 { } else if c1 { } ... else { }`
///
/// `branches` is never empty; the first entry is the leading `if`.
#[derive(Clone, PartialEq, Debug)]
pub struct IfStmt {
    pub branches: Vec<(Expr, Block)>,
    pub else_block: Option<Block>,
    pub span: Span,
}

/// The header shapes a `for` statement can take.
#[derive(Clone, PartialEq, Debug)]
pub enum ForKind {
    /// `for init; cond; post { }` (each clause optional).
    Clause {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
    },
    /// `for cond { }` or `for { }`.
    Cond(Option<Expr>),
    /// `for name in iterable { }`
    In {
        var: String,
        var_span: Span,
        iterable: Expr,
    },
}

#[derive(Clone, PartialEq, Debug)]
pub struct ForStmt {
    pub kind: ForKind,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Stmt {
    Var(VarDecl),
    Const(ConstDecl),
    Assign(Assign),
    Return { value: Option<Expr>, span: Span },
    If(IfStmt),
    For(ForStmt),
    Break(Span),
    Continue(Span),
    Defer { expr: Expr, span: Span },
    Expr(Expr),
    Block(Block),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Var(decl) => decl.span,
            Stmt::Const(decl) => decl.span,
            Stmt::Assign(assign) => assign.span,
            Stmt::If(stmt) => stmt.span,
            Stmt::For(stmt) => stmt.span,
            Stmt::Expr(expr) => expr.span,
            Stmt::Block(block) => block.span,
            Stmt::Return { span, .. }
            | Stmt::Defer { span, .. }
            | Stmt::Break(span)
            | Stmt::Continue(span) => *span,
        }
    }
}
