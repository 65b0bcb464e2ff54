//! Expression nodes.

use crate::Span;

use super::{BinaryOp, Intrinsic, TypeExpr, UnaryOp};

/// An expression with its source position.
#[derive(Clone, PartialEq, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// The identifier text if this expression is a bare name.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// One left-associative precedence level: `head op1 rhs1 op2 rhs2 ...`.
///
/// Every operator is stored next to the operand it applies to, so folding
/// never needs to recover which operator sits between which operands.
#[derive(Clone, PartialEq, Debug)]
pub struct BinaryChain {
    pub head: Box<Expr>,
    pub rest: Vec<(BinaryOp, Expr)>,
}

/// `name: value` inside a struct literal.
#[derive(Clone, PartialEq, Debug)]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// Expression kinds.
#[derive(Clone, PartialEq, Debug)]
pub enum ExprKind {
    // Literals
    Int(u64),
    Float(f64),
    Bool(bool),
    Str(String),
    Char(char),
    Null,

    /// Bare identifier (variable, function, or namespace name).
    Ident(String),

    /// Operator chain for a single precedence level.
    Binary(BinaryChain),

    /// `start..end`; only meaningful as a for-in iterable.
    Range { start: Box<Expr>, end: Box<Expr> },

    Unary { op: UnaryOp, operand: Box<Expr> },

    /// `callee(args...)`
    Call { callee: Box<Expr>, args: Vec<Expr> },

    /// `base.name`
    Member {
        base: Box<Expr>,
        name: String,
        name_span: Span,
    },

    /// `Type{field: value, ...}`
    StructLit { name: String, fields: Vec<FieldInit> },

    /// `cast<T>(value)`
    Cast { ty: TypeExpr, value: Box<Expr> },

    /// `alloca(T)` or `alloca(T, count)`
    Alloca { ty: TypeExpr, count: Option<Box<Expr>> },

    /// `sizeof(T)`, `memcpy(d, s, n)`, `va_arg(list, T)`, ...
    Intrinsic {
        kind: Intrinsic,
        ty: Option<TypeExpr>,
        args: Vec<Expr>,
    },
}
