//! Syntax tree consumed by the IR visitor.
//!
//! Every node kind is a variant of a closed enum, so the visitor's dispatch
//! is an exhaustive `match` and adding a node kind is a compile error until
//! it is handled.

mod expr;
mod item;
mod operators;
mod stmt;
mod ty;

pub use expr::{BinaryChain, Expr, ExprKind, FieldInit};
pub use item::{
    ExternBlock, ExternFunction, FieldDecl, FunctionDecl, ImportDecl, Item, NamespaceDecl, Param,
    SourceFile, TypeDecl,
};
pub use operators::{BinaryOp, Intrinsic, Precedence, UnaryOp};
pub use stmt::{Assign, AssignTarget, Block, ConstDecl, ForKind, ForStmt, IfStmt, Stmt, VarDecl};
pub use ty::TypeExpr;

#[cfg(test)]
mod tests;
