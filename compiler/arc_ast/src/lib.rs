//! Syntax tree for the Arc compiler.
//!
//! This crate is the boundary between the parser and the IR visitor. It
//! holds no behavior beyond small accessors: the parser builds these nodes,
//! the visitor consumes them.
//!
//! # Design
//!
//! - Nodes own their children (`Box`/`Vec`), so tests can build trees by
//!   hand without an arena.
//! - Binary expressions are stored as one [`BinaryChain`](ast::BinaryChain)
//!   per precedence level: a head operand followed by `(operator, operand)`
//!   pairs, folded left-to-right by the visitor.
//! - Every node carries a [`Span`] with its line and column.

pub mod ast;
mod span;

pub use ast::*;
pub use span::Span;
