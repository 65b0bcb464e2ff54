//! Stack growth for recursive descent.
//!
//! The parser and the lowering visitor both recurse once per nesting level
//! of the source (parenthesized expressions, nested blocks, `if` chains).
//! Source nesting is unbounded, so each recursive entry point goes through
//! [`ensure_sufficient_stack`], which moves execution onto a fresh stack
//! segment when the current one is nearly exhausted.
//!
//! On `wasm32` the call is a passthrough.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if fewer than 128KB remain.
///
/// ```text
/// fn lower_expr(&mut self, expr: &Expr) -> Value {
///     ensure_sufficient_stack(|| match &expr.kind { ... })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
