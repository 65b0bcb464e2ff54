//! Diagnostics for the Arc compiler.
//!
//! Every phase reports through a [`DiagnosticSink`] instead of returning
//! early, so one run surfaces as many problems as possible:
//! - Error codes for searchability ([`ErrorCode`])
//! - A message and an optional `file:line:column` location
//! - Notes for extra context
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] can only be obtained from a queue that has recorded
//! an error, so a phase returning `Result<T, ErrorGuaranteed>` cannot fail
//! silently.
//!
//! ```text
//! let mut queue = DiagnosticQueue::new();
//! queue.report_error(ErrorCode::E2001, "undefined: x".into(), None);
//! let guarantee = queue.has_errors(); // Some(..)
//! ```

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Severity, SourceLocation};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue, DiagnosticSink};
