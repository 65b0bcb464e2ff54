//! Type-level proof that an error was reported.

use std::fmt;

/// Proof that at least one error diagnostic was recorded.
///
/// Only the queue can construct one, so a function returning
/// `Result<T, ErrorGuaranteed>` cannot fail without having reported why.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    /// Returns a proof when `error_count` is non-zero.
    pub(crate) fn from_error_count(error_count: usize) -> Option<Self> {
        (error_count > 0).then_some(ErrorGuaranteed(()))
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}
