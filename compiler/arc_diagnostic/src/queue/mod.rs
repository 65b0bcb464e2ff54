//! Diagnostic queue: the sink every phase reports into.
//!
//! Features:
//! - Separate error and warning counts
//! - Optional error limit
//! - Stable ordering by file and position on flush

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed, Severity, SourceLocation};

/// Configuration for diagnostic collection.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig { error_limit: 100 }
    }
}

impl DiagnosticConfig {
    /// A config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig { error_limit: 0 }
    }
}

/// Receiver for diagnostics reported while compiling.
///
/// Reporting never aborts the caller: the phase keeps going after it has
/// reported, so one run surfaces as many problems as possible.
pub trait DiagnosticSink {
    /// Record a fully built diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);

    /// Record an error.
    fn report_error(&mut self, code: ErrorCode, message: String, location: Option<SourceLocation>) {
        self.report(
            Diagnostic::error(code)
                .with_message(message)
                .with_optional_location(location),
        );
    }

    /// Record a warning.
    fn report_warning(
        &mut self,
        code: ErrorCode,
        message: String,
        location: Option<SourceLocation>,
    ) {
        self.report(
            Diagnostic::warning(code)
                .with_message(message)
                .with_optional_location(location),
        );
    }
}

/// Queue for collecting and counting diagnostics.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.report_error(ErrorCode::E2001, "undefined: x".into(), None);
/// assert_eq!(queue.error_count(), 1);
/// let sorted = queue.flush();
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    /// Errors dropped because the limit was reached.
    suppressed: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `false` if it was dropped by the error limit. Dropped errors
    /// still count towards [`error_count`](Self::error_count), so a limit
    /// never turns a failing compilation into a passing one.
    pub fn push(&mut self, diag: Diagnostic) -> bool {
        match diag.severity {
            Severity::Error => {
                self.error_count += 1;
                if self.config.error_limit > 0 && self.error_count > self.config.error_limit {
                    self.suppressed += 1;
                    return false;
                }
            }
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        self.diagnostics.push(diag);
        true
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    /// Number of errors reported, including suppressed ones.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Number of warnings reported.
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Number of errors dropped by the limit.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed
    }

    /// Proof of failure if any error was reported.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Diagnostics in report order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate over the recorded messages with a given code.
    pub fn messages_with_code(&self, code: ErrorCode) -> impl Iterator<Item = &str> {
        self.diagnostics
            .iter()
            .filter(move |d| d.code == code)
            .map(|d| d.message.as_str())
    }

    /// Sort diagnostics by file and position and return them.
    ///
    /// Clears the queue, including its counts.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        result.sort_by(|a, b| {
            let file_a = a.location.as_ref().and_then(|l| l.file.as_ref());
            let file_b = b.location.as_ref().and_then(|l| l.file.as_ref());
            file_a
                .cmp(&file_b)
                .then_with(|| a.sort_key().cmp(&b.sort_key()))
        });
        self.error_count = 0;
        self.warning_count = 0;
        self.suppressed = 0;
        result
    }
}

impl DiagnosticSink for DiagnosticQueue {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

#[cfg(test)]
mod tests;
