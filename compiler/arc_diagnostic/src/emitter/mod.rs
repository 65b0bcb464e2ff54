//! Diagnostic emitters.
//!
//! Only plain terminal output is provided. Emitters write whatever they are
//! given; ordering is the queue's job (see [`DiagnosticQueue::flush`]).
//!
//! [`DiagnosticQueue::flush`]: crate::queue::DiagnosticQueue::flush

use std::io::{self, Write};

use crate::{Diagnostic, Severity};

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const RESET: &str = "\x1b[0m";
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Trait for emitting diagnostics.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);

    /// Emit a summary of errors/warnings.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}

/// One-line-per-diagnostic emitter, `file:L:C: error[E2001]: message`.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, colors: bool) -> Self {
        TerminalEmitter { writer, colors }
    }

    /// Consume the emitter and return its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_severity(&mut self, severity: Severity) {
        if self.colors {
            let color = match severity {
                Severity::Error => colors::ERROR,
                Severity::Warning => colors::WARNING,
                Severity::Note => colors::NOTE,
            };
            let _ = write!(self.writer, "{color}{severity}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{severity}");
        }
    }
}

impl TerminalEmitter<io::Stderr> {
    /// Emitter for stderr.
    pub fn stderr(colors: bool) -> Self {
        TerminalEmitter::new(io::stderr(), colors)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        if let Some(location) = &diagnostic.location {
            let _ = write!(self.writer, "{location}: ");
        }
        self.write_severity(diagnostic.severity);
        let _ = writeln!(self.writer, "[{}]: {}", diagnostic.code, diagnostic.message);
        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.write_severity(Severity::Note);
            let _ = writeln!(self.writer, ": {note}");
        }
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count == 0 && warning_count == 0 {
            return;
        }
        let mut parts = Vec::new();
        if error_count > 0 {
            parts.push(format!("{error_count} error{}", plural_s(error_count)));
        }
        if warning_count > 0 {
            parts.push(format!("{warning_count} warning{}", plural_s(warning_count)));
        }
        let _ = writeln!(self.writer, "{} emitted", parts.join(", "));
    }
}
