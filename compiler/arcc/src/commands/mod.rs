//! Command handlers for the `arc` CLI.
//!
//! Each handler compiles the input, prints every collected diagnostic and
//! returns whether the command succeeded; the binary turns that into the
//! exit status.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use arc_diagnostic::emitter::{DiagnosticEmitter, TerminalEmitter};
use arc_diagnostic::DiagnosticQueue;

use crate::driver::{Compilation, PackageDriver};
use crate::loader::FsLoader;
use crate::options::BuildOptions;
use crate::resolve::normalize_path;

/// Compile the input and write its IR to the output path.
///
/// Nothing is written when compilation reports an error.
pub fn build_file(options: &BuildOptions) -> bool {
    let Some(compilation) = compile_and_report(options) else {
        return false;
    };
    let output = options.output_path();
    let text = format!("{}\n", compilation.module);
    if let Err(error) = std::fs::write(&output, text) {
        eprintln!("error: cannot write '{}': {error}", output.display());
        return false;
    }
    if options.verbose {
        println!(
            "wrote {} ({} functions)",
            output.display(),
            compilation.module.functions.len()
        );
    }
    true
}

/// Compile the input without writing anything.
pub fn check_file(options: &BuildOptions) -> bool {
    let Some(compilation) = compile_and_report(options) else {
        return false;
    };
    println!(
        "OK: {} ({} functions)",
        options.input.display(),
        compilation.module.functions.len()
    );
    true
}

/// Compile `options.input` from disk.
pub fn compile(options: &BuildOptions) -> Compilation {
    let input = absolute(&options.input);
    tracing::info!(input = %input.display(), "compiling");
    PackageDriver::new(FsLoader).compile(
        &input,
        options.lower_config(),
        DiagnosticQueue::with_config(options.diagnostic_config()),
    )
}

fn compile_and_report(options: &BuildOptions) -> Option<Compilation> {
    let mut compilation = compile(options);
    let colors = std::io::stderr().is_terminal();
    let mut emitter = TerminalEmitter::stderr(colors);
    if report(&mut compilation, &mut emitter) {
        None
    } else {
        Some(compilation)
    }
}

/// Print the compilation's diagnostics, sorted by position, followed by a
/// summary. Returns whether any of them was an error.
pub fn report<W: Write>(compilation: &mut Compilation, emitter: &mut TerminalEmitter<W>) -> bool {
    let queue = &mut compilation.diagnostics;
    let error_count = queue.error_count();
    let warning_count = queue.warning_count();
    let suppressed = queue.suppressed_count();
    let has_errors = queue.has_errors().is_some();

    emitter.emit_all(&queue.flush());
    emitter.emit_summary(error_count, warning_count);
    if suppressed > 0 {
        eprintln!("note: {suppressed} more errors not shown (raise --error-limit)");
    }
    emitter.flush();
    has_errors
}

/// `path` against the current directory, without touching the filesystem.
fn absolute(path: &Path) -> PathBuf {
    match std::env::current_dir() {
        Ok(cwd) => normalize_path(&cwd.join(path)),
        Err(_) => normalize_path(path),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
