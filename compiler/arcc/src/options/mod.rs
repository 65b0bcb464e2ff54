//! Command-line options for `arc build` and `arc check`.

use std::path::PathBuf;

use arc_diagnostic::DiagnosticConfig;
use arc_lower::{DeferMode, LowerConfig};

/// Extension of the textual IR written by `arc build`.
pub const IR_EXTENSION: &str = "ir";

/// Options shared by `build` and `check`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Entry source file or package directory.
    pub input: PathBuf,
    /// Output file (-o, --output=)
    pub output: Option<PathBuf>,
    /// `defer` behaviour (--defer=inline|exit)
    pub defer_mode: DeferMode,
    /// Maximum errors kept, 0 = unlimited (--error-limit=N)
    pub error_limit: Option<usize>,
    /// Verbose output (-v, --verbose)
    pub verbose: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("missing input file or package directory")]
    MissingInput,
    #[error("unexpected argument '{0}' (input is already '{1}')")]
    ExtraInput(String, String),
    #[error("option '{0}' needs a value")]
    MissingValue(&'static str),
    #[error("invalid value '{value}' for '{flag}' (expected {expected})")]
    InvalidValue {
        flag: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("unknown option '{0}'")]
    UnknownOption(String),
}

/// Parse everything after the subcommand name.
///
/// `-o` takes its value from the next argument; every other option is a
/// single `--name=value` argument.
pub fn parse_build_options(args: &[String]) -> Result<BuildOptions, OptionsError> {
    let mut input: Option<PathBuf> = None;
    let mut output = None;
    let mut defer_mode = DeferMode::default();
    let mut error_limit = None;
    let mut verbose = false;

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        if arg == "-o" {
            let Some(path) = args.next() else {
                return Err(OptionsError::MissingValue("-o"));
            };
            output = Some(PathBuf::from(path));
        } else if let Some(path) = arg.strip_prefix("--output=") {
            output = Some(PathBuf::from(path));
        } else if let Some(mode) = arg.strip_prefix("--defer=") {
            defer_mode = match mode {
                "inline" => DeferMode::EvaluateInPlace,
                "exit" => DeferMode::RunAtExit,
                _ => {
                    return Err(OptionsError::InvalidValue {
                        flag: "--defer",
                        value: mode.to_string(),
                        expected: "'inline' or 'exit'",
                    })
                }
            };
        } else if let Some(limit) = arg.strip_prefix("--error-limit=") {
            let limit = limit.parse::<usize>().map_err(|_| OptionsError::InvalidValue {
                flag: "--error-limit",
                value: limit.to_string(),
                expected: "a number",
            })?;
            error_limit = Some(limit);
        } else if arg == "-v" || arg == "--verbose" {
            verbose = true;
        } else if arg.starts_with('-') && arg.len() > 1 {
            return Err(OptionsError::UnknownOption(arg.clone()));
        } else if let Some(first) = &input {
            return Err(OptionsError::ExtraInput(
                arg.clone(),
                first.display().to_string(),
            ));
        } else {
            input = Some(PathBuf::from(arg));
        }
    }

    Ok(BuildOptions {
        input: input.ok_or(OptionsError::MissingInput)?,
        output,
        defer_mode,
        error_limit,
        verbose,
    })
}

impl BuildOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        BuildOptions {
            input: input.into(),
            output: None,
            defer_mode: DeferMode::default(),
            error_limit: None,
            verbose: false,
        }
    }

    /// Module name: the input's file stem, or directory name.
    pub fn module_name(&self) -> String {
        self.input
            .file_stem()
            .map_or_else(|| "main".to_string(), |stem| stem.to_string_lossy().into_owned())
    }

    /// Where `build` writes IR: `-o` if given, else `<stem>.ir` in the
    /// current directory.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.{IR_EXTENSION}", self.module_name())))
    }

    pub fn lower_config(&self) -> LowerConfig {
        LowerConfig {
            module_name: self.module_name(),
            defer_mode: self.defer_mode,
        }
    }

    pub fn diagnostic_config(&self) -> DiagnosticConfig {
        match self.error_limit {
            Some(error_limit) => DiagnosticConfig { error_limit },
            None => DiagnosticConfig::default(),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
