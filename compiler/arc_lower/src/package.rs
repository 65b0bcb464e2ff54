//! The seam between lowering and package compilation.
//!
//! Lowering a file needs its imports compiled first, into the same
//! [`CompilationContext`]. How an import literal maps to a directory and
//! how its files are read is the driver's business; lowering only sees
//! the [`ImportResolver`] trait.

use std::io;
use std::path::{Path, PathBuf};

use arc_diagnostic::ErrorCode;

use crate::context::CompilationContext;
use crate::namespace::NamespaceId;

/// A compiled (or in-progress) package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageInfo {
    /// Namespace declared by the package's files (empty for the root).
    pub name: String,
    pub source_dir: PathBuf,
    pub namespace: NamespaceId,
    /// Set while the package's own imports and files are being compiled.
    pub is_processing: bool,
}

/// Why an import could not be compiled.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("circular import of package at {}", dir.display())]
    CircularImport { dir: PathBuf },

    #[error(
        "namespace mismatch in {}: found '{found}', expected '{expected}'",
        file.display()
    )]
    NamespaceMismatch {
        file: PathBuf,
        found: String,
        expected: String,
    },

    #[error("no source files in {}", dir.display())]
    NoSourceFiles { dir: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{count} syntax error(s) in {}", path.display())]
    Parse { path: PathBuf, count: usize },

    #[error("imports are not supported when lowering a single file")]
    Unsupported,
}

/// Discriminant of [`ImportError`], for matching in tests and callers
/// that do not need the payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImportErrorKind {
    CircularImport,
    NamespaceMismatch,
    NoSourceFiles,
    Io,
    Parse,
    Unsupported,
}

impl ImportError {
    pub fn kind(&self) -> ImportErrorKind {
        match self {
            ImportError::CircularImport { .. } => ImportErrorKind::CircularImport,
            ImportError::NamespaceMismatch { .. } => ImportErrorKind::NamespaceMismatch,
            ImportError::NoSourceFiles { .. } => ImportErrorKind::NoSourceFiles,
            ImportError::Io { .. } => ImportErrorKind::Io,
            ImportError::Parse { .. } => ImportErrorKind::Parse,
            ImportError::Unsupported => ImportErrorKind::Unsupported,
        }
    }

    /// A circular import aborts the whole compilation; every other
    /// failure is reported and the importing file keeps lowering.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ImportError::CircularImport { .. })
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ImportError::CircularImport { .. } => ErrorCode::E3001,
            ImportError::NamespaceMismatch { .. } => ErrorCode::E3002,
            ImportError::NoSourceFiles { .. } => ErrorCode::E3004,
            ImportError::Io { .. } => ErrorCode::E3005,
            ImportError::Parse { .. } | ImportError::Unsupported => ErrorCode::E3003,
        }
    }
}

/// Compiles imported packages into a shared context.
pub trait ImportResolver {
    /// Compile the package named by `literal`, as written in a file in
    /// `from_dir`, unless it is already compiled.
    fn compile_import(
        &mut self,
        ctx: &mut CompilationContext,
        from_dir: &Path,
        literal: &str,
    ) -> Result<PackageInfo, ImportError>;
}

/// Resolver for standalone files: every import fails with
/// [`ImportError::Unsupported`].
#[derive(Copy, Clone, Debug, Default)]
pub struct NoImports;

impl ImportResolver for NoImports {
    fn compile_import(
        &mut self,
        _ctx: &mut CompilationContext,
        _from_dir: &Path,
        literal: &str,
    ) -> Result<PackageInfo, ImportError> {
        tracing::debug!(import = literal, "imports unavailable");
        Err(ImportError::Unsupported)
    }
}
