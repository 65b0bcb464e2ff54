//! Package driver: compiles entry files, package directories and their
//! imports into one shared [`CompilationContext`].
//!
//! # Package States
//!
//! A directory is `Unseen` until first imported. It is cached as
//! processing (`PackageInfo::is_processing`) before any of its files are
//! lowered, and replaced by the finished `PackageInfo` once they all are.
//! Importing a directory that is still processing is a circular import.
//! A package that fails is dropped from the cache, so nothing half-built
//! is ever handed out as done.
//!
//! # Namespace Consistency
//!
//! Every file of a package is parsed before any is lowered. The first
//! `namespace` header fixes the package's name; a file declaring a
//! different one fails the whole package before it emits any IR.

use std::path::{Path, PathBuf};

use arc_ast::SourceFile;
use arc_diagnostic::{DiagnosticQueue, DiagnosticSink, ErrorCode};
use arc_lower::ir::Module;
use arc_lower::namespace::NamespaceId;
use arc_lower::verify::verify_module;
use arc_lower::{
    lower_file, CompilationContext, ImportError, ImportErrorKind, ImportResolver, LowerConfig,
    PackageInfo,
};
use rustc_hash::FxHashMap;

use crate::loader::{is_source_file, SourceLoader};
use crate::resolve::{normalize_path, resolve_import_path};

/// Name used for diagnostics from [`PackageDriver::compile_source`].
const SOURCE_NAME: &str = "<source>";

/// The finished module and everything reported while building it.
pub struct Compilation {
    pub module: Module,
    pub diagnostics: DiagnosticQueue,
}

impl Compilation {
    /// Close `ctx`, checking the module's structure in debug builds.
    pub fn finish(ctx: CompilationContext) -> Self {
        let (module, mut diagnostics) = ctx.finish();
        if cfg!(debug_assertions) {
            if let Err(errors) = verify_module(&module) {
                for error in errors {
                    tracing::error!(%error, "malformed IR");
                    diagnostics.report_error(
                        ErrorCode::E9001,
                        format!("internal compiler error: {error}"),
                        None,
                    );
                }
            }
        }
        Compilation {
            module,
            diagnostics,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors().is_some()
    }
}

/// Compiles packages on demand, each at most once.
pub struct PackageDriver<L> {
    loader: L,
    /// Root for non-relative import literals.
    entry_dir: PathBuf,
    packages: FxHashMap<PathBuf, PackageInfo>,
}

impl<L: SourceLoader> PackageDriver<L> {
    pub fn new(loader: L) -> Self {
        PackageDriver {
            loader,
            entry_dir: PathBuf::from("."),
            packages: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_entry_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.entry_dir = normalize_path(dir.as_ref());
        self
    }

    pub fn entry_dir(&self) -> &Path {
        &self.entry_dir
    }

    /// The cached state of the package in `dir`, if it was ever imported.
    pub fn package(&self, dir: &Path) -> Option<&PackageInfo> {
        self.packages.get(&normalize_path(dir))
    }

    /// Compile `target` into a fresh context.
    ///
    /// A source file is compiled with [`compile_file`](Self::compile_file);
    /// anything else is taken as a package directory and becomes the entry
    /// directory. Failures that stop the build are added to the
    /// diagnostics; the result always carries whatever was lowered.
    pub fn compile(
        &mut self,
        target: &Path,
        config: LowerConfig,
        diagnostics: DiagnosticQueue,
    ) -> Compilation {
        let mut ctx = CompilationContext::with_diagnostics(config, diagnostics);
        let result = if is_source_file(target) {
            self.compile_file(&mut ctx, target)
        } else {
            self.entry_dir = normalize_path(target);
            self.compile_package(&mut ctx, target).map(|_| ())
        };
        if let Err(error) = result {
            Self::report_failure(&mut ctx, &error);
        }
        Compilation::finish(ctx)
    }

    /// Compile the entry file at `path`. Its directory becomes the entry
    /// directory; only this file is compiled from it, while its imports
    /// are compiled as whole packages.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn compile_file(
        &mut self,
        ctx: &mut CompilationContext,
        path: &Path,
    ) -> Result<(), ImportError> {
        let path = normalize_path(path);
        if let Some(dir) = path.parent() {
            self.entry_dir = dir.to_path_buf();
        }
        let file = self.load(ctx, &path)?;
        lower_file(ctx, &file, Some(path.as_path()), self)
    }

    /// Compile source text that has no file of its own. Imports resolve
    /// against the entry directory.
    pub fn compile_source(
        &mut self,
        ctx: &mut CompilationContext,
        source: &str,
    ) -> Result<(), ImportError> {
        let file = Self::parse(ctx, source, None)?;
        lower_file(ctx, &file, None, self)
    }

    /// Compile every source file in `dir` as one package, or return the
    /// cached result if it was compiled before.
    #[tracing::instrument(level = "debug", skip_all, fields(dir = %dir.display()))]
    pub fn compile_package(
        &mut self,
        ctx: &mut CompilationContext,
        dir: &Path,
    ) -> Result<PackageInfo, ImportError> {
        let dir = normalize_path(dir);
        if let Some(package) = self.packages.get(&dir) {
            if package.is_processing {
                tracing::debug!("import cycle");
                return Err(ImportError::CircularImport { dir });
            }
            tracing::debug!(namespace = %package.name, "package cache hit");
            return Ok(package.clone());
        }

        self.packages.insert(
            dir.clone(),
            PackageInfo {
                name: String::new(),
                source_dir: dir.clone(),
                namespace: NamespaceId::ROOT,
                is_processing: true,
            },
        );
        match self.compile_package_files(ctx, &dir) {
            Ok(package) => {
                tracing::info!(namespace = %package.name, "package compiled");
                self.packages.insert(dir, package.clone());
                Ok(package)
            }
            Err(error) => {
                self.packages.remove(&dir);
                Err(error)
            }
        }
    }

    fn compile_package_files(
        &mut self,
        ctx: &mut CompilationContext,
        dir: &Path,
    ) -> Result<PackageInfo, ImportError> {
        let paths = self
            .loader
            .list_sources(dir)
            .map_err(|source| ImportError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        if paths.is_empty() {
            return Err(ImportError::NoSourceFiles {
                dir: dir.to_path_buf(),
            });
        }
        tracing::debug!(files = paths.len(), "compiling package");

        let mut name: Option<String> = None;
        let mut files = Vec::with_capacity(paths.len());
        let mut syntax_error = None;
        for path in paths {
            let file = match self.load(ctx, &path) {
                Ok(file) => file,
                Err(error @ ImportError::Parse { .. }) => {
                    syntax_error.get_or_insert(error);
                    continue;
                }
                Err(error) => return Err(error),
            };
            if let Some(decl) = &file.namespace {
                match &name {
                    None => name = Some(decl.name.clone()),
                    Some(expected) if *expected != decl.name => {
                        return Err(ImportError::NamespaceMismatch {
                            file: path,
                            found: decl.name.clone(),
                            expected: expected.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
            files.push((path, file));
        }
        if let Some(error) = syntax_error {
            return Err(error);
        }

        for (path, file) in &files {
            lower_file(ctx, file, Some(path.as_path()), self)?;
        }

        let name = name.unwrap_or_default();
        let namespace = ctx.namespaces.get_or_create(&name);
        Ok(PackageInfo {
            name,
            source_dir: dir.to_path_buf(),
            namespace,
            is_processing: false,
        })
    }

    /// Read and parse `path`, reporting its syntax errors.
    fn load(&self, ctx: &mut CompilationContext, path: &Path) -> Result<SourceFile, ImportError> {
        let source = self.loader.read(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(ctx, &source, Some(path))
    }

    fn parse(
        ctx: &mut CompilationContext,
        source: &str,
        path: Option<&Path>,
    ) -> Result<SourceFile, ImportError> {
        let output = arc_parse::parse(source);
        if output.has_errors() {
            for error in &output.errors {
                ctx.diagnostics.report(error.to_diagnostic(path));
            }
            return Err(ImportError::Parse {
                path: path.map_or_else(|| PathBuf::from(SOURCE_NAME), Path::to_path_buf),
                count: output.errors.len(),
            });
        }
        Ok(output.file)
    }

    /// Report a failure that stopped the build. Syntax errors were
    /// already reported one by one.
    fn report_failure(ctx: &mut CompilationContext, error: &ImportError) {
        if error.kind() == ImportErrorKind::Parse {
            return;
        }
        ctx.diagnostics
            .report_error(error.code(), error.to_string(), None);
    }
}

impl<L: SourceLoader> ImportResolver for PackageDriver<L> {
    fn compile_import(
        &mut self,
        ctx: &mut CompilationContext,
        from_dir: &Path,
        literal: &str,
    ) -> Result<PackageInfo, ImportError> {
        let dir = resolve_import_path(&self.entry_dir, from_dir, literal);
        tracing::debug!(import = literal, dir = %dir.display(), "resolved import");
        self.compile_package(ctx, &dir)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
