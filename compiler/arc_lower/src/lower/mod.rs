//! AST → IR lowering.
//!
//! # Entry Points
//!
//! - [`lower_file`] lowers one parsed file into a shared
//!   [`CompilationContext`], compiling its imports through an
//!   [`ImportResolver`] first.
//! - [`lower_source_file`] lowers a single standalone file into a fresh
//!   context and returns the finished module.
//!
//! # Architecture
//!
//! [`Lowerer`] borrows the context and walks the tree. Declarations are
//! handled in two passes (`decl.rs`): the first registers every type,
//! function signature and global of the file, the second lowers bodies,
//! so nothing depends on declaration order. Statements live in `stmt.rs`
//! and `control_flow.rs`; expressions in `expr.rs`, with postfix chains
//! in `calls.rs` and literals, casts and intrinsics in their own files.
//!
//! Errors never stop lowering. Each is reported to the context's
//! diagnostics queue and replaced by a placeholder value.

mod calls;
mod cast;
mod control_flow;
mod decl;
mod expr;
mod intrinsics;
mod literals;
mod stmt;

use std::path::Path;

use arc_ast::{SourceFile, TypeExpr};
use arc_diagnostic::{DiagnosticQueue, ErrorCode};

use crate::builder::FunctionBuilder;
use crate::context::{CompilationContext, LowerConfig};
use crate::ir::{Module, Type, Value};
use crate::namespace::NamespaceId;
use crate::package::{ImportError, ImportResolver, NoImports};
use crate::types::TypeProblem;

/// Result of lowering a standalone file.
pub struct LowerOutput {
    pub module: Module,
    pub diagnostics: DiagnosticQueue,
}

impl LowerOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors().is_some()
    }
}

/// Lower one standalone file (imports are reported, not followed).
pub fn lower_source_file(file: &SourceFile, config: LowerConfig) -> LowerOutput {
    let mut ctx = CompilationContext::new(config);
    if let Err(error) = lower_file(&mut ctx, file, None, &mut NoImports) {
        ctx.error(error.code(), error.to_string(), arc_ast::Span::DUMMY);
    }
    let (module, diagnostics) = ctx.finish();
    LowerOutput {
        module,
        diagnostics,
    }
}

/// Lower `file` into `ctx`.
///
/// Imports are compiled first through `imports`. A circular import is
/// returned as an error and stops this file; any other import failure is
/// reported and lowering continues.
#[tracing::instrument(level = "debug", skip_all, fields(file = ?path))]
pub fn lower_file(
    ctx: &mut CompilationContext,
    file: &SourceFile,
    path: Option<&Path>,
    imports: &mut dyn ImportResolver,
) -> Result<(), ImportError> {
    let from_dir = path
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    for import in &file.imports {
        match imports.compile_import(ctx, &from_dir, &import.path) {
            Ok(package) => {
                tracing::debug!(
                    import = %import.path,
                    namespace = %package.name,
                    "import resolved"
                );
            }
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => {
                let saved = ctx.enter_file(path, ctx.current_namespace());
                ctx.error(
                    ErrorCode::E3003,
                    format!("cannot import \"{}\": {error}", import.path),
                    import.span,
                );
                ctx.restore_file(saved);
            }
        }
    }

    let namespace = match &file.namespace {
        Some(decl) => ctx.namespaces.get_or_create(&decl.name),
        None => NamespaceId::ROOT,
    };
    let saved = ctx.enter_file(path, namespace);
    let mut lowerer = Lowerer { ctx };
    lowerer.declare_items(&file.items);
    lowerer.lower_items(&file.items);
    lowerer.ctx.restore_file(saved);
    Ok(())
}

/// Result of resolving a name or postfix chain, before it is used.
///
/// A member access on an object that names a method produces a bound
/// method carrying its receiver; the call that follows prepends it.
#[derive(Clone, Debug)]
pub(crate) enum Operand {
    Value(Value),
    /// A function by IR name.
    Function(String),
    BoundMethod {
        function: String,
        receiver: Value,
    },
    /// A bare namespace name, only meaningful before `.member`.
    Namespace(NamespaceId),
    /// A name that failed to resolve. Already reported.
    Invalid,
}

/// Walks syntax trees and emits IR into a [`CompilationContext`].
pub(crate) struct Lowerer<'ctx> {
    pub(crate) ctx: &'ctx mut CompilationContext,
}

impl Lowerer<'_> {
    #[inline]
    fn builder(&mut self) -> &mut FunctionBuilder {
        self.ctx.builder()
    }

    /// Resolve a type expression, reporting unknown names (E2009) and
    /// collection types (W2003).
    fn resolve_type(&mut self, ty: &TypeExpr) -> Type {
        let mut problems = Vec::new();
        let resolved = self.ctx.types.resolve(ty, &mut problems);
        for problem in problems {
            match problem {
                TypeProblem::Unknown { name, span } => {
                    self.ctx
                        .error(ErrorCode::E2009, format!("unknown type: {name}"), span);
                }
                TypeProblem::Collection { name, span } => self.ctx.warning(
                    ErrorCode::W2003,
                    format!("{name} types are not supported yet; using an opaque pointer"),
                    span,
                ),
            }
        }
        resolved
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
