//! Compilation context shared by every file of one compilation.
//!
//! Owns the module being built, the type registry, the scope chain, the
//! namespace table and the diagnostics queue, plus the per-function state
//! of the function currently being lowered: its block builder, the stack
//! of enclosing loops and its pending `defer` expressions.

use std::path::{Path, PathBuf};

use arc_ast::{Expr, Span};
use arc_diagnostic::{DiagnosticQueue, DiagnosticSink, ErrorCode, SourceLocation};

use crate::builder::FunctionBuilder;
use crate::ir::{BlockId, Module, Type};
use crate::namespace::{NamespaceId, NamespaceTable};
use crate::scope::ScopeChain;
use crate::types::TypeRegistry;

/// What `defer expr` does.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DeferMode {
    /// Evaluate the expression once where it appears and warn (W2001).
    #[default]
    EvaluateInPlace,
    /// Run every pending deferred expression of the function, newest
    /// first, before each `ret`.
    RunAtExit,
}

#[derive(Clone, Debug)]
pub struct LowerConfig {
    pub module_name: String,
    pub defer_mode: DeferMode,
}

impl Default for LowerConfig {
    fn default() -> Self {
        LowerConfig {
            module_name: "main".to_string(),
            defer_mode: DeferMode::default(),
        }
    }
}

/// Branch targets of the innermost enclosing loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoopTargets {
    pub continue_to: BlockId,
    pub break_to: BlockId,
}

/// A `defer` recorded for replay at function exit, with the bindings
/// that were visible where it appeared.
#[derive(Clone, Debug)]
pub struct Deferred {
    pub expr: Expr,
    pub scopes: ScopeChain,
}

/// The function whose body is being lowered.
#[derive(Clone, Debug)]
pub struct FunctionFrame {
    pub name: String,
    pub ret: Type,
}

/// File and namespace in effect, saved around nested package compiles.
#[derive(Clone, Debug)]
pub struct FileState {
    file: Option<PathBuf>,
    namespace: NamespaceId,
}

pub struct CompilationContext {
    pub module: Module,
    pub types: TypeRegistry,
    pub scopes: ScopeChain,
    pub namespaces: NamespaceTable,
    pub diagnostics: DiagnosticQueue,
    config: LowerConfig,
    current_file: Option<PathBuf>,
    current_namespace: NamespaceId,
    builder: FunctionBuilder,
    frame: Option<FunctionFrame>,
    loops: Vec<LoopTargets>,
    defers: Vec<Vec<Deferred>>,
}

impl CompilationContext {
    pub fn new(config: LowerConfig) -> Self {
        Self::with_diagnostics(config, DiagnosticQueue::new())
    }

    pub fn with_diagnostics(config: LowerConfig, diagnostics: DiagnosticQueue) -> Self {
        CompilationContext {
            module: Module::new(config.module_name.clone()),
            types: TypeRegistry::new(),
            scopes: ScopeChain::new(),
            namespaces: NamespaceTable::new(),
            diagnostics,
            config,
            current_file: None,
            current_namespace: NamespaceId::ROOT,
            builder: FunctionBuilder::new(),
            frame: None,
            loops: Vec::new(),
            defers: Vec::new(),
        }
    }

    pub fn config(&self) -> &LowerConfig {
        &self.config
    }

    // Files and namespaces

    /// Switch to `file` in namespace `namespace`, returning what to
    /// restore afterwards.
    pub fn enter_file(&mut self, file: Option<&Path>, namespace: NamespaceId) -> FileState {
        let saved = FileState {
            file: self.current_file.take(),
            namespace: self.current_namespace,
        };
        self.current_file = file.map(Path::to_path_buf);
        self.current_namespace = namespace;
        saved
    }

    pub fn restore_file(&mut self, state: FileState) {
        self.current_file = state.file;
        self.current_namespace = state.namespace;
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    pub fn current_namespace(&self) -> NamespaceId {
        self.current_namespace
    }

    // Diagnostics

    fn location(&self, span: Span) -> Option<SourceLocation> {
        (!span.is_dummy()).then(|| SourceLocation::new(self.current_file.as_deref(), span))
    }

    pub fn error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let location = self.location(span);
        self.diagnostics
            .report_error(code, message.into(), location);
    }

    pub fn warning(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let location = self.location(span);
        self.diagnostics
            .report_warning(code, message.into(), location);
    }

    // Scopes

    pub fn push_scope(&mut self) {
        self.scopes.push();
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    // Functions

    /// Start lowering a function body: fresh builder, one scope for the
    /// parameters and an empty defer list.
    pub fn enter_function(&mut self, frame: FunctionFrame) {
        tracing::debug!(function = %frame.name, "enter function");
        self.builder = FunctionBuilder::new();
        self.frame = Some(frame);
        self.scopes.push();
        self.defers.push(Vec::new());
    }

    /// Finish the current function, handing back its builder.
    pub fn exit_function(&mut self) -> FunctionBuilder {
        self.scopes.pop();
        self.defers.pop();
        self.loops.clear();
        if let Some(frame) = self.frame.take() {
            tracing::debug!(function = %frame.name, "exit function");
        }
        std::mem::take(&mut self.builder)
    }

    pub fn builder(&mut self) -> &mut FunctionBuilder {
        &mut self.builder
    }

    pub fn frame(&self) -> Option<&FunctionFrame> {
        self.frame.as_ref()
    }

    /// Declared return type of the current function (`void` outside one).
    pub fn return_type(&self) -> Type {
        self.frame
            .as_ref()
            .map_or(Type::Void, |frame| frame.ret.clone())
    }

    // Loops

    pub fn push_loop(&mut self, targets: LoopTargets) {
        self.loops.push(targets);
    }

    pub fn pop_loop(&mut self) {
        self.loops.pop();
    }

    pub fn current_loop(&self) -> Option<LoopTargets> {
        self.loops.last().copied()
    }

    // Defers

    pub fn push_defer(&mut self, expr: Expr) {
        let scopes = self.scopes.clone();
        if let Some(list) = self.defers.last_mut() {
            list.push(Deferred { expr, scopes });
        }
    }

    /// Pending defers of the current function, newest first.
    pub fn pending_defers(&self) -> Vec<Deferred> {
        self.defers
            .last()
            .map(|list| list.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    // Finalization

    /// Hand back the module, with every registered struct attached.
    pub fn finish(mut self) -> (Module, DiagnosticQueue) {
        self.module.named_types = self.types.definitions().cloned().collect();
        (self.module, self.diagnostics)
    }
}
