//! Lowering of Arc syntax trees to a typed, LLVM-flavoured SSA IR.
//!
//! # Pipeline
//!
//! ```text
//! SourceFile ──lower_file──▶ CompilationContext ──finish──▶ ir::Module
//!                 │
//!                 └─ imports ─▶ ImportResolver (package driver)
//! ```
//!
//! # Modules
//!
//! - [`ir`]: the IR data model and its text form.
//! - [`types`]: the type registry (builtin names, structs, classes, layout).
//! - [`scope`]: lexical scope chain of symbol bindings.
//! - [`namespace`]: namespaces and the functions and types they contain.
//! - [`builder`]: per-function basic-block builder.
//! - [`package`]: the import boundary implemented by the package driver.
//! - [`verify`]: structural checks over finished IR.
//!
//! The compilation context and the AST visitor are internal; their entry
//! points are re-exported here.

pub mod builder;
mod context;
pub mod ir;
mod lower;
pub mod namespace;
pub mod package;
pub mod scope;
pub mod types;
pub mod verify;

pub use context::{
    CompilationContext, DeferMode, Deferred, FileState, FunctionFrame, LoopTargets, LowerConfig,
};
pub use lower::{lower_file, lower_source_file, LowerOutput};
pub use package::{ImportError, ImportErrorKind, ImportResolver, NoImports, PackageInfo};
pub use types::TypeRegistry;
