//! Arc compiler driver.
//!
//! Turns files and package directories into one IR module:
//!
//! ```text
//! arc build app/main.arc
//!     │
//!     ▼
//! PackageDriver::compile_file ──parse──▶ arc_lower::lower_file
//!     ▲                                        │
//!     └──────── compile_import(literal) ◀──────┘
//!                 │
//!                 ▼
//!           compile_package(dir): Unseen → Processing → Done
//! ```
//!
//! Every package directory is compiled at most once into the shared
//! [`arc_lower::CompilationContext`]; later imports of the same directory
//! hit the cache. Source access goes through [`SourceLoader`] so the
//! driver runs the same against the filesystem and in memory.

pub mod commands;
mod driver;
mod loader;
pub mod options;
mod resolve;

pub use driver::{Compilation, PackageDriver};
pub use loader::{is_source_file, FsLoader, MemoryLoader, SourceLoader};
pub use options::{parse_build_options, BuildOptions, OptionsError};
pub use resolve::{normalize_path, resolve_import_path};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=arc_lower=debug` (or `trace`); set `ARC_LOG_TREE`
/// as well for indented, span-nested output.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var_os("ARC_LOG_TREE").is_some() {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
