//! Import literal → package directory.

use std::path::{Component, Path, PathBuf};

/// Resolve an import literal written in a file in `current_dir`.
///
/// Literals starting with `.` (`"./util"`, `"../shared"`) are relative to
/// the importing file's directory; any other literal is relative to
/// `entry_dir`, the directory of the file the build started from. A
/// relative `current_dir` is itself taken relative to `entry_dir`.
pub fn resolve_import_path(entry_dir: &Path, current_dir: &Path, literal: &str) -> PathBuf {
    let base = if literal.starts_with('.') {
        entry_dir.join(current_dir)
    } else {
        entry_dir.to_path_buf()
    };
    normalize_path(&base.join(literal))
}

/// Lexically resolve `.` and `..` components. Does not touch the
/// filesystem, so symlinks are not followed.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => result.push(component),
        }
    }
    result
}
