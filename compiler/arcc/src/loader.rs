//! Source access for the driver.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions recognized as Arc source.
const SOURCE_EXTENSIONS: [&str; 2] = ["arc", "lang"];

/// Whether `path` names an Arc source file (`*.arc` or `*.lang`).
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Where the driver reads packages from.
pub trait SourceLoader {
    /// Source files directly inside `dir`, sorted by name.
    fn list_sources(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Reads from the filesystem.
#[derive(Copy, Clone, Debug, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn list_sources(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_file() && is_source_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// An in-memory file tree.
///
/// ```text
/// let loader = MemoryLoader::new()
///     .with_file("/app/main.arc", "import \"./util\"")
///     .with_file("/app/util/math.arc", "namespace util");
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, source: impl Into<String>) {
        self.files.insert(path.into(), source.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn list_sources(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut in_dir = false;
        let mut files = Vec::new();
        for path in self.files.keys() {
            if path.starts_with(dir) && path != dir {
                in_dir = true;
            }
            if path.parent() == Some(dir) && is_source_file(path) {
                files.push(path.clone());
            }
        }
        if !in_dir {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", dir.display()),
            ));
        }
        // BTreeMap keys are already in order.
        Ok(files)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn source_extensions() {
        assert!(is_source_file(Path::new("a/main.arc")));
        assert!(is_source_file(Path::new("a/legacy.lang")));
        assert!(!is_source_file(Path::new("a/notes.md")));
        assert!(!is_source_file(Path::new("a/arc")));
    }

    #[test]
    fn fs_loader_lists_sources_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.arc", "a.lang", "readme.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.arc")).unwrap();

        let files = FsLoader.list_sources(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.lang"), dir.path().join("b.arc")]
        );
    }

    #[test]
    fn fs_loader_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = FsLoader.list_sources(&dir.path().join("absent")).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn memory_loader_lists_direct_children_only() {
        let loader = MemoryLoader::new()
            .with_file("/app/main.arc", "")
            .with_file("/app/b.arc", "")
            .with_file("/app/notes.txt", "")
            .with_file("/app/util/math.arc", "");
        assert_eq!(
            loader.list_sources(Path::new("/app")).unwrap(),
            vec![PathBuf::from("/app/b.arc"), PathBuf::from("/app/main.arc")]
        );
        assert_eq!(
            loader.list_sources(Path::new("/app/util")).unwrap(),
            vec![PathBuf::from("/app/util/math.arc")]
        );
    }

    #[test]
    fn memory_loader_distinguishes_empty_from_missing() {
        let loader = MemoryLoader::new().with_file("/app/docs/readme.txt", "hi");
        assert!(loader.list_sources(Path::new("/app/docs")).unwrap().is_empty());
        assert!(loader.list_sources(Path::new("/nowhere")).is_err());
        assert_eq!(loader.read(Path::new("/app/docs/readme.txt")).unwrap(), "hi");
        assert!(loader.read(Path::new("/app/docs/other.txt")).is_err());
    }
}
