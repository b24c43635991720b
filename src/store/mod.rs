//! Document Store
//!
//! Abstracts file access for configuration resolution. Provides:
//! - DocumentStore trait: existence checks, raw reads and writes, named areas
//! - FsStore: real filesystem, one root directory per area
//! - MemoryStore: in-process store for unit and integration tests
//!
//! An *area* is a named root directory (`config`, `extensions`). Paths handed
//! to `exists`/`read`/`write` are full paths obtained through `path_in`.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use std::io;
use std::path::{Component, Path, PathBuf};

/// Area holding user configuration files.
pub const CONFIG_AREA: &str = "config";

/// Area holding installed extensions and their bundled files.
pub const EXTENSIONS_AREA: &str = "extensions";

/// File access used by the resolver
pub trait DocumentStore: Send + Sync {
    /// Whether a file exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Read the raw bytes of a file
    fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError>;

    /// Replace the contents of a file, creating it (and its parents) if needed
    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), StoreError>;

    /// Root directory of a named area
    fn area_root(&self, area: &str) -> Result<PathBuf, StoreError>;

    /// Resolve a path relative to a named area
    fn path_in(&self, area: &str, relative: &Path) -> Result<PathBuf, StoreError> {
        Ok(self.area_root(area)?.join(relative))
    }

    /// Express `path` relative to a named area.
    ///
    /// Both sides are normalized first. A path under the area root has the
    /// root stripped; any other relative path is taken to be area-relative
    /// already.
    fn relative_to_area(&self, area: &str, path: &Path) -> Result<PathBuf, StoreError> {
        let root = normalize_path(&self.area_root(area)?);
        let path = normalize_path(path);
        if let Ok(stripped) = path.strip_prefix(&root) {
            return Ok(stripped.to_path_buf());
        }
        if path.is_relative() {
            return Ok(path);
        }
        Err(StoreError::OutsideArea {
            area: area.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. The filesystem is not consulted.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Anchor a relative path at the current working directory.
///
/// Absolute paths are only normalized. If the working directory cannot be
/// read the path is returned normalized but still relative.
pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_path(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize_path(&cwd.join(path)),
        Err(_) => normalize_path(path),
    }
}

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unknown area: '{0}'")]
    UnknownArea(String),

    #[error("Path {} is outside the '{area}' area", .path.display())]
    OutsideArea { area: String, path: PathBuf },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(path.to_path_buf())
        } else {
            StoreError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}
