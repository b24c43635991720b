//! Filesystem-backed document store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{absolute_path, DocumentStore, StoreError};

/// Document store over the local filesystem.
///
/// Each area maps to a root directory. Relative roots are anchored at the
/// working directory when registered. Writes create missing parent
/// directories.
#[derive(Debug, Clone, Default)]
pub struct FsStore {
    areas: BTreeMap<String, PathBuf>,
}

impl FsStore {
    /// Create a store with no areas
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from an area table
    pub fn from_areas(areas: BTreeMap<String, PathBuf>) -> Self {
        let areas = areas
            .into_iter()
            .map(|(area, root)| (area, absolute_path(&root)))
            .collect();
        Self { areas }
    }

    /// Register (or replace) an area root
    pub fn with_area(mut self, area: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.areas.insert(area.into(), absolute_path(&root.into()));
        self
    }

    /// Registered areas
    pub fn areas(&self) -> &BTreeMap<String, PathBuf> {
        &self.areas
    }
}

impl DocumentStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        fs::read(path).map_err(|e| StoreError::io(path, e))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        fs::write(path, contents).map_err(|e| StoreError::io(path, e))
    }

    fn area_root(&self, area: &str) -> Result<PathBuf, StoreError> {
        self.areas
            .get(area)
            .cloned()
            .ok_or_else(|| StoreError::UnknownArea(area.to_string()))
    }
}
