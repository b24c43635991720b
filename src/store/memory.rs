//! In-memory document store for tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{DocumentStore, StoreError};

/// Document store holding files in memory.
///
/// Counts reads so tests can assert that a cached resolution does not touch
/// the store again.
#[derive(Debug, Default)]
pub struct MemoryStore {
    areas: BTreeMap<String, PathBuf>,
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store with no areas
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an area root
    pub fn with_area(mut self, area: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.areas.insert(area.into(), root.into());
        self
    }

    /// Seed a file
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Insert or replace a file without counting it as a write
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files().insert(path.into(), contents.into());
    }

    /// Current contents of a file, if present
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files().get(path).cloned()
    }

    /// Number of successful and failed `read` calls so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `write` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.files().contains_key(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.files().insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn area_root(&self, area: &str) -> Result<PathBuf, StoreError> {
        self.areas
            .get(area)
            .cloned()
            .ok_or_else(|| StoreError::UnknownArea(area.to_string()))
    }
}
