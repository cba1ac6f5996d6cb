//! Key-value persistence backends
//!
//! The ledger only needs opaque `load`/`save` of named blobs plus an append
//! for the settlement log. `FileStore` maps each key to a file; `MemoryStore`
//! keeps everything in a map for tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::file_io;
use crate::error::SplitError;

/// Opaque blob storage keyed by name
pub trait KeyValueStore: Send + Sync {
    /// Load a blob, `None` if it was never saved
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SplitError>;

    /// Replace a blob
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), SplitError>;

    /// Add bytes to the end of a blob
    fn append(&self, key: &str, bytes: &[u8]) -> Result<(), SplitError> {
        let mut current = self.load(key)?.unwrap_or_default();
        current.extend_from_slice(bytes);
        self.save(key, &current)
    }
}

/// One file per key under a root directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing a key
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SplitError> {
        file_io::read_optional(self.path_for(key))
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), SplitError> {
        file_io::write_atomic(self.path_for(key), bytes)
    }

    fn append(&self, key: &str, bytes: &[u8]) -> Result<(), SplitError> {
        file_io::append(self.path_for(key), bytes)
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SplitError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| SplitError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(blobs.get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), SplitError> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| SplitError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Wrapper that can be switched to refuse every write
///
/// Reads always pass through. Once sealed, `save` and `append` fail without
/// touching the inner store.
pub struct GuardedStore {
    inner: Arc<dyn KeyValueStore>,
    sealed: RwLock<Option<String>>,
}

impl GuardedStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner,
            sealed: RwLock::new(None),
        }
    }

    /// Refuse all further writes, remembering why
    pub fn seal(&self, reason: impl Into<String>) -> Result<(), SplitError> {
        let mut sealed = self
            .sealed
            .write()
            .map_err(|e| SplitError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        *sealed = Some(reason.into());
        Ok(())
    }

    /// Why writes are refused, if they are
    pub fn sealed_reason(&self) -> Result<Option<String>, SplitError> {
        let sealed = self
            .sealed
            .read()
            .map_err(|e| SplitError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(sealed.clone())
    }

    fn check_writable(&self, key: &str) -> Result<(), SplitError> {
        match self.sealed_reason()? {
            Some(reason) => Err(SplitError::Storage(format!(
                "Refusing to write '{}': the ledger is read-only because it failed to load ({})",
                key, reason
            ))),
            None => Ok(()),
        }
    }
}

impl KeyValueStore for GuardedStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SplitError> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), SplitError> {
        self.check_writable(key)?;
        self.inner.save(key, bytes)
    }

    fn append(&self, key: &str, bytes: &[u8]) -> Result<(), SplitError> {
        self.check_writable(key)?;
        self.inner.append(key, bytes)
    }
}

impl std::fmt::Debug for GuardedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedStore")
            .field("sealed", &self.sealed_reason().ok().flatten())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(store: &dyn KeyValueStore) {
        assert!(store.load("missing").unwrap().is_none());

        store.save("blob", b"first").unwrap();
        store.save("blob", b"second").unwrap();
        assert_eq!(store.load("blob").unwrap().unwrap(), b"second");

        store.append("log", b"a\n").unwrap();
        store.append("log", b"b\n").unwrap();
        assert_eq!(store.load("log").unwrap().unwrap(), b"a\nb\n");
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_guarded_store_refuses_writes_once_sealed() {
        let inner = Arc::new(MemoryStore::new());
        let store = GuardedStore::new(inner.clone());
        exercise(&store);

        store.seal("bad line").unwrap();
        assert!(store.save("blob", b"lost").is_err());
        assert!(store.append("log", b"c\n").is_err());
        assert_eq!(store.load("blob").unwrap().unwrap(), b"second");
        assert_eq!(inner.load("log").unwrap().unwrap(), b"a\nb\n");
        assert_eq!(store.sealed_reason().unwrap().as_deref(), Some("bad line"));
    }

    #[test]
    fn test_file_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        exercise(&store);
        assert!(store.path_for("blob").exists());
    }
}
