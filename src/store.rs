//! Content-store boundary: a key-value blob store addressable by string path.
//!
//! The pipeline must behave identically against a local filesystem and a
//! remote object store, so everything goes through the [`ContentStore`]
//! trait. [`LocalStore`] backs onto a directory; [`MemoryStore`] is the
//! offline substitute used by tests, with per-path fault injection so
//! storage-failure paths can be exercised deterministically.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;

use crate::error::RenterKitError;

/// A key-value blob store addressable by string path.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), RenterKitError>;
    async fn get(&self, path: &str) -> Result<Vec<u8>, RenterKitError>;
    /// Delete a blob. Deleting a missing path is not an error.
    async fn delete(&self, path: &str) -> Result<(), RenterKitError>;
    async fn exists(&self, path: &str) -> Result<bool, RenterKitError>;
    /// Public URL for a stored blob.
    fn url_for(&self, path: &str) -> String;
    /// URL reachable from the application server itself, when that differs
    /// from the public one (e.g. a private object-store hostname).
    fn internal_url_for(&self, path: &str) -> String {
        self.url_for(path)
    }
}

fn storage_err(path: &str, detail: impl ToString) -> RenterKitError {
    RenterKitError::Storage {
        path: path.to_string(),
        detail: detail.to_string(),
    }
}

/// Filesystem-backed store rooted at a base directory.
pub struct LocalStore {
    base_dir: PathBuf,
    public_base_url: String,
    internal_base_url: Option<String>,
}

impl LocalStore {
    pub async fn new(
        base_dir: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, RenterKitError> {
        let base_dir = base_dir.into();
        if !base_dir.exists() {
            fs::create_dir_all(&base_dir)
                .await
                .map_err(|e| storage_err(&base_dir.to_string_lossy(), e))?;
        }
        Ok(LocalStore {
            base_dir,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            internal_base_url: None,
        })
    }

    /// Set a distinct base URL for application-internal access.
    pub fn with_internal_base_url(mut self, url: impl Into<String>) -> Self {
        self.internal_base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }
}

#[async_trait]
impl ContentStore for LocalStore {
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), RenterKitError> {
        let full = self.base_dir.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_err(path, e))?;
        }
        fs::write(full, bytes).await.map_err(|e| storage_err(path, e))
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, RenterKitError> {
        fs::read(self.base_dir.join(path))
            .await
            .map_err(|e| storage_err(path, e))
    }

    async fn delete(&self, path: &str) -> Result<(), RenterKitError> {
        match fs::remove_file(self.base_dir.join(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_err(path, e)),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, RenterKitError> {
        fs::try_exists(self.base_dir.join(path))
            .await
            .map_err(|e| storage_err(path, e))
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }

    fn internal_url_for(&self, path: &str) -> String {
        match &self.internal_base_url {
            Some(base) => format!("{base}/{path}"),
            None => self.url_for(path),
        }
    }
}

/// In-memory store for tests and offline development.
///
/// `poison(suffix)` makes subsequent operations on any matching path fail
/// with a storage error, which is how tests drive the no-partial-state
/// guarantees. Suffix matching exists because ingestion paths embed fresh
/// UUIDs a test cannot know in advance.
#[derive(Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    poisoned: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a path, or path suffix, so operations against it fail.
    pub fn poison(&self, suffix: impl Into<String>) {
        self.poisoned.lock().unwrap().insert(suffix.into());
    }

    fn check_poisoned(&self, path: &str) -> Result<(), RenterKitError> {
        if self
            .poisoned
            .lock()
            .unwrap()
            .iter()
            .any(|s| path.ends_with(s.as_str()))
        {
            return Err(storage_err(path, "injected storage failure"));
        }
        Ok(())
    }

    /// Number of blobs currently held.
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paths currently held, sorted, for assertions.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.blobs.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), RenterKitError> {
        self.check_poisoned(path)?;
        self.blobs.lock().unwrap().insert(path.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, RenterKitError> {
        self.check_poisoned(path)?;
        self.blobs
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| storage_err(path, "not found"))
    }

    async fn delete(&self, path: &str) -> Result<(), RenterKitError> {
        self.check_poisoned(path)?;
        self.blobs.lock().unwrap().remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, RenterKitError> {
        Ok(self.blobs.lock().unwrap().contains_key(path))
    }

    fn url_for(&self, path: &str) -> String {
        format!("memory://{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();
        store.put("a/b.jpg", vec![1, 2, 3]).await.unwrap();
        assert!(store.exists("a/b.jpg").await.unwrap());
        assert_eq!(store.get("a/b.jpg").await.unwrap(), vec![1, 2, 3]);
        store.delete("a/b.jpg").await.unwrap();
        assert!(!store.exists("a/b.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn memory_store_delete_missing_is_ok() {
        let store = MemoryStore::new();
        store.delete("never/was.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn memory_store_poison_fails_writes() {
        let store = MemoryStore::new();
        store.poison("bad.jpg");
        let err = store.put("bad.jpg", vec![0]).await.unwrap_err();
        assert!(matches!(err, RenterKitError::Storage { .. }));
    }

    #[tokio::test]
    async fn local_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "http://localhost:9000/media")
            .await
            .unwrap()
            .with_internal_base_url("http://minio:9000/media");
        store.put("uploads/ann/x.jpg", vec![9, 9]).await.unwrap();
        assert!(store.exists("uploads/ann/x.jpg").await.unwrap());
        assert_eq!(store.get("uploads/ann/x.jpg").await.unwrap(), vec![9, 9]);
        assert_eq!(
            store.url_for("uploads/ann/x.jpg"),
            "http://localhost:9000/media/uploads/ann/x.jpg"
        );
        assert_eq!(
            store.internal_url_for("uploads/ann/x.jpg"),
            "http://minio:9000/media/uploads/ann/x.jpg"
        );
        store.delete("uploads/ann/x.jpg").await.unwrap();
        assert!(!store.exists("uploads/ann/x.jpg").await.unwrap());
        // deleting again is fine
        store.delete("uploads/ann/x.jpg").await.unwrap();
    }
}
