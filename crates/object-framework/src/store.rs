//! # Durable State Store
//!
//! The persistence boundary of an object. The framework only ever needs two
//! operations, `get` and `put`, so any key-value medium can sit behind
//! [`DurableStore`]. Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: process-local map. Survives object restarts, not process restarts.
//! - [`FileStore`]: a JSON document on disk, replaced atomically on every write.
//!
//! Objects never see the raw store; they get an [`ObjectStorage`] scoped to their
//! own name, so two objects in one namespace can't clobber each other's keys.

use crate::error::StoreError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Opaque key-value persistence with crash-consistent writes.
///
/// A successful `put` means the value is durable: a subsequent `get`, even from a
/// freshly constructed object instance, observes it.
#[async_trait]
pub trait DurableStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store.
///
/// The whole map lives in one JSON file. Writes go to a sibling temp file which is
/// synced and renamed over the original, so a crash leaves either the old or the new
/// document on disk, never a torn one. The in-memory cache is only updated once the
/// rename succeeded.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens (or lazily creates) the store at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), keys = entries.len(), "File store opened");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next).await?;
        *entries = next;
        debug!(key, "Persisted");
        Ok(())
    }
}

/// A [`DurableStore`] view scoped to one object name.
///
/// Keys are stored as `"<object>/<key>"`.
#[derive(Clone)]
pub struct ObjectStorage {
    store: Arc<dyn DurableStore>,
    scope: String,
}

impl ObjectStorage {
    pub fn new(store: Arc<dyn DurableStore>, scope: impl Into<String>) -> Self {
        Self {
            store,
            scope: scope.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}/{}", self.scope, key)
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.store.get(&self.scoped(key)).await
    }

    /// Reads `key`, substituting `default` when it has never been written.
    pub async fn get_or(&self, key: &str, default: &str) -> Result<String, StoreError> {
        Ok(self
            .get(key)
            .await?
            .unwrap_or_else(|| default.to_string()))
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.store.put(&self.scoped(key), value).await
    }
}
