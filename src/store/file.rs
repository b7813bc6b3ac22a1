//! JSON-file store adapter.
//!
//! The whole namespace lives in one JSON object on disk. Reads are served
//! from memory; every mutation rewrites the document through a temp file and
//! a rename, so a crash leaves either the old or the new document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use super::KeyValueStore;
use crate::error::StoreResult;

// == File Store ==
/// Persistent store backed by a single JSON document.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl FileStore {
    // == Constructor ==
    /// Opens the store at `path`, loading existing contents.
    ///
    /// A missing file is an empty store. A file that is not a JSON object of
    /// strings is an error, so foreign data is never silently overwritten.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened file store");

        Ok(Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Mutate ==
    /// Applies `change` to a copy of the map, persists it, then publishes it.
    ///
    /// The in-memory view only changes once the write has reached disk.
    async fn mutate<F>(&self, change: F) -> StoreResult<()>
    where
        F: FnOnce(&mut HashMap<String, String>) + Send,
    {
        let mut guard = self.entries.write().await;
        let mut next = guard.clone();
        change(&mut next);
        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        self.mutate(|map| {
            map.insert(key.to_string(), value);
        })
        .await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        if !self.entries.read().await.contains_key(key) {
            return Ok(());
        }
        self.mutate(|map| {
            map.remove(key);
        })
        .await
    }

    async fn clear(&self) -> StoreResult<()> {
        self.mutate(|map| map.clear()).await
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn multi_get(&self, keys: &[String]) -> StoreResult<Vec<(String, Option<String>)>> {
        let guard = self.entries.read().await;
        Ok(keys
            .iter()
            .map(|key| (key.clone(), guard.get(key).cloned()))
            .collect())
    }

    async fn multi_set(&self, pairs: Vec<(String, String)>) -> StoreResult<()> {
        self.mutate(|map| map.extend(pairs)).await
    }

    async fn multi_remove(&self, keys: &[String]) -> StoreResult<()> {
        self.mutate(|map| {
            for key in keys {
                map.remove(key);
            }
        })
        .await
    }
}
