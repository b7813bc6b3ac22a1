//! Persistent Store Module
//!
//! The key/string-value storage contract the cache is built on, plus an
//! in-memory adapter and a JSON-file adapter.

mod file;
mod memory;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::StoreResult;

pub use file::FileStore;
pub use memory::MemoryStore;

// == Key Value Store ==
/// Asynchronous string key/value storage shared by the whole process.
///
/// A missing key is `Ok(None)`, never an error. Any method may fail with a
/// [`StoreError`](crate::error::StoreError) on I/O problems; callers decide
/// whether that matters.
#[async_trait]
pub trait KeyValueStore: Debug + Send + Sync {
    /// Returns the raw value stored under `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> StoreResult<()>;

    /// Deletes `key`. Deleting an absent key succeeds.
    async fn remove(&self, key: &str) -> StoreResult<()>;

    /// Wipes every key in the store.
    async fn clear(&self) -> StoreResult<()>;

    /// Returns every key currently stored.
    async fn keys(&self) -> StoreResult<Vec<String>>;

    /// Reads several keys at once, preserving request order.
    async fn multi_get(&self, keys: &[String]) -> StoreResult<Vec<(String, Option<String>)>>;

    /// Writes several pairs as one batch.
    async fn multi_set(&self, pairs: Vec<(String, String)>) -> StoreResult<()>;

    /// Deletes several keys as one batch.
    async fn multi_remove(&self, keys: &[String]) -> StoreResult<()>;
}
