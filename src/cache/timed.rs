//! Timed Cache Module
//!
//! Main cache engine: JSON-encoded, timestamped entries over an injected
//! persistent store, with lazy expiry on read.
//!
//! Every public operation is infallible from the caller's point of view.
//! Store failures, corrupt entries and unserializable payloads are logged,
//! counted, and turned into a miss or a no-op. A cache that always fails
//! behaves like an empty cache.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats};
use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::store::KeyValueStore;

// == Public Constants ==
/// How long an entry stays fresh unless the cache is built with another TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

// == Timed Cache ==
/// Best-effort, time-boxed cache over a [`KeyValueStore`].
///
/// The cache never talks to the network. Callers check it first, fetch on a
/// miss, and write the result back with [`TimedCache::set`]. Clones share the
/// same store, clock and statistics.
#[derive(Debug, Clone)]
pub struct TimedCache {
    /// Persistent backing store
    store: Arc<dyn KeyValueStore>,
    /// Time source for timestamps and freshness checks
    clock: Arc<dyn Clock>,
    /// Freshness window in milliseconds, shared by every entry
    ttl_ms: i64,
    /// Optional key prefix marking which store keys belong to this cache
    namespace: Option<String>,
    /// Effectiveness counters
    stats: Arc<RwLock<CacheStats>>,
}

impl TimedCache {
    // == Constructor ==
    /// Creates a cache over `store` with the default TTL and the system clock.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            ttl_ms: DEFAULT_TTL.as_millis() as i64,
            namespace: None,
            stats: Arc::new(RwLock::new(CacheStats::new())),
        }
    }

    // == Builders ==
    /// Replaces the freshness window for every entry.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Scopes the cache to store keys starting with `prefix`.
    ///
    /// Entries are written as `prefix + key`, and [`TimedCache::clear_all`]
    /// only removes keys carrying the prefix. Without a namespace the cache
    /// treats the whole store as its own.
    pub fn with_namespace(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.namespace = (!prefix.is_empty()).then_some(prefix);
        self
    }

    // == TTL ==
    /// Freshness window shared by every entry.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms.max(0) as u64)
    }

    // == Namespace ==
    /// Key prefix owned by this cache, if scoped.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    // == Set ==
    /// Stores `data` under `key` stamped with the current time, replacing any
    /// previous entry.
    ///
    /// Serialization or store failure leaves the store untouched and is only
    /// logged.
    pub async fn set<T>(&self, key: &str, data: &T)
    where
        T: Serialize + ?Sized,
    {
        let entry = CacheEntry::new(data, self.clock.now_ms());
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Cache set skipped for key {}: payload not serializable: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.store.set(&self.storage_key(key), raw).await {
            self.store_failed("set", key, &e).await;
        }
    }

    // == Get ==
    /// Returns the cached payload for `key` if present and fresh.
    ///
    /// A stale entry is deleted from the store before `None` is returned.
    /// Absent keys, undecodable entries and store failures are all `None`.
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let storage_key = self.storage_key(key);
        let raw = match self.store.get(&storage_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.stats.write().await.record_miss();
                return None;
            }
            Err(e) => {
                self.store_failed("get", key, &e).await;
                self.stats.write().await.record_miss();
                return None;
            }
        };

        let Some(entry) = decode_entry::<T>(key, &raw) else {
            self.stats.write().await.record_miss();
            return None;
        };

        if !entry.is_fresh(self.clock.now_ms(), self.ttl_ms) {
            debug!("Cache entry {} expired, evicting", key);
            if let Err(e) = self.store.remove(&storage_key).await {
                self.store_failed("evict", key, &e).await;
            }
            let mut stats = self.stats.write().await;
            stats.record_expirations(1);
            stats.record_miss();
            return None;
        }

        self.stats.write().await.record_hit();
        Some(entry.data)
    }

    // == Remove ==
    /// Deletes the entry for `key`. Absent keys are a no-op.
    pub async fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(&self.storage_key(key)).await {
            self.store_failed("remove", key, &e).await;
        }
    }

    // == Clear All ==
    /// Drops every entry the cache owns.
    ///
    /// Without a namespace this wipes the entire underlying store, including
    /// anything other components keep there. With a namespace only prefixed
    /// keys are removed.
    pub async fn clear_all(&self) {
        let result = match &self.namespace {
            None => self.store.clear().await,
            Some(_) => match self.owned_keys().await {
                Ok(keys) if keys.is_empty() => Ok(()),
                Ok(keys) => self.store.multi_remove(&keys).await,
                Err(e) => Err(e),
            },
        };

        match result {
            Ok(()) => info!("Cache cleared"),
            Err(e) => self.store_failed("clear", "*", &e).await,
        }
    }

    // == Set Multiple ==
    /// Writes every item as a fresh entry in one batched store write.
    ///
    /// All entries share one timestamp. Items whose payload cannot be
    /// serialized are skipped; the rest are still written.
    pub async fn set_multiple<K, T>(&self, items: &[(K, T)])
    where
        K: AsRef<str>,
        T: Serialize,
    {
        let now = self.clock.now_ms();
        let pairs: Vec<(String, String)> = items
            .iter()
            .filter_map(|(key, data)| {
                let key = key.as_ref();
                match serde_json::to_string(&CacheEntry::new(data, now)) {
                    Ok(raw) => Some((self.storage_key(key), raw)),
                    Err(e) => {
                        warn!("Cache set skipped for key {}: payload not serializable: {}", key, e);
                        None
                    }
                }
            })
            .collect();

        if pairs.is_empty() {
            return;
        }

        let count = pairs.len();
        match self.store.multi_set(pairs).await {
            Ok(()) => debug!("Cached {} entries in one batch", count),
            Err(e) => self.store_failed("set_multiple", "*", &e).await,
        }
    }

    // == Get Multiple ==
    /// Reads all `keys` in one batched store read.
    ///
    /// Every requested key appears in the result: `Some` for fresh entries,
    /// `None` for absent, stale or undecodable ones. Stale entries found in
    /// the batch are evicted with one batched delete, same as single reads.
    /// Repeated keys are read and counted once. If the batch read itself
    /// fails the result is empty.
    pub async fn get_multiple<K, T>(&self, keys: &[K]) -> HashMap<String, Option<T>>
    where
        K: AsRef<str>,
        T: DeserializeOwned,
    {
        let mut seen = HashSet::with_capacity(keys.len());
        let storage_keys: Vec<String> = keys
            .iter()
            .map(|k| self.storage_key(k.as_ref()))
            .filter(|k| seen.insert(k.clone()))
            .collect();
        let rows = match self.store.multi_get(&storage_keys).await {
            Ok(rows) => rows,
            Err(e) => {
                self.store_failed("get_multiple", "*", &e).await;
                return HashMap::new();
            }
        };

        let now = self.clock.now_ms();
        let mut results = HashMap::with_capacity(rows.len());
        let mut expired = Vec::new();
        let (mut hits, mut misses) = (0u64, 0u64);

        for (storage_key, raw) in rows {
            let key = self.caller_key(&storage_key).to_string();
            let entry = raw.as_deref().and_then(|raw| decode_entry::<T>(&key, raw));

            let value = match entry {
                Some(entry) if entry.is_fresh(now, self.ttl_ms) => Some(entry.data),
                Some(_) => {
                    expired.push(storage_key);
                    None
                }
                None => None,
            };

            if value.is_some() {
                hits += 1;
            } else {
                misses += 1;
            }
            results.insert(key, value);
        }

        if !expired.is_empty() {
            debug!("Evicting {} expired entries found in batch read", expired.len());
            if let Err(e) = self.store.multi_remove(&expired).await {
                self.store_failed("evict", "*", &e).await;
            }
        }

        let mut stats = self.stats.write().await;
        stats.hits += hits;
        stats.misses += misses;
        stats.record_expirations(expired.len() as u64);

        results
    }

    // == Purge Expired ==
    /// Sweeps the store and evicts every stale entry the cache owns.
    ///
    /// Values that are not cache entries are left alone. Returns the number
    /// of entries removed, or 0 if the sweep could not complete.
    pub async fn purge_expired(&self) -> usize {
        let keys = match self.owned_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                self.store_failed("purge", "*", &e).await;
                return 0;
            }
        };
        if keys.is_empty() {
            return 0;
        }

        let rows = match self.store.multi_get(&keys).await {
            Ok(rows) => rows,
            Err(e) => {
                self.store_failed("purge", "*", &e).await;
                return 0;
            }
        };

        let now = self.clock.now_ms();
        let expired: Vec<String> = rows
            .into_iter()
            .filter_map(|(key, raw)| {
                let entry: CacheEntry<IgnoredAny> = serde_json::from_str(raw.as_deref()?).ok()?;
                (!entry.is_fresh(now, self.ttl_ms)).then_some(key)
            })
            .collect();

        if expired.is_empty() {
            debug!("Purge: no expired entries found");
            return 0;
        }

        if let Err(e) = self.store.multi_remove(&expired).await {
            self.store_failed("purge", "*", &e).await;
            return 0;
        }

        let count = expired.len();
        self.stats.write().await.record_expirations(count as u64);
        info!("Purge: removed {} expired entries", count);
        count
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    // == Helpers ==
    fn storage_key(&self, key: &str) -> String {
        match &self.namespace {
            Some(prefix) => format!("{}{}", prefix, key),
            None => key.to_string(),
        }
    }

    fn caller_key<'a>(&self, storage_key: &'a str) -> &'a str {
        match &self.namespace {
            Some(prefix) => storage_key.strip_prefix(prefix.as_str()).unwrap_or(storage_key),
            None => storage_key,
        }
    }

    async fn owned_keys(&self) -> Result<Vec<String>, StoreError> {
        let keys = self.store.keys().await?;
        Ok(match &self.namespace {
            Some(prefix) => keys.into_iter().filter(|k| k.starts_with(prefix.as_str())).collect(),
            None => keys,
        })
    }

    async fn store_failed(&self, op: &str, key: &str, err: &StoreError) {
        warn!("Cache {} failed for key {}: {}", op, key, err);
        self.stats.write().await.record_store_error();
    }
}

/// Parses a stored entry, treating anything unreadable as a miss.
fn decode_entry<T: DeserializeOwned>(key: &str, raw: &str) -> Option<CacheEntry<T>> {
    match serde_json::from_str(raw) {
        Ok(entry) => Some(entry),
        Err(e) => {
            debug!("Ignoring undecodable cache entry {}: {}", key, e);
            None
        }
    }
}
