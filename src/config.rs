//! Configuration Module
//!
//! Handles loading cache and backend settings from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

/// Runtime configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Freshness window in seconds for every cache entry
    pub ttl_secs: u64,
    /// Location of the persistent store document
    pub store_path: PathBuf,
    /// Optional key prefix scoping the cache inside a shared store
    pub namespace: Option<String>,
    /// Backend base URL
    pub api_base_url: String,
    /// Per-request timeout in seconds
    pub api_timeout_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_SECS` - Entry freshness window (default: 300)
    /// - `CACHE_STORE_PATH` - Store file (default: `store.json` in the platform cache dir)
    /// - `CACHE_NAMESPACE` - Key prefix owned by the cache (default: unset, whole store)
    /// - `API_BASE_URL` - Backend base URL (default: http://localhost:3000)
    /// - `API_TIMEOUT_SECS` - Request timeout (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_secs: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ttl_secs),
            store_path: env::var("CACHE_STORE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            namespace: env::var("CACHE_NAMESPACE").ok().filter(|v| !v.is_empty()),
            api_base_url: env::var("API_BASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base_url),
            api_timeout_secs: env::var("API_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.api_timeout_secs),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            store_path: default_store_path(),
            namespace: None,
            api_base_url: "http://localhost:3000".to_string(),
            api_timeout_secs: 10,
        }
    }
}

/// `store.json` under the platform cache directory, or the working directory
/// when no home directory is available.
fn default_store_path() -> PathBuf {
    ProjectDirs::from("", "", "feed_cache")
        .map(|dirs| dirs.cache_dir().join("store.json"))
        .unwrap_or_else(|| PathBuf::from("feed_cache_store.json"))
}
