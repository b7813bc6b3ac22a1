//! Feed Cache - cache warm-up tool
//!
//! Opens the persistent store, drops expired entries, and prefetches the
//! shared backend endpoints that are not cached yet.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feed_cache::api::{HttpFetcher, VideoService};
use feed_cache::store::FileStore;
use feed_cache::{Config, TimedCache};

/// Main entry point for the warm-up tool.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the file store and build the cache over it
/// 4. Purge expired entries
/// 5. Prefetch uncached shared endpoints
/// 6. Log cache statistics
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feed_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: ttl={}s, store={}, api={}",
        config.ttl_secs,
        config.store_path.display(),
        config.api_base_url
    );

    let store = FileStore::open(&config.store_path)
        .await
        .with_context(|| format!("opening cache store at {}", config.store_path.display()))?;

    let mut cache = TimedCache::new(Arc::new(store)).with_ttl(config.ttl());
    if let Some(namespace) = &config.namespace {
        cache = cache.with_namespace(namespace.clone());
    }

    let fetcher = HttpFetcher::new(&config.api_base_url, config.api_timeout())
        .context("building HTTP client")?;
    let service = VideoService::new(cache.clone(), Arc::new(fetcher));

    let purged = cache.purge_expired().await;
    let fetched = service.warm_up().await;

    let stats = cache.stats().await;
    info!(
        "Done: purged={}, fetched={}, hits={}, misses={}, store_errors={}",
        purged, fetched, stats.hits, stats.misses, stats.store_errors
    );

    Ok(())
}
