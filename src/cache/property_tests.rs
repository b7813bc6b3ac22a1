//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's freshness, eviction and batch
//! behavior over generated keys, payloads and timings.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::Value;
use tokio_test::block_on;

use crate::cache::TimedCache;
use crate::clock::ManualClock;
use crate::store::{KeyValueStore, MemoryStore};

// == Test Configuration ==
const T0: i64 = 1_700_000_000_000;
const TTL_MS: i64 = 5 * 60 * 1000;

fn create_test_cache() -> (TimedCache, MemoryStore, ManualClock) {
    let store = MemoryStore::new();
    let clock = ManualClock::new(T0);
    let cache = TimedCache::new(Arc::new(store.clone())).with_clock(clock.clone());
    (cache, store, clock)
}

// == Strategies ==
/// Generates cache keys shaped like the ones the app uses
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("video_feed".to_string()),
        Just("trending_videos".to_string()),
        Just("user_profile".to_string()),
        "[a-z0-9]{1,12}".prop_map(|id| format!("video_{}", id)),
    ]
}

/// Generates arbitrary JSON payloads without floats
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,32}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::hash_map("[a-z]{1,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Generates an age in milliseconds on either side of the TTL
fn age_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![0..=TTL_MS, (TTL_MS + 1)..(TTL_MS * 3), Just(TTL_MS), Just(TTL_MS + 1)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Any JSON payload read back inside the window equals what was written.
    #[test]
    fn prop_roundtrip_within_ttl(
        key in key_strategy(),
        value in json_strategy(),
        age in 0..=TTL_MS
    ) {
        let (cache, _store, clock) = create_test_cache();

        let retrieved: Option<Value> = block_on(async {
            cache.set(&key, &value).await;
            clock.advance(age);
            cache.get(&key).await
        });

        prop_assert_eq!(retrieved, Some(value));
    }

    // Past the window the entry reads as absent, and stays absent because
    // it was deleted from the store.
    #[test]
    fn prop_expired_entry_is_evicted(
        key in key_strategy(),
        value in json_strategy(),
        overshoot in 1..TTL_MS
    ) {
        let (cache, store, clock) = create_test_cache();

        let (first, second, present) = block_on(async {
            cache.set(&key, &value).await;
            clock.advance(TTL_MS + overshoot);
            let first: Option<Value> = cache.get(&key).await;
            let second: Option<Value> = cache.get(&key).await;
            (first, second, store.contains(&key).await)
        });

        prop_assert!(first.is_none());
        prop_assert!(second.is_none());
        prop_assert!(!present, "Expired key should be gone from the store");
    }

    // The last write to a key wins.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in json_strategy(),
        value2 in json_strategy()
    ) {
        let (cache, store, _clock) = create_test_cache();

        let (retrieved, len) = block_on(async {
            cache.set(&key, &value1).await;
            cache.set(&key, &value2).await;
            let retrieved: Option<Value> = cache.get(&key).await;
            (retrieved, store.len().await)
        });

        prop_assert_eq!(retrieved, Some(value2));
        prop_assert_eq!(len, 1);
    }

    // Removing twice is harmless and leaves nothing behind.
    #[test]
    fn prop_remove_is_idempotent(key in key_strategy(), value in json_strategy()) {
        let (cache, _store, _clock) = create_test_cache();

        let retrieved: Option<Value> = block_on(async {
            cache.set(&key, &value).await;
            cache.remove(&key).await;
            cache.remove(&key).await;
            cache.get(&key).await
        });

        prop_assert!(retrieved.is_none());
    }

    // A batch read gives the same per-key answers as reading one key at a time.
    #[test]
    fn prop_batch_matches_single_reads(
        entries in prop::collection::hash_map(key_strategy(), (any::<i64>(), age_strategy()), 1..8),
        extra in prop::collection::vec(key_strategy(), 0..4)
    ) {
        let (batch_cache, _batch_store, batch_clock) = create_test_cache();
        let (single_cache, single_store, single_clock) = create_test_cache();

        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.extend(extra);

        let (batch, single, leftover) = block_on(async {
            // Write each entry so that its age at read time is the generated age.
            let horizon = TTL_MS * 3;
            for (key, (value, age)) in &entries {
                for (cache, clock) in [(&batch_cache, &batch_clock), (&single_cache, &single_clock)] {
                    clock.set(T0 + horizon - age);
                    cache.set(key, value).await;
                }
            }
            batch_clock.set(T0 + horizon);
            single_clock.set(T0 + horizon);

            let batch: HashMap<String, Option<i64>> = batch_cache.get_multiple(&keys).await;
            let mut single = HashMap::new();
            for key in &keys {
                single.insert(key.clone(), single_cache.get::<i64>(key).await);
            }
            (batch, single, single_store.len().await)
        });

        prop_assert_eq!(&batch, &single);

        let fresh = entries.values().filter(|(_, age)| *age <= TTL_MS).count();
        prop_assert_eq!(leftover, fresh, "Only fresh entries survive the reads");
    }

    // Hit and miss counters agree with what the reads returned.
    #[test]
    fn prop_statistics_accuracy(
        writes in prop::collection::vec(key_strategy(), 0..10),
        reads in prop::collection::vec(key_strategy(), 1..20)
    ) {
        let (cache, _store, _clock) = create_test_cache();

        let (expected_hits, expected_misses, stats) = block_on(async {
            for key in &writes {
                cache.set(key, &1).await;
            }
            let (mut hits, mut misses) = (0u64, 0u64);
            for key in &reads {
                match cache.get::<i32>(key).await {
                    Some(_) => hits += 1,
                    None => misses += 1,
                }
            }
            (hits, misses, cache.stats().await)
        });

        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // clear_all leaves no readable entry behind.
    #[test]
    fn prop_clear_all_wipes_everything(
        entries in prop::collection::hash_map(key_strategy(), json_strategy(), 1..10)
    ) {
        let (cache, store, _clock) = create_test_cache();

        let (reads, remaining) = block_on(async {
            for (key, value) in &entries {
                cache.set(key, value).await;
            }
            cache.clear_all().await;

            let mut reads = Vec::new();
            for key in entries.keys() {
                reads.push(cache.get::<Value>(key).await);
            }
            (reads, store.keys().await.unwrap_or_default())
        });

        prop_assert!(reads.iter().all(Option::is_none));
        prop_assert!(remaining.is_empty());
    }
}
