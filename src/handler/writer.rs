//! Cache writer: negative caching and the batched write-back.

use crate::cache::{CacheBackend, Codec, EMPTY_SENTINEL};
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tracing::{error, info, warn};

pub(crate) type Predicate<V> = dyn Fn(&V) -> bool + Send + Sync;

/// What to do with each missed key.
pub(crate) struct WritePolicy<'a, V> {
    pub no_cache: &'a Predicate<V>,
    pub empty: &'a Predicate<V>,
    pub codec: &'a dyn Codec<V>,
    pub max_entry_size: usize,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct WriteOutcome {
    pub written: usize,
    pub negative: usize,
    pub encode_errors: usize,
    pub oversized: usize,
    pub failed: bool,
}

/// Decide the payload of every missed key.
///
/// Keys the store returned nothing for are judged on the absent value
/// (`V::default()`), so they can still be negatively cached.
pub(crate) fn plan_writes<K, V, M>(
    missed: &[K],
    fetched: &HashMap<K, V>,
    cache_key: M,
    policy: &WritePolicy<'_, V>,
    outcome: &mut WriteOutcome,
) -> HashMap<String, String>
where
    K: Eq + Hash,
    V: Default,
    M: Fn(&K) -> String,
{
    let absent = V::default();
    let mut entries = HashMap::with_capacity(missed.len());
    for key in missed {
        let value = fetched.get(key).unwrap_or(&absent);
        if (policy.no_cache)(value) {
            continue;
        }
        let cache_key = cache_key(key);
        if (policy.empty)(value) {
            entries.insert(cache_key, EMPTY_SENTINEL.to_string());
            outcome.negative += 1;
            continue;
        }
        match policy.codec.encode(value) {
            Ok(encoded) if encoded.len() > policy.max_entry_size => {
                warn!(key = %cache_key, size = encoded.len(), limit = policy.max_entry_size, "payload too large, not caching");
                outcome.oversized += 1;
            }
            Ok(encoded) => {
                entries.insert(cache_key, encoded);
            }
            Err(e) => {
                error!(key = %cache_key, error = %e, "convert value to cache payload failed");
                outcome.encode_errors += 1;
            }
        }
    }
    entries
}

/// Plan and issue the single batched write. Never fails the load.
pub(crate) async fn write_cache<K, V, M>(
    missed: &[K],
    fetched: &HashMap<K, V>,
    cache_key: M,
    policy: &WritePolicy<'_, V>,
    backend: &dyn CacheBackend,
    ttl: Duration,
) -> WriteOutcome
where
    K: Eq + Hash,
    V: Default,
    M: Fn(&K) -> String,
{
    let mut outcome = WriteOutcome::default();
    if missed.is_empty() {
        return outcome;
    }
    let entries = plan_writes(missed, fetched, cache_key, policy, &mut outcome);
    if entries.is_empty() {
        return outcome;
    }

    let count = entries.len();
    let keys: Vec<String> = entries.keys().cloned().collect();
    match backend.set_many(entries, ttl).await {
        Ok(()) => {
            info!(keys = ?keys, expire_ms = ttl.as_millis() as u64, "multi-set cache");
            outcome.written = count;
        }
        Err(e) => {
            error!(backend = backend.name(), keys = count, error = %e, "cache multi-set failed");
            outcome.failed = true;
        }
    }
    outcome
}
