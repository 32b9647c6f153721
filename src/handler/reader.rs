//! Cache reader: one batched get, payloads decoded per position.

use crate::cache::{is_sentinel, CacheBackend, Codec};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, warn};

pub(crate) struct CacheRead<K, V> {
    pub hits: HashMap<K, V>,
    pub decode_errors: usize,
    pub failed: bool,
}

/// `keys[i]` is stored under `cache_keys[i]`.
///
/// Never fails: a failing backend, a short response or an undecodable
/// payload all degrade to misses.
pub(crate) async fn read_cache<K, V>(
    keys: &[K],
    cache_keys: &[String],
    backend: &dyn CacheBackend,
    codec: &dyn Codec<V>,
) -> CacheRead<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Default,
{
    let mut read = CacheRead {
        hits: HashMap::with_capacity(keys.len()),
        decode_errors: 0,
        failed: false,
    };

    let raw = match backend.get_many(cache_keys).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(backend = backend.name(), error = %e, "cache read failed, treating batch as missed");
            read.failed = true;
            return read;
        }
    };
    if raw.len() != cache_keys.len() {
        warn!(
            backend = backend.name(),
            expected = cache_keys.len(),
            got = raw.len(),
            "cache returned a mismatched batch, missing positions count as misses"
        );
    }
    debug!(keys = ?cache_keys, found = raw.iter().filter(|v| v.is_some()).count(), "fetch from cache");

    for ((key, cache_key), value) in keys.iter().zip(cache_keys).zip(raw) {
        let Some(value) = value else {
            continue;
        };
        if is_sentinel(&value) {
            read.hits.insert(key.clone(), V::default());
            continue;
        }
        match codec.decode(&value) {
            Ok(decoded) => {
                read.hits.insert(key.clone(), decoded);
            }
            Err(e) => {
                warn!(key = %cache_key, error = %e, "undecodable cache payload, treating as miss");
                read.decode_errors += 1;
            }
        }
    }
    read
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{JsonCodec, MemoryCache};
    use crate::{Error, Result};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Broken;

    #[async_trait]
    impl CacheBackend for Broken {
        async fn get_many(&self, _keys: &[String]) -> Result<Vec<Option<String>>> {
            Err(Error::cache("redis unavailable"))
        }
        async fn set_many(&self, _: HashMap<String, String>, _: Duration) -> Result<()> {
            Ok(())
        }
        fn name(&self) -> &'static str {
            "broken"
        }
    }

    struct Short;

    #[async_trait]
    impl CacheBackend for Short {
        async fn get_many(&self, _keys: &[String]) -> Result<Vec<Option<String>>> {
            Ok(vec![Some("[1]".to_string())])
        }
        async fn set_many(&self, _: HashMap<String, String>, _: Duration) -> Result<()> {
            Ok(())
        }
        fn name(&self) -> &'static str {
            "short"
        }
    }

    fn cache_keys(keys: &[u32]) -> Vec<String> {
        keys.iter().map(|k| format!("k:{}", k)).collect()
    }

    #[tokio::test]
    async fn test_hits_sentinels_and_bad_payloads() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.insert("k:1", "[1,2]", ttl);
        cache.insert("k:2", "", ttl);
        cache.insert("k:3", "{broken", ttl);

        let keys = [1u32, 2, 3, 4];
        let read = read_cache(&keys, &cache_keys(&keys), &cache, &JsonCodec::<Vec<u32>>::new()).await;

        assert_eq!(read.hits.len(), 2);
        assert_eq!(read.hits[&1], vec![1, 2]);
        assert_eq!(read.hits[&2], Vec::<u32>::new());
        assert!(!read.hits.contains_key(&3));
        assert!(!read.hits.contains_key(&4));
        assert_eq!(read.decode_errors, 1);
        assert!(!read.failed);
    }

    #[tokio::test]
    async fn test_sentinel_is_known_empty_for_single() {
        let cache = MemoryCache::new();
        cache.insert("k:9", "", Duration::from_secs(60));
        let keys = [9u32];
        let read = read_cache(&keys, &cache_keys(&keys), &cache, &JsonCodec::<Option<u32>>::new()).await;
        assert_eq!(read.hits.get(&9), Some(&None));
    }

    #[tokio::test]
    async fn test_failing_backend_degrades_to_all_miss() {
        let keys = [1u32, 2];
        let read = read_cache(&keys, &cache_keys(&keys), &Broken, &JsonCodec::<Vec<u32>>::new()).await;
        assert!(read.hits.is_empty());
        assert!(read.failed);
    }

    #[tokio::test]
    async fn test_short_response_counts_missing_positions_as_misses() {
        let keys = [1u32, 2, 3];
        let read = read_cache(&keys, &cache_keys(&keys), &Short, &JsonCodec::<Vec<u32>>::new()).await;
        assert_eq!(read.hits.len(), 1);
        assert_eq!(read.hits[&1], vec![1]);
    }
}
