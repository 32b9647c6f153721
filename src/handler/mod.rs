//! 批量读穿缓存编排：先查缓存，未命中再批量查库，回写缓存并按原始顺序合并。
//!
//! # Batch Read-Through Handler
//!
//! A [`BatchHandler`] resolves a batch of keys against a fast cache first,
//! sends only the misses to the authoritative store, writes what the store
//! returned back into the cache and hands the merged result back in the
//! caller's key order.
//!
//! ## Pipeline
//!
//! | Stage | Description |
//! |-------|-------------|
//! | normalize | Drop `None`s and duplicates, keep first-occurrence order |
//! | cache read | One batched get, payloads decoded, sentinels become "known empty" |
//! | misses | Normalized keys without a usable cache entry |
//! | store fetch | One batched lookup for the misses, records grouped by key |
//! | cache write | Skip / sentinel / encoded payload per miss, one batched set |
//! | merge | Cache hit first, store second, absent values dropped |
//!
//! With caching disabled, or without a backend, key mapper or codec, the
//! handler goes straight from normalize to store fetch to merge
//! ([`LoadPath::StoreOnly`]).
//!
//! ## Failure Semantics
//!
//! - Store errors are returned to the caller unchanged.
//! - Cache read errors and undecodable payloads turn into misses.
//! - Encode failures drop the affected key from the write.
//! - A failing batched write is logged and ignored; the load still succeeds.
//!
//! Concurrent loads for the same key may both miss and both write back.
//! Writes are plain overwrites, so this only costs extra store calls.
//!
//! ## Example
//!
//! ```rust
//! use batch_readthrough::cache::{MemoryCache, PrefixKeyMapper};
//! use batch_readthrough::handler::{HandlerConfig, MultiHandler};
//! use batch_readthrough::store::store_fn;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> batch_readthrough::Result<()> {
//! #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
//! struct Address { user_id: u64, city: String }
//!
//! let store = store_fn(|ids: Vec<u64>| async move {
//!     Ok(ids.into_iter()
//!         .filter(|id| *id != 3)
//!         .map(|user_id| Address { user_id, city: format!("city-{}", user_id) })
//!         .collect::<Vec<_>>())
//! });
//!
//! let handler = MultiHandler::new(store, |a: &Address| a.user_id)
//!     .with_cache(MemoryCache::new(), PrefixKeyMapper::new("addr"))
//!     .with_json_codec()
//!     .with_config(HandlerConfig::new().with_ttl(Duration::from_secs(60)));
//!
//! let addresses = handler.load_list([2u64, 1, 3, 2]).await?;
//! let users: Vec<u64> = addresses.iter().map(|a| a.user_id).collect();
//! assert_eq!(users, vec![2, 1]);
//! # Ok(())
//! # }
//! ```

mod cardinality;
mod config;
mod fetcher;
mod keys;
mod merge;
mod reader;
mod report;
mod writer;

pub use cardinality::{Cardinality, Multi, Single};
pub use config::HandlerConfig;
pub use keys::{missed_keys, normalize_keys};
pub use merge::Resolution;
pub use report::{LoadPath, LoadReport};

use crate::cache::{namespaced, CacheBackend, Codec, JsonCodec, KeyMapper};
use crate::store::BatchStore;
use crate::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;
use writer::{Predicate, WritePolicy};

/// One record per key.
pub type SingleHandler<K, R> = BatchHandler<K, R, Single>;
/// A list of records per key.
pub type MultiHandler<K, R> = BatchHandler<K, R, Multi>;

type Grouping<K, R> = dyn Fn(&R) -> K + Send + Sync;

/// Batch read-through orchestrator.
///
/// Built once with the `with_*` methods, then shared: every load takes
/// `&self` and keeps its intermediate state on the stack, so a handler can
/// sit behind an `Arc` and serve concurrent callers.
pub struct BatchHandler<K, R, C>
where
    K: Eq + Hash + Send + Sync,
    C: Cardinality<K, R>,
{
    config: HandlerConfig,
    store: Arc<dyn BatchStore<K, R>>,
    group: Arc<Grouping<K, R>>,
    cache: Option<Arc<dyn CacheBackend>>,
    mapper: Option<Arc<dyn KeyMapper<K>>>,
    codec: Option<Arc<dyn Codec<C::Value>>>,
    no_cache: Arc<Predicate<C::Value>>,
    empty: Arc<Predicate<C::Value>>,
    _cardinality: PhantomData<fn() -> C>,
}

/// The cache-side capabilities, present only on the read-through path.
struct CacheParts<'a, K, V> {
    backend: &'a dyn CacheBackend,
    mapper: &'a dyn KeyMapper<K>,
    codec: &'a dyn Codec<V>,
}

impl<K, R, C> BatchHandler<K, R, C>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    R: Send + Sync + 'static,
    C: Cardinality<K, R>,
{
    /// Store-only handler; attach a cache with [`with_cache`](Self::with_cache).
    ///
    /// `group` names the key each store record belongs to.
    pub fn new<S, G>(store: S, group: G) -> Self
    where
        S: BatchStore<K, R> + 'static,
        G: Fn(&R) -> K + Send + Sync + 'static,
    {
        Self {
            config: HandlerConfig::default(),
            store: Arc::new(store),
            group: Arc::new(group),
            cache: None,
            mapper: None,
            codec: None,
            no_cache: Arc::new(|_: &C::Value| false),
            empty: Arc::new(C::is_empty),
            _cardinality: PhantomData,
        }
    }

    /// Attach the cache backend and the key-to-cache-key mapping.
    pub fn with_cache<B, M>(mut self, backend: B, mapper: M) -> Self
    where
        B: CacheBackend + 'static,
        M: KeyMapper<K> + 'static,
    {
        self.cache = Some(Arc::new(backend));
        self.mapper = Some(Arc::new(mapper));
        self
    }

    /// Payload codec for cached values.
    pub fn with_codec<X>(mut self, codec: X) -> Self
    where
        X: Codec<C::Value> + 'static,
    {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// Shorthand for [`JsonCodec`] over the cached value type.
    pub fn with_json_codec(self) -> Self
    where
        C::Value: Serialize + DeserializeOwned,
    {
        self.with_codec(JsonCodec::<C::Value>::new())
    }

    /// Replace the configuration.
    ///
    /// The config is expected to pass [`HandlerConfig::validate`]; debug
    /// builds assert it. Configs read through `from_yaml`/`from_json` are
    /// already validated.
    pub fn with_config(mut self, config: HandlerConfig) -> Self {
        debug_assert!(
            config.validate().is_ok(),
            "invalid handler config: {:?}",
            config.validate().err()
        );
        self.config = config;
        self
    }

    /// Values this predicate accepts are never written to the cache.
    pub fn with_no_cache<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&C::Value) -> bool + Send + Sync + 'static,
    {
        self.no_cache = Arc::new(predicate);
        self
    }

    /// Values this predicate accepts are cached as the empty sentinel.
    pub fn with_empty<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&C::Value) -> bool + Send + Sync + 'static,
    {
        self.empty = Arc::new(predicate);
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Path the next load takes, decided by config and attached capabilities.
    pub fn path(&self) -> LoadPath {
        if self.cache_parts().is_some() {
            LoadPath::ReadThrough
        } else {
            LoadPath::StoreOnly
        }
    }

    fn cache_parts(&self) -> Option<CacheParts<'_, K, C::Value>> {
        if !self.config.enabled {
            return None;
        }
        Some(CacheParts {
            backend: self.cache.as_deref()?,
            mapper: self.mapper.as_deref()?,
            codec: self.codec.as_deref()?,
        })
    }

    fn cache_key(&self, mapper: &dyn KeyMapper<K>, key: &K) -> String {
        namespaced(self.config.key_prefix.as_deref(), mapper.cache_key(key))
    }

    /// Run the pipeline and return the unmerged resolution.
    ///
    /// Accepts keys or `Option<K>`s; `None`s and duplicates are dropped.
    pub async fn load<I, T>(&self, keys: I) -> Result<Resolution<K, R, C>>
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<K>>,
    {
        let keys = normalize_keys(keys);
        let mut report = LoadReport::new(self.path(), keys.len());
        if keys.is_empty() {
            return Ok(Resolution {
                keys,
                cached: HashMap::new(),
                fetched: HashMap::new(),
                report,
            });
        }

        let Some(parts) = self.cache_parts() else {
            debug!(keys = keys.len(), variant = C::NAME, "cache is off, query from store");
            let fetched = fetcher::fetch_store::<K, R, C>(&keys, &*self.store, &*self.group).await?;
            report.misses = keys.len();
            report.fetched = keys.iter().filter(|k| fetched.contains_key(*k)).count();
            return Ok(Resolution {
                keys,
                cached: HashMap::new(),
                fetched,
                report,
            });
        };

        let cache_keys: Vec<String> = keys.iter().map(|k| self.cache_key(parts.mapper, k)).collect();
        let read = reader::read_cache(&keys, &cache_keys, parts.backend, parts.codec).await;
        report.hits = read.hits.len();
        report.decode_errors = read.decode_errors;
        report.read_failed = read.failed;

        let missed = missed_keys(&keys, &read.hits);
        report.misses = missed.len();
        let mut fetched = fetcher::fetch_store::<K, R, C>(&missed, &*self.store, &*self.group).await?;
        // a key is answered by the cache or by the store, never both
        fetched.retain(|k, _| !read.hits.contains_key(k));
        report.fetched = missed.iter().filter(|k| fetched.contains_key(*k)).count();

        let policy = WritePolicy {
            no_cache: &*self.no_cache,
            empty: &*self.empty,
            codec: parts.codec,
            max_entry_size: self.config.max_entry_size,
        };
        let written = writer::write_cache(
            &missed,
            &fetched,
            |k: &K| self.cache_key(parts.mapper, k),
            &policy,
            parts.backend,
            self.config.ttl,
        )
        .await;
        report.written = written.written;
        report.negative = written.negative;
        report.encode_errors = written.encode_errors;
        report.oversized = written.oversized;
        report.write_failed = written.failed;

        debug!(
            requested = report.requested,
            hits = report.hits,
            misses = report.misses,
            written = report.written,
            "read-through load done"
        );
        Ok(Resolution {
            keys,
            cached: read.hits,
            fetched,
            report,
        })
    }

    /// Key to value(s); keys that resolved to nothing are left out.
    pub async fn load_map<I, T>(&self, keys: I) -> Result<HashMap<K, C::Item>>
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<K>>,
    {
        Ok(self.load(keys).await?.into_map())
    }

    /// Values in the order their keys were first given.
    pub async fn load_list<I, T>(&self, keys: I) -> Result<Vec<R>>
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<K>>,
    {
        Ok(self.load(keys).await?.into_list())
    }
}

impl<K, R, C> Clone for BatchHandler<K, R, C>
where
    K: Eq + Hash + Send + Sync,
    C: Cardinality<K, R>,
{
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            store: Arc::clone(&self.store),
            group: Arc::clone(&self.group),
            cache: self.cache.clone(),
            mapper: self.mapper.clone(),
            codec: self.codec.clone(),
            no_cache: Arc::clone(&self.no_cache),
            empty: Arc::clone(&self.empty),
            _cardinality: PhantomData,
        }
    }
}
