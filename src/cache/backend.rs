//! Cache backend implementations.

use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CacheEntry {
    data: String,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new(data: String, ttl: Duration) -> Self {
        Self {
            data,
            created_at: Instant::now(),
            ttl,
        }
    }
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// Batched key-value cache.
///
/// Both operations are expected to be a single round trip for the whole
/// batch (MGET / pipelined SET on Redis and friends); the orchestrator never
/// issues them per key.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Look up `keys`. The returned vector is positional: `None` at index `i`
    /// means there is no entry for `keys[i]`.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// Store every entry with the same expiry.
    async fn set_many(&self, entries: HashMap<String, String>, ttl: Duration) -> Result<()>;

    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: CacheBackend + ?Sized> CacheBackend for Arc<T> {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        (**self).get_many(keys).await
    }
    async fn set_many(&self, entries: HashMap<String, String>, ttl: Duration) -> Result<()> {
        (**self).set_many(entries, ttl).await
    }
    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Process-local cache, mostly useful for tests and single-node setups.
///
/// Entries expire lazily: an entry past its TTL reads as a miss.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw payload stored under `key`, ignoring expiry.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).map(|e| e.data.clone()))
    }

    /// Write a payload directly, bypassing any orchestration.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.into(), CacheEntry::new(value.into(), ttl));
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.values().filter(|e| !e.is_expired()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

fn poisoned() -> Error {
    Error::cache_with_context(
        "memory cache lock poisoned",
        ErrorContext::new().with_source("memory_cache"),
    )
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(keys
            .iter()
            .map(|key| {
                entries
                    .get(key)
                    .filter(|e| !e.is_expired())
                    .map(|e| e.data.clone())
            })
            .collect())
    }

    async fn set_many(&self, values: HashMap<String, String>, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.retain(|_, e| !e.is_expired());
        for (key, value) in values {
            entries.insert(key, CacheEntry::new(value, ttl));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
