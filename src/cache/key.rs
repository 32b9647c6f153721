//! Lookup key to cache key mapping.

use sha2::{Digest, Sha256};
use std::fmt::Display;

/// Translates a lookup key into the string the cache backend stores it under.
///
/// Must be deterministic: the same key always maps to the same cache key.
pub trait KeyMapper<K>: Send + Sync {
    fn cache_key(&self, key: &K) -> String;
}

impl<K, F> KeyMapper<K> for F
where
    F: Fn(&K) -> String + Send + Sync,
{
    fn cache_key(&self, key: &K) -> String {
        self(key)
    }
}

/// `"<prefix>:<key>"`.
#[derive(Debug, Clone)]
pub struct PrefixKeyMapper {
    prefix: String,
}

impl PrefixKeyMapper {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl<K: Display> KeyMapper<K> for PrefixKeyMapper {
    fn cache_key(&self, key: &K) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

/// `"<prefix>:<sha256 of key>"`, for keys too long or too irregular to use raw.
#[derive(Debug, Clone)]
pub struct HashedKeyMapper {
    prefix: String,
}

impl HashedKeyMapper {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl<K: Display> KeyMapper<K> for HashedKeyMapper {
    fn cache_key(&self, key: &K) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.to_string().as_bytes());
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        format!("{}:{}", self.prefix, hash)
    }
}

/// Applies the configured namespace on top of another mapper.
pub(crate) fn namespaced(prefix: Option<&str>, key: String) -> String {
    match prefix {
        Some(p) => format!("{}:{}", p, key),
        None => key,
    }
}
