//! 缓存层：批量缓存后端、键映射与值编解码。
//!
//! # Cache Layer
//!
//! The fast side of the read-through: a batched key-value backend, the
//! mapping from lookup keys to cache keys, and the codec that turns values
//! into the text payloads the backend stores.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheBackend`] | Trait for batched get/set backends (Redis, Memcached, ...) |
//! | [`MemoryCache`] | In-process backend with lazy TTL expiry |
//! | [`KeyMapper`] | Lookup key to cache key translation |
//! | [`PrefixKeyMapper`] | `prefix:key` mapping |
//! | [`HashedKeyMapper`] | `prefix:sha256(key)` mapping |
//! | [`Codec`] | Value to payload encoding |
//! | [`JsonCodec`] | serde_json based codec |
//!
//! ## Negative Caching
//!
//! A key whose authoritative answer is empty is written as [`EMPTY_SENTINEL`]
//! (the empty string). Reading the sentinel back yields the variant's "known
//! empty" value instead of a miss, so the store is not asked again until the
//! entry expires.
//!
//! ## Example
//!
//! ```rust
//! use batch_readthrough::cache::{KeyMapper, MemoryCache, PrefixKeyMapper};
//!
//! let backend = MemoryCache::new();
//! let mapper = PrefixKeyMapper::new("user");
//! assert_eq!(mapper.cache_key(&42), "user:42");
//! assert!(backend.is_empty());
//! ```

mod backend;
mod codec;
mod key;

pub(crate) use key::namespaced;

pub use backend::{CacheBackend, MemoryCache};
pub use codec::{is_sentinel, Codec, JsonCodec, EMPTY_SENTINEL};
pub use key::{HashedKeyMapper, KeyMapper, PrefixKeyMapper};
