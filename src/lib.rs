//! # batch-readthrough
//!
//! 通用的批量读穿缓存编排层：先查缓存，未命中的键批量回源，结果回写缓存并按调用方顺序返回。
//!
//! Batch read-through cache orchestration that is not tied to any cache or
//! database technology.
//!
//! ## Overview
//!
//! Given a batch of lookup keys, a handler:
//!
//! 1. deduplicates the keys, keeping first-occurrence order,
//! 2. reads all of them from the cache in one batched get,
//! 3. looks up only the misses in the authoritative store in one batched call,
//! 4. writes what the store returned back to the cache in one batched set,
//!    caching "nothing there" answers as an empty sentinel,
//! 5. merges hits and store results in the caller's key order.
//!
//! Everything outside that algorithm is injected: the cache backend, the
//! key mapping, the codec and the store.
//!
//! ## Key Features
//!
//! - **Two cardinalities**: one record per key ([`handler::SingleHandler`]) or
//!   a list per key ([`handler::MultiHandler`])
//! - **Negative caching**: empty answers are cached and served as hits
//! - **Best-effort cache**: cache failures never fail a load; store failures do
//! - **Store-only mode**: disable caching without changing call sites
//! - **Per-call report**: hits, misses, writes and absorbed errors for every load
//!
//! ## Quick Start
//!
//! ```rust
//! use batch_readthrough::cache::{MemoryCache, PrefixKeyMapper};
//! use batch_readthrough::handler::SingleHandler;
//! use batch_readthrough::store::store_fn;
//!
//! #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
//! struct User { id: String, name: String }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> batch_readthrough::Result<()> {
//! let store = store_fn(|ids: Vec<String>| async move {
//!     // SELECT * FROM users WHERE id IN (...)
//!     Ok(ids.into_iter().map(|id| User { name: format!("name{}", id), id }).collect::<Vec<_>>())
//! });
//!
//! let users = SingleHandler::new(store, |u: &User| u.id.clone())
//!     .with_cache(MemoryCache::new(), PrefixKeyMapper::new("user"))
//!     .with_json_codec();
//!
//! let found = users.load_list(["3", "1", "3"].map(String::from)).await?;
//! assert_eq!(found.len(), 2);
//! assert_eq!(found[0].id, "3");
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`handler`] | The orchestrator, its configuration and cardinality variants |
//! | [`cache`] | Cache backend trait, in-memory backend, key mappers and codecs |
//! | [`store`] | Authoritative store trait and closure adapter |
//! | [`error`] | Error type and structured context |

pub mod cache;
pub mod handler;
pub mod store;

// Re-export main types for convenience
pub use cache::{CacheBackend, Codec, JsonCodec, KeyMapper, MemoryCache};
pub use handler::{
    BatchHandler, HandlerConfig, LoadPath, LoadReport, Multi, MultiHandler, Resolution, Single,
    SingleHandler,
};
pub use store::{store_fn, BatchStore};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{BoxError, Error, ErrorContext};
