//! Authoritative store boundary.

use crate::Result;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Batched lookup against the authoritative store (database, service, ...).
///
/// The store may return fewer records than keys requested; keys without a
/// record simply resolve to nothing. Errors are propagated to the caller of
/// the load unchanged.
#[async_trait]
pub trait BatchStore<K, R>: Send + Sync
where
    K: Send + Sync,
{
    async fn fetch_many(&self, keys: &[K]) -> Result<Vec<R>>;
}

#[async_trait]
impl<K, R, S> BatchStore<K, R> for Arc<S>
where
    K: Send + Sync + 'static,
    R: 'static,
    S: BatchStore<K, R> + ?Sized,
{
    async fn fetch_many(&self, keys: &[K]) -> Result<Vec<R>> {
        (**self).fetch_many(keys).await
    }
}

/// Adapts an async closure `Fn(Vec<K>) -> Future<Output = Result<Vec<R>>>`.
pub struct FnStore<F> {
    f: F,
}

impl<F> FnStore<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

/// Shorthand for [`FnStore::new`] that pins down the key and record types.
pub fn store_fn<K, R, F, Fut>(f: F) -> FnStore<F>
where
    F: Fn(Vec<K>) -> Fut,
    Fut: Future<Output = Result<Vec<R>>>,
{
    FnStore::new(f)
}

#[async_trait]
impl<K, R, F, Fut> BatchStore<K, R> for FnStore<F>
where
    K: Clone + Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(Vec<K>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<R>>> + Send + 'static,
{
    async fn fetch_many(&self, keys: &[K]) -> Result<Vec<R>> {
        (self.f)(keys.to_vec()).await
    }
}
