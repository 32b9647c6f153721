//! Store fetcher: one batched lookup for the missed keys.

use super::cardinality::Cardinality;
use crate::store::BatchStore;
use crate::Result;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// Fetch `keys` from the store and index the records by key.
///
/// No keys, no store call. Store errors are returned as-is.
pub(crate) async fn fetch_store<K, R, C>(
    keys: &[K],
    store: &dyn BatchStore<K, R>,
    group: &(dyn Fn(&R) -> K + Send + Sync),
) -> Result<HashMap<K, C::Value>>
where
    K: Eq + Hash + Debug + Send + Sync,
    C: Cardinality<K, R>,
{
    if keys.is_empty() {
        return Ok(HashMap::new());
    }

    debug!(keys = ?keys, variant = C::NAME, "query from store, keys are not cached");
    let records = store.fetch_many(keys).await?;
    debug!(records = records.len(), "store returned");
    if records.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(C::classify(records, group))
}
