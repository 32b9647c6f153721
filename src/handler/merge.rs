//! Merging cache hits and store results back into key order.

use super::cardinality::Cardinality;
use super::report::LoadReport;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Everything a load resolved, before merging.
///
/// Every key in `keys` is in at most one of `cached` / `fetched`; a key in
/// neither resolved to nothing.
pub struct Resolution<K, R, C>
where
    K: Eq + Hash,
    C: Cardinality<K, R>,
{
    /// Normalized keys, in caller order.
    pub keys: Vec<K>,
    pub cached: HashMap<K, C::Value>,
    pub fetched: HashMap<K, C::Value>,
    pub report: LoadReport,
}

impl<K, R, C> Resolution<K, R, C>
where
    K: Eq + Hash,
    C: Cardinality<K, R>,
{
    /// Key to value(s), keys without a present value dropped.
    pub fn into_map(self) -> HashMap<K, C::Item> {
        let Resolution {
            keys,
            mut cached,
            mut fetched,
            ..
        } = self;
        let mut out = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(item) = take_resolved::<K, R, C>(&key, &mut cached, &mut fetched) {
                out.insert(key, item);
            }
        }
        out
    }

    /// Values flattened in key order.
    pub fn into_list(self) -> Vec<R> {
        let Resolution {
            keys,
            mut cached,
            mut fetched,
            ..
        } = self;
        let mut out = Vec::with_capacity(keys.len());
        for key in &keys {
            if let Some(item) = take_resolved::<K, R, C>(key, &mut cached, &mut fetched) {
                C::extend(&mut out, item);
            }
        }
        out
    }

    /// Key and value(s) pairs in key order, keys without a present value dropped.
    pub fn into_pairs(self) -> Vec<(K, C::Item)> {
        let Resolution {
            keys,
            mut cached,
            mut fetched,
            ..
        } = self;
        keys.into_iter()
            .filter_map(|key| {
                take_resolved::<K, R, C>(&key, &mut cached, &mut fetched).map(|item| (key, item))
            })
            .collect()
    }
}

/// Cache hit first, store result second.
fn take_resolved<K, R, C>(
    key: &K,
    cached: &mut HashMap<K, C::Value>,
    fetched: &mut HashMap<K, C::Value>,
) -> Option<C::Item>
where
    K: Eq + Hash,
    C: Cardinality<K, R>,
{
    cached
        .remove(key)
        .or_else(|| fetched.remove(key))
        .and_then(C::present)
}

impl<K, R, C> fmt::Debug for Resolution<K, R, C>
where
    K: Eq + Hash + fmt::Debug,
    C: Cardinality<K, R>,
    C::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("keys", &self.keys)
            .field("cached", &self.cached)
            .field("fetched", &self.fetched)
            .field("report", &self.report)
            .finish()
    }
}
