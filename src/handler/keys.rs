//! Key normalization and miss resolution.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Distinct, non-null keys in first-occurrence order.
///
/// Accepts plain keys or `Option<K>`; `None` entries are dropped.
pub fn normalize_keys<K, I, T>(keys: I) -> Vec<K>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
    T: Into<Option<K>>,
{
    let mut seen = HashSet::new();
    keys.into_iter()
        .filter_map(Into::<Option<K>>::into)
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// Keys with no usable cache entry, in input order.
pub fn missed_keys<K, V>(keys: &[K], hits: &HashMap<K, V>) -> Vec<K>
where
    K: Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    keys.iter()
        .filter(|k| !hits.contains_key(*k))
        .filter(|k| seen.insert(*k))
        .cloned()
        .collect()
}
