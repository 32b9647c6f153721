//! Value cardinality: one record per key, or a list of records per key.

use std::collections::HashMap;
use std::hash::Hash;

/// How records relate to keys, and what "no value" means for them.
///
/// `Value` is what travels through the cache and codec; its `Default` is
/// the absent value (what a key resolves to when the store has nothing).
/// `Item` is the per-key unit of map-shaped results.
pub trait Cardinality<K, R>: Send + Sync + 'static
where
    K: Eq + Hash,
{
    type Value: Default + Send + Sync + 'static;
    type Item;

    const NAME: &'static str;

    /// Index store records by the key they group under.
    fn classify<G>(records: Vec<R>, group: G) -> HashMap<K, Self::Value>
    where
        G: Fn(&R) -> K;

    /// Default empty predicate, decides negative caching.
    fn is_empty(value: &Self::Value) -> bool;

    /// Presence filter applied when merging.
    fn present(value: Self::Value) -> Option<Self::Item>;

    /// Append a merged unit to list-shaped output.
    fn extend(out: &mut Vec<R>, item: Self::Item);
}

/// One record per key. A key that maps to several records keeps the last one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Single;

/// Any number of records per key, kept in store response order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Multi;

impl<K, R> Cardinality<K, R> for Single
where
    K: Eq + Hash,
    R: Send + Sync + 'static,
{
    type Value = Option<R>;
    type Item = R;

    const NAME: &'static str = "single";

    fn classify<G>(records: Vec<R>, group: G) -> HashMap<K, Option<R>>
    where
        G: Fn(&R) -> K,
    {
        let mut out = HashMap::with_capacity(records.len());
        for record in records {
            out.insert(group(&record), Some(record));
        }
        out
    }

    fn is_empty(value: &Option<R>) -> bool {
        value.is_none()
    }

    fn present(value: Option<R>) -> Option<R> {
        value
    }

    fn extend(out: &mut Vec<R>, item: R) {
        out.push(item);
    }
}

impl<K, R> Cardinality<K, R> for Multi
where
    K: Eq + Hash,
    R: Send + Sync + 'static,
{
    type Value = Vec<R>;
    type Item = Vec<R>;

    const NAME: &'static str = "multi";

    fn classify<G>(records: Vec<R>, group: G) -> HashMap<K, Vec<R>>
    where
        G: Fn(&R) -> K,
    {
        let mut out: HashMap<K, Vec<R>> = HashMap::new();
        for record in records {
            out.entry(group(&record)).or_default().push(record);
        }
        out
    }

    fn is_empty(value: &Vec<R>) -> bool {
        value.is_empty()
    }

    fn present(value: Vec<R>) -> Option<Vec<R>> {
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    fn extend(out: &mut Vec<R>, item: Vec<R>) {
        out.extend(item);
    }
}
