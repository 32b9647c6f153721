//! Per-call load report.

use std::fmt;

/// Which route a load takes through the handler.
///
/// `StoreOnly` is chosen when caching is switched off or the handler has no
/// cache backend, key mapper or codec; it is a normal mode, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadPath {
    /// normalize -> store -> merge
    StoreOnly,
    /// normalize -> cache read -> misses -> store -> cache write -> merge
    ReadThrough,
}

impl LoadPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadPath::StoreOnly => "store_only",
            LoadPath::ReadThrough => "read_through",
        }
    }
}

impl fmt::Display for LoadPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters for a single load. Nothing here outlives the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub path: LoadPath,
    /// Distinct non-null keys after normalization.
    pub requested: usize,
    /// Keys served from the cache, sentinel hits included.
    pub hits: usize,
    /// Keys handed to the store.
    pub misses: usize,
    /// Missed keys the store returned at least one record for.
    pub fetched: usize,
    /// Entries in the batched cache write (0 if it was skipped or failed).
    pub written: usize,
    /// Entries written as the empty sentinel.
    pub negative: usize,
    /// Cached payloads that failed to decode and were treated as misses.
    pub decode_errors: usize,
    /// Values that failed to encode and were left out of the write.
    pub encode_errors: usize,
    /// Values skipped for exceeding the configured entry size.
    pub oversized: usize,
    /// The cache read failed and every key was treated as a miss.
    pub read_failed: bool,
    /// The batched cache write was attempted and failed.
    pub write_failed: bool,
}

impl LoadReport {
    pub fn new(path: LoadPath, requested: usize) -> Self {
        Self {
            path,
            requested,
            hits: 0,
            misses: 0,
            fetched: 0,
            written: 0,
            negative: 0,
            decode_errors: 0,
            encode_errors: 0,
            oversized: 0,
            read_failed: false,
            write_failed: false,
        }
    }

    pub fn hit_ratio(&self) -> f64 {
        if self.requested == 0 {
            0.0
        } else {
            self.hits as f64 / self.requested as f64
        }
    }

    /// True when the store was not consulted.
    pub fn fully_cached(&self) -> bool {
        self.misses == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio() {
        let mut report = LoadReport::new(LoadPath::ReadThrough, 4);
        assert_eq!(report.hit_ratio(), 0.0);
        report.hits = 3;
        report.misses = 1;
        assert!((report.hit_ratio() - 0.75).abs() < f64::EPSILON);
        assert!(!report.fully_cached());
    }

    #[test]
    fn test_empty_request() {
        let report = LoadReport::new(LoadPath::StoreOnly, 0);
        assert_eq!(report.hit_ratio(), 0.0);
        assert!(report.fully_cached());
    }

    #[test]
    fn test_path_display() {
        assert_eq!(LoadPath::StoreOnly.to_string(), "store_only");
        assert_eq!(LoadPath::ReadThrough.to_string(), "read_through");
    }
}
