//! Memoization of match results for repeated queries against one catalog snapshot.

use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

use crate::core::types::RecordId;
use crate::matching::engine::MatchResult;

/// Cache key: record id plus the query fingerprint
pub type CacheKey = (RecordId, String);

/// Concurrency-safe result cache.
///
/// Each key maps to a `OnceLock`, so concurrent lookups of the same key run
/// the computation at most once; the other callers block until it is set.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: DashMap<CacheKey, Arc<OnceLock<MatchResult>>>,
}

impl ResultCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for `key`, computing it with `compute` if absent
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> MatchResult
    where
        F: FnOnce() -> MatchResult,
    {
        // Clone the cell out so the shard lock is released before computing
        let cell = self
            .entries
            .entry(key)
            .or_insert_with(|| Arc::new(OnceLock::new()))
            .clone();
        cell.get_or_init(compute).clone()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn result(id: &str) -> MatchResult {
        MatchResult {
            record_id: RecordId::new(id),
            trl: 5,
            compatible: true,
            score: 0.8,
            dimension_margins: BTreeMap::new(),
            exclusion_reasons: Vec::new(),
            trade_off_notes: Vec::new(),
        }
    }

    #[test]
    fn test_computes_once_per_key() {
        let cache = ResultCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let r = cache.get_or_compute((RecordId::new("C1"), "q".to_string()), || {
                calls.fetch_add(1, Ordering::SeqCst);
                result("C1")
            });
            assert_eq!(r.record_id, RecordId::new("C1"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_lookups_compute_at_most_once() {
        let cache = ResultCache::new();
        let calls = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    cache.get_or_compute((RecordId::new("C1"), "q".to_string()), || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(10));
                        result("C1")
                    })
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_distinct_queries_are_distinct_keys() {
        let cache = ResultCache::new();
        cache.get_or_compute((RecordId::new("C1"), "a".to_string()), || result("C1"));
        cache.get_or_compute((RecordId::new("C1"), "b".to_string()), || result("C1"));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
