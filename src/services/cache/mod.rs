use crate::models::RecommendedItem;
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

/// Cache key: the full parameter set of one recommendation computation plus
/// the store snapshot it ran against. A reload bumps the store version, so
/// entries for an old snapshot can never be served again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    user_id: i64,
    threshold_bits: u64,
    limit: usize,
    store_version: u64,
}

impl CacheKey {
    pub fn new(user_id: i64, threshold: f64, limit: usize, store_version: u64) -> Self {
        Self {
            user_id,
            threshold_bits: threshold.to_bits(),
            limit,
            store_version,
        }
    }
}

/// Memoizes recommendation lists per key with single-flight semantics: a
/// second concurrent caller for the same key blocks on the first
/// computation instead of recomputing.
#[derive(Debug, Default)]
pub struct RecommendationCache {
    entries: DashMap<CacheKey, Arc<OnceLock<Arc<Vec<RecommendedItem>>>>>,
}

impl RecommendationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Arc<Vec<RecommendedItem>>
    where
        F: FnOnce() -> Vec<RecommendedItem>,
    {
        // Take the cell out of the shard before initializing so one slow
        // computation never blocks unrelated keys.
        let cell = self
            .entries
            .entry(key)
            .or_insert_with(|| Arc::new(OnceLock::new()))
            .value()
            .clone();
        cell.get_or_init(|| Arc::new(compute())).clone()
    }

    /// Wholesale invalidation, used when a new store snapshot is published.
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
