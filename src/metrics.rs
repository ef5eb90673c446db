//! Cache metrics system.
//!
//! Counters for hits, misses, insertions, updates, and evictions, reported as
//! a `BTreeMap<String, f64>` through the [`CacheMetrics`] trait. A BTreeMap
//! keeps metric keys in deterministic order, which matters for reproducible
//! test output and for external harnesses that diff hit-rate reports between
//! policies. Capacity is counted in entries, so there is no byte accounting
//! here.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Counters common to all cache algorithms.
#[derive(Debug, Default, Clone)]
pub struct CoreCacheMetrics {
    /// Total number of lookups (hits + misses).
    pub requests: u64,
    /// Lookups that found the key.
    pub cache_hits: u64,
    /// New entries inserted.
    pub insertions: u64,
    /// Existing entries overwritten in place.
    pub updates: u64,
    /// Entries removed to enforce the capacity bound.
    pub evictions: u64,
}

impl CoreCacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup that found the key.
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup that missed.
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records insertion of a new entry.
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records an in-place overwrite of an existing entry.
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    /// Records an eviction forced by the capacity bound.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Hit rate in `[0.0, 1.0]`, or `0.0` before the first request.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Miss rate in `[0.0, 1.0]`, or `0.0` before the first request.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.requests - self.cache_hits) as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts the core counters to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();
        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert(
            "cache_misses".to_string(),
            (self.requests - self.cache_hits) as f64,
        );
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("updates".to_string(), self.updates as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());
        metrics
    }
}

/// Uniform metrics-reporting interface implemented by every cache type.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Short algorithm name for identification (e.g. `"LRU"`).
    fn algorithm_name(&self) -> &'static str;
}

/// Metrics for the LRU cache. Recency tracking adds no extra counters.
#[derive(Debug, Default, Clone)]
pub struct LruCacheMetrics {
    pub core: CoreCacheMetrics,
}

impl LruCacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheMetrics for LruCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.core.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}

/// LFU-specific metrics: frequency distribution on top of the core counters.
#[derive(Debug, Default, Clone)]
pub struct LfuCacheMetrics {
    pub core: CoreCacheMetrics,
    /// Smallest access count currently held by any cached entry.
    pub min_frequency: u64,
    /// Largest access count currently held by any cached entry.
    pub max_frequency: u64,
    /// Total number of frequency increments (every hit raises a frequency).
    pub total_frequency_increments: u64,
    /// Number of distinct frequency buckets currently populated.
    pub active_frequency_levels: u64,
}

impl LfuCacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hit on an entry currently at `frequency`.
    pub fn record_frequency_hit(&mut self, frequency: usize) {
        self.core.record_hit();
        let freq = frequency as u64;
        if self.min_frequency == 0 || freq < self.min_frequency {
            self.min_frequency = freq;
        }
        if freq > self.max_frequency {
            self.max_frequency = freq;
        }
    }

    /// Records an access moving an entry from `old` to `new` frequency.
    pub fn record_frequency_increment(&mut self, _old: usize, new: usize) {
        self.total_frequency_increments += 1;
        if (new as u64) > self.max_frequency {
            self.max_frequency = new as u64;
        }
    }

    /// Refreshes the bucket-derived gauges from the live bucket map.
    pub fn update_frequency_levels<T>(&mut self, buckets: &BTreeMap<usize, T>) {
        self.active_frequency_levels = buckets.len() as u64;
        if let (Some(&min), Some(&max)) = (buckets.keys().next(), buckets.keys().next_back()) {
            self.min_frequency = min as u64;
            self.max_frequency = max as u64;
        }
    }

    fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();
        metrics.insert("min_frequency".to_string(), self.min_frequency as f64);
        metrics.insert("max_frequency".to_string(), self.max_frequency as f64);
        metrics.insert(
            "total_frequency_increments".to_string(),
            self.total_frequency_increments as f64,
        );
        metrics.insert(
            "active_frequency_levels".to_string(),
            self.active_frequency_levels as f64,
        );
        metrics
    }
}

impl CacheMetrics for LfuCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LFU"
    }
}
