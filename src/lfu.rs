//! Least Frequently Used (LFU) cache implementation.
//!
//! The LFU cache tracks an access count per entry and evicts the entry with
//! the lowest count when capacity is reached. Entries sharing a count live in
//! a per-frequency bucket list ordered by recency, so ties are broken by
//! evicting the least recently used entry within the lowest-frequency
//! bucket. A tracked minimum frequency makes the eviction bucket available
//! without scanning, and empty buckets are dropped the moment their last
//! entry leaves.
//!
//! An access moves the entry from bucket `f` to the front of bucket `f + 1`.
//! Updating an existing key through `put` counts as an access too, so a hot
//! key that is frequently rewritten keeps its standing. New entries always
//! start at frequency 1, which resets the minimum frequency to 1.
//!
//! # Thread safety
//!
//! `LfuCache` takes `&mut self` and is not internally synchronized. Wrap it
//! in a lock, or enable the `concurrent` feature for
//! [`ConcurrentLfuCache`](crate::concurrent::ConcurrentLfuCache).

extern crate alloc;

use crate::config::LfuCacheConfig;
use crate::error::ConfigError;
use crate::list::{Handle, List};
use crate::metrics::{CacheMetrics, LfuCacheMetrics};
use crate::policy::CachePolicy;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::{DefaultHashBuilder, HashMap};

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Internal LFU segment containing the actual cache algorithm.
///
/// The index maps each key to its current `(frequency, handle)` pair and the
/// bucket map groups entries by frequency. Invariants: every bucket in the
/// map is non-empty, `min_frequency` names the smallest populated bucket
/// whenever the cache is non-empty, and each index entry points at a live
/// node in its own frequency's bucket.
pub(crate) struct LfuSegment<K, V, S = DefaultHashBuilder> {
    config: LfuCacheConfig,
    min_frequency: usize,
    map: HashMap<K, (usize, Handle), S>,
    buckets: BTreeMap<usize, List<(K, V)>>,
    metrics: LfuCacheMetrics,
}

impl<K: Hash + Eq, V, S: BuildHasher> LfuSegment<K, V, S> {
    pub(crate) fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        let map_capacity = cap.get().next_power_of_two();
        LfuSegment {
            config: LfuCacheConfig::new(cap),
            min_frequency: 1,
            map: HashMap::with_capacity_and_hasher(map_capacity, hash_builder),
            buckets: BTreeMap::new(),
            metrics: LfuCacheMetrics::new(),
        }
    }

    #[inline]
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.config.capacity
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &LfuCacheMetrics {
        &self.metrics
    }

    /// Returns the access count of `key` without counting as an access.
    pub(crate) fn frequency<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get(key).map(|&(freq, _)| freq)
    }

    /// Moves an entry from bucket `freq` to the front of bucket `freq + 1`
    /// and updates the index. Maintains `min_frequency` when the source
    /// bucket empties. Returns the entry's new handle.
    fn bump<Q>(&mut self, key: &Q, freq: usize, handle: Handle) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (entry, now_empty) = {
            let bucket = self.buckets.get_mut(&freq)?;
            let entry = bucket.remove(handle)?;
            (entry, bucket.is_empty())
        };
        if now_empty {
            self.buckets.remove(&freq);
            // The moved entry lands in freq + 1, so that is the new minimum.
            if self.min_frequency == freq {
                self.min_frequency = freq + 1;
            }
        }
        let next = freq + 1;
        let new_handle = self
            .buckets
            .entry(next)
            .or_insert_with(List::new)
            .push_front(entry);
        if let Some(slot) = self.map.get_mut(key) {
            *slot = (next, new_handle);
        }
        self.metrics.record_frequency_increment(freq, next);
        Some(new_handle)
    }

    /// Removes the eviction candidate: the least recently used entry within
    /// the minimum-frequency bucket.
    fn evict_one(&mut self) -> Option<(K, V)> {
        let freq = self.min_frequency;
        let (entry, now_empty) = {
            let bucket = self.buckets.get_mut(&freq)?;
            let entry = bucket.pop_back()?;
            (entry, bucket.is_empty())
        };
        if now_empty {
            self.buckets.remove(&freq);
            self.min_frequency = self.buckets.keys().next().copied().unwrap_or(1);
        }
        self.map.remove(&entry.0);
        self.metrics.core.record_eviction();
        Some(entry)
    }

    /// Looks up a key, incrementing its frequency on a hit.
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (freq, handle) = match self.map.get(key).copied() {
            Some(entry) => entry,
            None => {
                self.metrics.core.record_miss();
                return None;
            }
        };
        let new_handle = self.bump(key, freq, handle)?;
        self.metrics.record_frequency_hit(freq);
        self.metrics.update_frequency_levels(&self.buckets);
        self.buckets
            .get(&(freq + 1))
            .and_then(|bucket| bucket.get(new_handle))
            .map(|(_, value)| value)
    }

    /// Like `get`, returning a mutable reference.
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (freq, handle) = match self.map.get(key).copied() {
            Some(entry) => entry,
            None => {
                self.metrics.core.record_miss();
                return None;
            }
        };
        let new_handle = self.bump(key, freq, handle)?;
        self.metrics.record_frequency_hit(freq);
        self.metrics.update_frequency_levels(&self.buckets);
        self.buckets
            .get_mut(&(freq + 1))
            .and_then(|bucket| bucket.get_mut(new_handle))
            .map(|(_, value)| value)
    }

    /// Inserts or updates; returns the displaced `(key, value)` pair, if any.
    ///
    /// Updating an existing key counts as an access and increments its
    /// frequency. A new entry starts at frequency 1.
    pub(crate) fn put(&mut self, key: K, value: V) -> Option<(K, V)>
    where
        K: Clone,
    {
        if let Some((freq, handle)) = self.map.get(&key).copied() {
            let new_handle = self.bump(&key, freq, handle)?;
            let old_value = match self
                .buckets
                .get_mut(&(freq + 1))
                .and_then(|bucket| bucket.get_mut(new_handle))
            {
                Some(entry) => mem::replace(&mut entry.1, value),
                None => return None,
            };
            self.metrics.core.record_update();
            self.metrics.update_frequency_levels(&self.buckets);
            return Some((key, old_value));
        }

        let mut evicted = None;
        if self.map.len() >= self.cap().get() {
            evicted = self.evict_one();
        }

        let handle = self
            .buckets
            .entry(1)
            .or_insert_with(List::new)
            .push_front((key.clone(), value));
        self.map.insert(key, (1, handle));
        self.min_frequency = 1;
        self.metrics.core.record_insertion();
        self.metrics.update_frequency_levels(&self.buckets);
        evicted
    }

    /// Removes a key, returning its value if present.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (freq, handle) = self.map.remove(key)?;
        let (value, now_empty) = {
            let bucket = self.buckets.get_mut(&freq)?;
            let (_, value) = bucket.remove(handle)?;
            (value, bucket.is_empty())
        };
        if now_empty {
            self.buckets.remove(&freq);
            if self.min_frequency == freq {
                self.min_frequency = self.buckets.keys().next().copied().unwrap_or(1);
            }
        }
        self.metrics.update_frequency_levels(&self.buckets);
        Some(value)
    }

    /// Removes and returns the eviction candidate.
    pub(crate) fn pop(&mut self) -> Option<(K, V)> {
        let entry = self.evict_one();
        self.metrics.update_frequency_levels(&self.buckets);
        entry
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.buckets.clear();
        self.min_frequency = 1;
    }

    /// Asserts the index/bucket invariants: no empty buckets, bucket entry
    /// counts matching the index, count within capacity, `min_frequency`
    /// naming the smallest populated bucket, and every listed key mapping
    /// back to its own frequency and handle.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn debug_validate(&self) {
        let mut total = 0usize;
        for (freq, bucket) in &self.buckets {
            assert!(!bucket.is_empty(), "empty bucket retained at frequency {}", freq);
            bucket.debug_validate();
            total += bucket.len();
            for (handle, (key, _)) in bucket.iter_entries() {
                assert_eq!(
                    self.map.get(key).copied(),
                    Some((*freq, handle)),
                    "index entry does not point at its bucket node"
                );
            }
        }
        assert_eq!(total, self.map.len(), "index/bucket length skew");
        assert!(self.map.len() <= self.cap().get(), "capacity exceeded");
        if let Some(&min) = self.buckets.keys().next() {
            assert_eq!(self.min_frequency, min, "min_frequency out of date");
        }
    }
}

impl<K, V, S> core::fmt::Debug for LfuSegment<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LfuSegment")
            .field("capacity", &self.config.capacity)
            .field("len", &self.map.len())
            .field("min_frequency", &self.min_frequency)
            .finish()
    }
}

/// An implementation of a Least Frequently Used (LFU) cache.
///
/// The cache has a fixed entry capacity and supports O(1) insertion,
/// retrieval, and update. When full, inserting a new key evicts the entry
/// with the lowest access count; among entries tied at the lowest count, the
/// least recently used one goes first.
///
/// # Examples
///
/// ```
/// use evcache::LfuCache;
/// use core::num::NonZeroUsize;
///
/// let mut cache = LfuCache::new(NonZeroUsize::new(2).unwrap());
///
/// cache.put("apple", 1);
/// cache.put("banana", 2);
///
/// // "apple" now has a higher access count than "banana".
/// assert_eq!(cache.get(&"apple"), Some(&1));
///
/// // Inserting beyond capacity evicts the least frequently used entry.
/// cache.put("cherry", 3);
/// assert_eq!(cache.get(&"banana"), None);
/// assert_eq!(cache.get(&"apple"), Some(&1));
/// assert_eq!(cache.get(&"cherry"), Some(&3));
/// ```
#[derive(Debug)]
pub struct LfuCache<K, V, S = DefaultHashBuilder> {
    segment: LfuSegment<K, V, S>,
}

impl<K: Hash + Eq, V> LfuCache<K, V> {
    /// Creates a new LFU cache with the specified capacity.
    pub fn new(cap: NonZeroUsize) -> LfuCache<K, V> {
        LfuCache::with_hasher(cap, DefaultHashBuilder::default())
    }

    /// Creates a new LFU cache from a config, with an optional custom hasher.
    pub fn init(config: LfuCacheConfig, hasher: Option<DefaultHashBuilder>) -> LfuCache<K, V> {
        LfuCache::with_hasher(config.capacity, hasher.unwrap_or_default())
    }

    /// Validates a runtime-supplied capacity and creates the cache.
    ///
    /// Returns [`ConfigError::ZeroCapacity`] for `capacity == 0` instead of
    /// constructing a cache that could never hold an entry.
    pub fn try_init(capacity: usize) -> Result<LfuCache<K, V>, ConfigError> {
        LfuCacheConfig::try_new(capacity).map(|config| LfuCache::init(config, None))
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LfuCache<K, V, S> {
    /// Creates a new LFU cache with the specified capacity and hash builder.
    pub fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        Self {
            segment: LfuSegment::with_hasher(cap, hash_builder),
        }
    }

    /// Returns the maximum number of key-value pairs the cache can hold.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.segment.cap()
    }

    /// Returns the current number of key-value pairs in the cache.
    #[inline]
    pub fn len(&self) -> usize {
        self.segment.len()
    }

    /// Returns `true` if the cache contains no key-value pairs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segment.is_empty()
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the cache's key type, but [`Hash`]
    /// and [`Eq`] on the borrowed form *must* match those for the key type.
    ///
    /// A hit increments the entry's access count.
    #[inline]
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// A hit increments the entry's access count.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get_mut(key)
    }

    /// Returns the access count of `key` without counting as an access.
    #[inline]
    pub fn frequency<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.frequency(key)
    }

    /// Inserts a key-value pair into the cache.
    ///
    /// If the key was already present, its value is overwritten, the update
    /// counts as an access (the frequency is incremented), and the old pair
    /// is returned. If the cache is at capacity, the least frequently used
    /// entry is evicted and returned; ties at the lowest frequency evict the
    /// least recently used entry. A new entry starts at frequency 1.
    #[inline]
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)>
    where
        K: Clone,
    {
        self.segment.put(key, value)
    }

    /// Removes a key from the cache, returning its value if present.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.remove(key)
    }

    /// Removes and returns the eviction candidate (least frequently used,
    /// least recently used among ties).
    #[inline]
    pub fn pop(&mut self) -> Option<(K, V)> {
        self.segment.pop()
    }

    /// Clears the cache, removing all key-value pairs.
    #[inline]
    pub fn clear(&mut self) {
        self.segment.clear()
    }

    /// Asserts internal index/bucket consistency; panics on violation.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate(&self) {
        self.segment.debug_validate()
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> CachePolicy<K, V> for LfuCache<K, V, S> {
    fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        LfuCache::put(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LfuCache::get(self, key)
    }

    fn len(&self) -> usize {
        LfuCache::len(self)
    }

    fn cap(&self) -> NonZeroUsize {
        LfuCache::cap(self)
    }

    fn clear(&mut self) {
        LfuCache::clear(self)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for LfuCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.segment.metrics().algorithm_name()
    }
}
