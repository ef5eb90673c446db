//! Least Recently Used (LRU) cache implementation.
//!
//! The LRU cache keeps entries ordered by recency of access and evicts the
//! entry that has gone longest without being touched when capacity is
//! reached. Recency order is a single arena-backed list: head = most
//! recently used, tail = eviction candidate. A hash index maps each key to
//! its list handle, so `get`, `put`, and `remove` are all O(1) — the index
//! lookup, an O(1) list splice, and nothing else.
//!
//! # Thread safety
//!
//! `LruCache` takes `&mut self` and is not internally synchronized. Wrap it
//! in a lock, or enable the `concurrent` feature for
//! [`ConcurrentLruCache`](crate::concurrent::ConcurrentLruCache), which
//! serializes all operations behind one mutex per instance.

extern crate alloc;

use crate::config::LruCacheConfig;
use crate::error::ConfigError;
use crate::list::{Handle, List};
use crate::metrics::{CacheMetrics, LruCacheMetrics};
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

/// Internal LRU segment containing the actual cache algorithm.
///
/// Shared between `LruCache` (single-threaded) and `ConcurrentLruCache`
/// (behind a mutex). All algorithm logic lives here. An entry exists iff its
/// key maps to a live list handle; the list stores the `(key, value)` pair so
/// eviction recovers the key without a second index scan.
pub(crate) struct LruSegment<K, V, S = DefaultHashBuilder> {
    config: LruCacheConfig,
    list: List<(K, V)>,
    map: HashMap<K, Handle, S>,
    metrics: LruCacheMetrics,
}

impl<K: Hash + Eq, V, S: BuildHasher> LruSegment<K, V, S> {
    pub(crate) fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        let map_capacity = cap.get().next_power_of_two();
        LruSegment {
            config: LruCacheConfig::new(cap),
            list: List::with_capacity(cap.get()),
            map: HashMap::with_capacity_and_hasher(map_capacity, hash_builder),
            metrics: LruCacheMetrics::new(),
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
    pub(crate) fn metrics(&self) -> &LruCacheMetrics {
        &self.metrics
    }

    /// Looks up a key, promoting the entry to most-recently-used on a hit.
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let handle = match self.map.get(key).copied() {
            Some(handle) => handle,
            None => {
                self.metrics.core.record_miss();
                return None;
            }
        };
        self.list.move_to_front(handle);
        self.metrics.core.record_hit();
        self.list.get(handle).map(|(_, value)| value)
    }

    /// Like `get`, returning a mutable reference.
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let handle = match self.map.get(key).copied() {
            Some(handle) => handle,
            None => {
                self.metrics.core.record_miss();
                return None;
            }
        };
        self.list.move_to_front(handle);
        self.metrics.core.record_hit();
        self.list.get_mut(handle).map(|(_, value)| value)
    }

    /// Inserts or updates; returns the displaced `(key, value)` pair, if any.
    pub(crate) fn put(&mut self, key: K, value: V) -> Option<(K, V)>
    where
        K: Clone,
    {
        if let Some(&handle) = self.map.get(&key) {
            self.list.move_to_front(handle);
            let old_value = match self.list.get_mut(handle) {
                Some(entry) => mem::replace(&mut entry.1, value),
                None => return None,
            };
            self.metrics.core.record_update();
            return Some((key, old_value));
        }

        let mut evicted = None;
        if self.map.len() >= self.cap().get() {
            if let Some((old_key, old_value)) = self.list.pop_back() {
                self.map.remove(&old_key);
                self.metrics.core.record_eviction();
                evicted = Some((old_key, old_value));
            }
        }

        let handle = self.list.push_front((key.clone(), value));
        self.map.insert(key, handle);
        self.metrics.core.record_insertion();
        evicted
    }

    /// Removes a key, returning its value if present.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let handle = self.map.remove(key)?;
        self.list.remove(handle).map(|(_, value)| value)
    }

    /// Removes and returns the eviction candidate (least recently used).
    pub(crate) fn pop(&mut self) -> Option<(K, V)> {
        let (key, value) = self.list.pop_back()?;
        self.map.remove(&key);
        Some((key, value))
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
    }

    /// Asserts the index/list invariants: equal lengths, count within
    /// capacity, and every listed key mapping back to its own handle.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn debug_validate(&self) {
        self.list.debug_validate();
        assert_eq!(self.map.len(), self.list.len(), "index/list length skew");
        assert!(self.map.len() <= self.cap().get(), "capacity exceeded");
        for (handle, (key, _)) in self.list.iter_entries() {
            assert_eq!(
                self.map.get(key).copied(),
                Some(handle),
                "index entry does not point at its list node"
            );
        }
    }
}

impl<K, V, S> core::fmt::Debug for LruSegment<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruSegment")
            .field("capacity", &self.config.capacity)
            .field("len", &self.map.len())
            .finish()
    }
}

/// An implementation of a Least Recently Used (LRU) cache.
///
/// The cache has a fixed entry capacity and supports O(1) insertion,
/// retrieval, and update. When full, inserting a new key evicts the least
/// recently used entry.
///
/// # Examples
///
/// ```
/// use evcache::LruCache;
/// use core::num::NonZeroUsize;
///
/// let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
///
/// cache.put("apple", 1);
/// cache.put("banana", 2);
///
/// // Accessing an entry refreshes its recency.
/// assert_eq!(cache.get(&"apple"), Some(&1));
///
/// // Inserting beyond capacity evicts the least recently used entry.
/// cache.put("cherry", 3);
/// assert_eq!(cache.get(&"banana"), None);
/// assert_eq!(cache.get(&"apple"), Some(&1));
/// assert_eq!(cache.get(&"cherry"), Some(&3));
/// ```
#[derive(Debug)]
pub struct LruCache<K, V, S = DefaultHashBuilder> {
    segment: LruSegment<K, V, S>,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    /// Creates a new LRU cache with the specified capacity.
    pub fn new(cap: NonZeroUsize) -> LruCache<K, V> {
        LruCache::with_hasher(cap, DefaultHashBuilder::default())
    }

    /// Creates a new LRU cache from a config, with an optional custom hasher.
    pub fn init(config: LruCacheConfig, hasher: Option<DefaultHashBuilder>) -> LruCache<K, V> {
        LruCache::with_hasher(config.capacity, hasher.unwrap_or_default())
    }

    /// Validates a runtime-supplied capacity and creates the cache.
    ///
    /// Returns [`ConfigError::ZeroCapacity`] for `capacity == 0` instead of
    /// constructing a cache that could never hold an entry.
    pub fn try_init(capacity: usize) -> Result<LruCache<K, V>, ConfigError> {
        LruCacheConfig::try_new(capacity).map(|config| LruCache::init(config, None))
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LruCache<K, V, S> {
    /// Creates a new LRU cache with the specified capacity and hash builder.
    pub fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        Self {
            segment: LruSegment::with_hasher(cap, hash_builder),
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
    /// A hit moves the entry to the most-recently-used position.
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
    /// A hit moves the entry to the most-recently-used position.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get_mut(key)
    }

    /// Inserts a key-value pair into the cache.
    ///
    /// If the key was already present, its value is overwritten in place, the
    /// entry is refreshed to most-recently-used, and the old pair is
    /// returned. If the cache is at capacity, the least recently used entry
    /// is evicted and returned.
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

    /// Removes and returns the eviction candidate (least recently used).
    #[inline]
    pub fn pop(&mut self) -> Option<(K, V)> {
        self.segment.pop()
    }

    /// Clears the cache, removing all key-value pairs.
    #[inline]
    pub fn clear(&mut self) {
        self.segment.clear()
    }

    /// Asserts internal index/list consistency; panics on violation.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate(&self) {
        self.segment.debug_validate()
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> CachePolicy<K, V> for LruCache<K, V, S> {
    fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        LruCache::put(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn cap(&self) -> NonZeroUsize {
        LruCache::cap(self)
    }

    fn clear(&mut self) {
        LruCache::clear(self)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for LruCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.segment.metrics().algorithm_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn test_lru_get_put() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        assert_eq!(cache.put("apple", 1), None);
        assert_eq!(cache.put("banana", 2), None);
        assert_eq!(cache.get(&"apple"), Some(&1));
        assert_eq!(cache.get(&"banana"), Some(&2));
        assert_eq!(cache.get(&"cherry"), None);
        assert_eq!(cache.put("apple", 3).unwrap().1, 1);
        assert_eq!(cache.get(&"apple"), Some(&3));
        // "banana" is now least recently used and gets evicted.
        assert_eq!(cache.put("cherry", 4).unwrap().0, "banana");
        assert_eq!(cache.get(&"banana"), None);
        assert_eq!(cache.get(&"apple"), Some(&3));
        assert_eq!(cache.get(&"cherry"), Some(&4));
        cache.debug_validate();
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.get(&1), Some(&1));
        // 2 is LRU now.
        assert_eq!(cache.put(3, 3), Some((2, 2)));
        assert_eq!(cache.get(&2), None);
        // 1 is LRU (3 was just inserted, 1 touched before that put).
        assert_eq!(cache.put(4, 4), Some((1, 1)));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&3), Some(&3));
        assert_eq!(cache.get(&4), Some(&4));
    }

    #[test]
    fn test_lru_update_refreshes_recency() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        cache.put("a", 1);
        cache.put("b", 2);
        // Updating "a" makes "b" the eviction candidate.
        cache.put("a", 10);
        assert_eq!(cache.put("c", 3), Some(("b", 2)));
        assert_eq!(cache.get(&"a"), Some(&10));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_lru_get_mut() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        cache.put("apple", 1);
        cache.put("banana", 2);
        if let Some(v) = cache.get_mut(&"apple") {
            *v = 3;
        }
        assert_eq!(cache.get(&"apple"), Some(&3));
        cache.put("cherry", 4);
        assert_eq!(cache.get(&"banana"), None);
        assert_eq!(cache.get(&"apple"), Some(&3));
    }

    #[test]
    fn test_lru_remove() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        cache.put("apple", 1);
        cache.put("banana", 2);
        assert_eq!(cache.remove(&"apple"), Some(1));
        assert_eq!(cache.get(&"apple"), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.remove(&"cherry"), None);
        // Removal freed a slot, so this insert evicts nothing.
        assert_eq!(cache.put("cherry", 3), None);
        assert_eq!(cache.get(&"banana"), Some(&2));
        assert_eq!(cache.get(&"cherry"), Some(&3));
        cache.debug_validate();
    }

    #[test]
    fn test_lru_pop() {
        let mut cache = LruCache::new(NonZeroUsize::new(3).unwrap());
        cache.put("a", 1);
        cache.put("b", 2);
        cache.get(&"a");
        // "b" is least recently used.
        assert_eq!(cache.pop(), Some(("b", 2)));
        assert_eq!(cache.pop(), Some(("a", 1)));
        assert_eq!(cache.pop(), None);
    }

    #[test]
    fn test_lru_clear() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        cache.put("apple", 1);
        cache.put("banana", 2);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        cache.put("cherry", 3);
        assert_eq!(cache.get(&"cherry"), Some(&3));
    }

    #[test]
    fn test_lru_capacity_one() {
        let mut cache = LruCache::new(NonZeroUsize::new(1).unwrap());
        cache.put(1, 1);
        assert_eq!(cache.put(2, 2), Some((1, 1)));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lru_try_init_rejects_zero() {
        assert!(LruCache::<u32, u32>::try_init(0).is_err());
        let cache = LruCache::<u32, u32>::try_init(8).unwrap();
        assert_eq!(cache.cap().get(), 8);
    }

    #[test]
    fn test_lru_string_keys_borrowed_lookup() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        cache.put(String::from("apple"), 1);
        cache.put(String::from("banana"), 2);
        assert_eq!(cache.get("apple"), Some(&1));
        assert_eq!(cache.get("banana"), Some(&2));
        assert_eq!(cache.remove("apple"), Some(1));
    }

    #[test]
    fn test_lru_metrics() {
        use crate::metrics::CacheMetrics;
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        let report = cache.metrics();
        assert_eq!(report.get("requests"), Some(&0.0));

        cache.put("a", 1);
        cache.put("b", 2);
        cache.get(&"a");
        cache.get(&"missing");
        cache.put("c", 3);

        let report = cache.metrics();
        assert_eq!(report.get("cache_hits"), Some(&1.0));
        assert_eq!(report.get("cache_misses"), Some(&1.0));
        assert_eq!(report.get("insertions"), Some(&3.0));
        assert_eq!(report.get("evictions"), Some(&1.0));
        assert_eq!(cache.algorithm_name(), "LRU");
    }

    #[test]
    fn test_lru_segment_directly() {
        let mut segment: LruSegment<&str, i32, DefaultHashBuilder> =
            LruSegment::with_hasher(NonZeroUsize::new(2).unwrap(), DefaultHashBuilder::default());
        assert!(segment.is_empty());
        assert_eq!(segment.cap().get(), 2);
        segment.put("a", 1);
        segment.put("b", 2);
        assert_eq!(segment.len(), 2);
        assert_eq!(segment.get(&"a"), Some(&1));
        segment.debug_validate();
    }

    #[test]
    fn test_lru_invariants_under_churn() {
        let mut cache = LruCache::new(NonZeroUsize::new(8).unwrap());
        for i in 0..100u32 {
            cache.put(i % 13, i);
            if i % 3 == 0 {
                cache.get(&(i % 7));
            }
            if i % 11 == 0 {
                cache.remove(&(i % 5));
            }
            assert!(cache.len() <= 8);
        }
        cache.debug_validate();
    }
}
