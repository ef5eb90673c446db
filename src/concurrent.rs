//! Thread-safe cache wrappers.
//!
//! Each concurrent cache wraps its single-threaded segment in one
//! [`parking_lot::Mutex`], so every operation takes the same lock and the
//! per-instance behavior is exactly the sequential behavior, interleaved in
//! some serial order. That makes correctness trivial at the cost of
//! contention under heavy parallel load; callers who need more parallelism
//! can shard keys across several instances.
//!
//! Because shared references cannot escape the lock, lookups either clone the
//! value ([`get`](ConcurrentLruCache::get), which requires `V: Clone`) or run
//! a caller-supplied closure against the entry while the lock is held
//! ([`get_with`](ConcurrentLruCache::get_with)). Keep such closures short.
//!
//! Requires the `concurrent` feature.

extern crate alloc;

use crate::config::{LfuCacheConfig, LruCacheConfig};
use crate::error::ConfigError;
use crate::lfu::LfuSegment;
use crate::lru::LruSegment;
use crate::metrics::CacheMetrics;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A thread-safe Least Recently Used (LRU) cache.
///
/// All operations serialize on one internal mutex, so methods take `&self`
/// and the type is `Send + Sync` whenever `K` and `V` are.
///
/// # Examples
///
/// ```
/// use evcache::ConcurrentLruCache;
/// use core::num::NonZeroUsize;
/// use std::sync::Arc;
/// use std::thread;
///
/// let cache = Arc::new(ConcurrentLruCache::new(NonZeroUsize::new(64).unwrap()));
///
/// let handles: Vec<_> = (0..4u32)
///     .map(|t| {
///         let cache = Arc::clone(&cache);
///         thread::spawn(move || {
///             for i in 0..8u32 {
///                 cache.put((t, i), i);
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(cache.len(), 32);
/// assert_eq!(cache.get(&(0, 3)), Some(3));
/// ```
pub struct ConcurrentLruCache<K, V, S = DefaultHashBuilder> {
    inner: Mutex<LruSegment<K, V, S>>,
}

impl<K: Hash + Eq, V> ConcurrentLruCache<K, V> {
    /// Creates a new concurrent LRU cache with the specified capacity.
    pub fn new(cap: NonZeroUsize) -> Self {
        Self::with_hasher(cap, DefaultHashBuilder::default())
    }

    /// Creates a new concurrent LRU cache from a config.
    pub fn init(config: LruCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::with_hasher(config.capacity, hasher.unwrap_or_default())
    }

    /// Validates a runtime-supplied capacity and creates the cache.
    pub fn try_init(capacity: usize) -> Result<Self, ConfigError> {
        LruCacheConfig::try_new(capacity).map(|config| Self::init(config, None))
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ConcurrentLruCache<K, V, S> {
    /// Creates a new concurrent LRU cache with the specified capacity and
    /// hash builder.
    pub fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        Self {
            inner: Mutex::new(LruSegment::with_hasher(cap, hash_builder)),
        }
    }

    /// Returns the maximum number of key-value pairs the cache can hold.
    pub fn cap(&self) -> NonZeroUsize {
        self.inner.lock().cap()
    }

    /// Returns the current number of key-value pairs in the cache.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the cache contains no key-value pairs.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns a clone of the value corresponding to the key.
    ///
    /// A hit moves the entry to the most-recently-used position.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Runs `f` against the cached value while the lock is held.
    ///
    /// Avoids the `V: Clone` requirement of [`get`](Self::get) when the
    /// caller only needs to read a part of the value.
    pub fn get_with<Q, R>(&self, key: &Q, f: impl FnOnce(&V) -> R) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().get(key).map(f)
    }

    /// Runs `f` against a mutable reference to the cached value while the
    /// lock is held.
    pub fn get_mut_with<Q, R>(&self, key: &Q, f: impl FnOnce(&mut V) -> R) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().get_mut(key).map(f)
    }

    /// Returns a clone of the cached value, or `miss` on a miss.
    pub fn get_or<Q>(&self, key: &Q, miss: V) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.get(key).unwrap_or(miss)
    }

    /// Inserts a key-value pair; returns the displaced pair, if any.
    pub fn put(&self, key: K, value: V) -> Option<(K, V)>
    where
        K: Clone,
    {
        self.inner.lock().put(key, value)
    }

    /// Removes a key from the cache, returning its value if present.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().remove(key)
    }

    /// Removes and returns the eviction candidate (least recently used).
    pub fn pop(&self) -> Option<(K, V)> {
        self.inner.lock().pop()
    }

    /// Clears the cache, removing all key-value pairs.
    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    /// Asserts internal index/list consistency; panics on violation.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate(&self) {
        self.inner.lock().debug_validate()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for ConcurrentLruCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.inner.lock().metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}

impl<K, V, S> core::fmt::Debug for ConcurrentLruCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConcurrentLruCache").finish_non_exhaustive()
    }
}

/// A thread-safe Least Frequently Used (LFU) cache.
///
/// All operations serialize on one internal mutex, so methods take `&self`
/// and the type is `Send + Sync` whenever `K` and `V` are.
pub struct ConcurrentLfuCache<K, V, S = DefaultHashBuilder> {
    inner: Mutex<LfuSegment<K, V, S>>,
}

impl<K: Hash + Eq, V> ConcurrentLfuCache<K, V> {
    /// Creates a new concurrent LFU cache with the specified capacity.
    pub fn new(cap: NonZeroUsize) -> Self {
        Self::with_hasher(cap, DefaultHashBuilder::default())
    }

    /// Creates a new concurrent LFU cache from a config.
    pub fn init(config: LfuCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::with_hasher(config.capacity, hasher.unwrap_or_default())
    }

    /// Validates a runtime-supplied capacity and creates the cache.
    pub fn try_init(capacity: usize) -> Result<Self, ConfigError> {
        LfuCacheConfig::try_new(capacity).map(|config| Self::init(config, None))
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ConcurrentLfuCache<K, V, S> {
    /// Creates a new concurrent LFU cache with the specified capacity and
    /// hash builder.
    pub fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        Self {
            inner: Mutex::new(LfuSegment::with_hasher(cap, hash_builder)),
        }
    }

    /// Returns the maximum number of key-value pairs the cache can hold.
    pub fn cap(&self) -> NonZeroUsize {
        self.inner.lock().cap()
    }

    /// Returns the current number of key-value pairs in the cache.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the cache contains no key-value pairs.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns a clone of the value corresponding to the key.
    ///
    /// A hit increments the entry's access count.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Runs `f` against the cached value while the lock is held.
    pub fn get_with<Q, R>(&self, key: &Q, f: impl FnOnce(&V) -> R) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().get(key).map(f)
    }

    /// Runs `f` against a mutable reference to the cached value while the
    /// lock is held.
    pub fn get_mut_with<Q, R>(&self, key: &Q, f: impl FnOnce(&mut V) -> R) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().get_mut(key).map(f)
    }

    /// Returns a clone of the cached value, or `miss` on a miss.
    pub fn get_or<Q>(&self, key: &Q, miss: V) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.get(key).unwrap_or(miss)
    }

    /// Returns the access count of `key` without counting as an access.
    pub fn frequency<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().frequency(key)
    }

    /// Inserts a key-value pair; returns the displaced pair, if any.
    ///
    /// Updating an existing key counts as an access and increments its
    /// frequency.
    pub fn put(&self, key: K, value: V) -> Option<(K, V)>
    where
        K: Clone,
    {
        self.inner.lock().put(key, value)
    }

    /// Removes a key from the cache, returning its value if present.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().remove(key)
    }

    /// Removes and returns the eviction candidate.
    pub fn pop(&self) -> Option<(K, V)> {
        self.inner.lock().pop()
    }

    /// Clears the cache, removing all key-value pairs.
    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    /// Asserts internal index/bucket consistency; panics on violation.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate(&self) {
        self.inner.lock().debug_validate()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for ConcurrentLfuCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.inner.lock().metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        "LFU"
    }
}

impl<K, V, S> core::fmt::Debug for ConcurrentLfuCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConcurrentLfuCache").finish_non_exhaustive()
    }
}
