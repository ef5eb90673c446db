//! The capability interface shared by all eviction policies.
//!
//! [`CachePolicy`] is the contract a caller can program against without
//! committing to a concrete policy: insert-or-update, lookup with an access
//! side effect, and the capacity accessors. Both [`LruCache`](crate::LruCache)
//! and [`LfuCache`](crate::LfuCache) implement it, so the two are drop-in
//! replacements for each other behind a generic parameter or a trait object.
//!
//! Lookup misses are communicated through `Option`; they are expected
//! outcomes, not errors. The [`get_or`](CachePolicy::get_or) convenience
//! collapses a miss into a caller-chosen sentinel value, which is only
//! meaningful for value types where the sentinel cannot collide with a real
//! cached value — prefer [`get`](CachePolicy::get) where possible.
//!
//! # Examples
//!
//! ```
//! use evcache::{CachePolicy, LfuCache, LruCache};
//! use core::num::NonZeroUsize;
//!
//! fn warm<C: CachePolicy<u32, u32>>(cache: &mut C) {
//!     cache.put(1, 10);
//!     cache.put(2, 20);
//!     assert_eq!(cache.get(&1), Some(&10));
//!     assert_eq!(cache.get_or(&9, u32::MAX), u32::MAX);
//! }
//!
//! warm(&mut LruCache::<u32, u32>::new(NonZeroUsize::new(4).unwrap()));
//! warm(&mut LfuCache::<u32, u32>::new(NonZeroUsize::new(4).unwrap()));
//! ```

use core::num::NonZeroUsize;

/// Common interface implemented by every eviction policy in this crate.
pub trait CachePolicy<K, V> {
    /// Inserts or updates a key-value pair.
    ///
    /// Always succeeds: if the key is present its value is overwritten, and
    /// if the cache is at capacity an entry chosen by the policy is evicted
    /// first. Returns the displaced pair — the replaced old pair on update,
    /// the evicted pair on insert-at-capacity, `None` otherwise.
    ///
    /// Updating an existing key counts as an access: it refreshes the
    /// entry's recency (LRU) or increments its frequency (LFU), the same as
    /// a `get` would.
    fn put(&mut self, key: K, value: V) -> Option<(K, V)>;

    /// Looks up a key, returning `None` on a miss.
    ///
    /// A hit performs the policy's access-tracking side effect (recency or
    /// frequency update); repeated reads of the same key keep returning the
    /// same value.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Sentinel-miss convenience: returns the cached value, or `miss`.
    ///
    /// Equivalent to `get` with the miss collapsed into a distinguished
    /// value. Ambiguous when `miss` can legitimately be stored in the cache;
    /// callers who need to distinguish must use [`get`](Self::get).
    fn get_or(&mut self, key: &K, miss: V) -> V
    where
        V: Clone,
    {
        match self.get(key) {
            Some(value) => value.clone(),
            None => miss,
        }
    }

    /// Returns the current number of cached entries.
    fn len(&self) -> usize;

    /// Returns the maximum number of entries the cache can hold.
    fn cap(&self) -> NonZeroUsize;

    /// Returns `true` if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries.
    fn clear(&mut self);
}
