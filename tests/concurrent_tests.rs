//! Concurrent Cache Correctness Tests
//!
//! These tests validate that the concurrent cache wrappers maintain correct
//! eviction semantics and internal consistency while being accessed from
//! multiple threads.
//!
//! ## Test Strategy
//!
//! - Writers on disjoint key ranges must never lose updates to each other
//! - Small caches validate eviction behavior matches the sequential policy
//! - Structural invariants are validated after the threads join
//! - Mixed-operation stress runs check nothing panics or corrupts state

#![cfg(feature = "concurrent")]

use evcache::metrics::CacheMetrics;
use evcache::{ConcurrentLfuCache, ConcurrentLruCache};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

const THREADS: u32 = 4;
const KEYS_PER_THREAD: u32 = 64;

// ============================================================================
// SEGMENT 1: NO LOST UPDATES ON DISJOINT KEY RANGES
// ============================================================================

#[test]
fn test_concurrent_lru_disjoint_writers_lose_nothing() {
    let total = THREADS * KEYS_PER_THREAD;
    let cache: Arc<ConcurrentLruCache<u32, u32>> = Arc::new(ConcurrentLruCache::new(
        NonZeroUsize::new(total as usize).unwrap(),
    ));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..KEYS_PER_THREAD {
                    let key = t * KEYS_PER_THREAD + i;
                    cache.put(key, key * 10);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Capacity covers every key, so nothing was evicted and every write
    // must be visible with its own thread's value.
    assert_eq!(cache.len(), total as usize);
    for key in 0..total {
        assert_eq!(cache.get(&key), Some(key * 10), "lost update for {}", key);
    }
    cache.debug_validate();
}

#[test]
fn test_concurrent_lfu_disjoint_writers_lose_nothing() {
    let total = THREADS * KEYS_PER_THREAD;
    let cache: Arc<ConcurrentLfuCache<u32, u32>> = Arc::new(ConcurrentLfuCache::new(
        NonZeroUsize::new(total as usize).unwrap(),
    ));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..KEYS_PER_THREAD {
                    let key = t * KEYS_PER_THREAD + i;
                    cache.put(key, key * 10);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), total as usize);
    for key in 0..total {
        assert_eq!(cache.get(&key), Some(key * 10), "lost update for {}", key);
    }
    cache.debug_validate();
}

// ============================================================================
// SEGMENT 2: EVICTION SEMANTICS MATCH THE SEQUENTIAL POLICY
// ============================================================================

#[test]
fn test_concurrent_lru_access_prevents_eviction() {
    let cache: ConcurrentLruCache<i32, i32> =
        ConcurrentLruCache::new(NonZeroUsize::new(3).unwrap());

    cache.put(1, 10);
    cache.put(2, 20);
    cache.put(3, 30);

    // Access key 1 so key 2 becomes the LRU candidate.
    assert_eq!(cache.get(&1), Some(10));

    cache.put(4, 40);
    assert!(cache.get(&2).is_none(), "key 2 should be evicted (LRU)");
    assert!(cache.get(&1).is_some(), "key 1 was recently accessed");
    assert!(cache.get(&3).is_some());
    assert!(cache.get(&4).is_some());
    cache.debug_validate();
}

#[test]
fn test_concurrent_lfu_protects_frequent_keys() {
    let cache: ConcurrentLfuCache<i32, i32> =
        ConcurrentLfuCache::new(NonZeroUsize::new(2).unwrap());

    cache.put(1, 10);
    cache.put(2, 20);
    cache.get(&1);
    cache.get(&1);

    // Key 2 has the lowest frequency and is evicted.
    cache.put(3, 30);
    assert!(cache.get(&2).is_none());
    assert_eq!(cache.get(&1), Some(10));
    assert_eq!(cache.frequency(&1), Some(4));
    cache.debug_validate();
}

// ============================================================================
// SEGMENT 3: MIXED-OPERATION CONTENTION
// ============================================================================

#[test]
fn test_concurrent_lru_mixed_operations_keep_invariants() {
    let cache: Arc<ConcurrentLruCache<u32, u32>> =
        Arc::new(ConcurrentLruCache::new(NonZeroUsize::new(32).unwrap()));

    let mut pool = scoped_threadpool::Pool::new(THREADS);
    pool.scoped(|scope| {
        for t in 0..THREADS {
            let cache = Arc::clone(&cache);
            scope.execute(move || {
                for i in 0..500u32 {
                    let key = (t * 31 + i) % 97;
                    match i % 5 {
                        0 | 1 => {
                            cache.put(key, i);
                        }
                        2 | 3 => {
                            cache.get(&key);
                        }
                        _ => {
                            cache.remove(&key);
                        }
                    }
                    assert!(cache.len() <= 32);
                }
            });
        }
    });

    cache.debug_validate();
    let report = cache.metrics();
    assert!(report.get("requests").copied().unwrap_or(0.0) > 0.0);
}

#[test]
fn test_concurrent_lfu_mixed_operations_keep_invariants() {
    let cache: Arc<ConcurrentLfuCache<u32, u32>> =
        Arc::new(ConcurrentLfuCache::new(NonZeroUsize::new(32).unwrap()));

    let mut pool = scoped_threadpool::Pool::new(THREADS);
    pool.scoped(|scope| {
        for t in 0..THREADS {
            let cache = Arc::clone(&cache);
            scope.execute(move || {
                for i in 0..500u32 {
                    let key = (t * 37 + i) % 97;
                    match i % 6 {
                        0 | 1 => {
                            cache.put(key, i);
                        }
                        2 | 3 => {
                            cache.get(&key);
                        }
                        4 => {
                            cache.remove(&key);
                        }
                        _ => {
                            cache.pop();
                        }
                    }
                    assert!(cache.len() <= 32);
                }
            });
        }
    });

    cache.debug_validate();
    assert_eq!(cache.algorithm_name(), "LFU");
}

// ============================================================================
// SEGMENT 4: SHARED-REFERENCE API
// ============================================================================

#[test]
fn test_closure_access_without_cloning() {
    let cache: ConcurrentLruCache<&str, Vec<u8>> =
        ConcurrentLruCache::new(NonZeroUsize::new(4).unwrap());
    cache.put("blob", vec![1, 2, 3]);

    assert_eq!(cache.get_with(&"blob", |v| v.len()), Some(3));
    cache.get_mut_with(&"blob", |v| v.push(4));
    assert_eq!(cache.get_with(&"blob", |v| v.len()), Some(4));
    assert_eq!(cache.get_with(&"missing", |v| v.len()), None);
}

#[test]
fn test_concurrent_readers_share_one_instance() {
    let cache: Arc<ConcurrentLfuCache<u32, u32>> =
        Arc::new(ConcurrentLfuCache::new(NonZeroUsize::new(8).unwrap()));
    for i in 0..8 {
        cache.put(i, i);
    }

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..8 {
                    assert_eq!(cache.get(&i), Some(i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Every key was read once per thread on top of its insertion.
    for i in 0..8 {
        assert_eq!(cache.frequency(&i), Some(1 + THREADS as usize));
    }
    cache.debug_validate();
}
