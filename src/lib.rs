#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Modules
//!
//! - [`lru`]: Least Recently Used cache implementation
//! - [`lfu`]: Least Frequently Used cache implementation
//! - [`policy`]: the [`CachePolicy`] capability interface shared by all policies
//! - [`config`]: configuration structures for all cache algorithms
//! - [`error`]: construction-time error types
//! - [`metrics`]: metrics collection for cache performance monitoring
//! - [`concurrent`]: thread-safe cache wrappers (requires the `concurrent` feature)

#![no_std]

#[cfg(any(test, not(feature = "hashbrown"), feature = "std"))]
extern crate std;

extern crate alloc;

/// Arena-backed doubly linked list with a sentinel slot.
///
/// Internal infrastructure shared by the cache implementations; not part of
/// the public API. Nodes are addressed by stable integer handles into a slot
/// arena, so ordering updates are O(1) splices without raw pointers.
pub(crate) mod list;

/// Construction-time error types.
pub mod error;

/// Cache configuration structures.
///
/// Provides configuration structures for all cache algorithm implementations.
pub mod config;

/// The capability interface shared by all eviction policies.
pub mod policy;

/// Least Recently Used (LRU) cache implementation.
///
/// Provides a fixed-size cache that evicts the least recently used items when
/// the capacity is reached.
pub mod lru;

/// Least Frequently Used (LFU) cache implementation.
///
/// Provides a fixed-size cache that evicts the least frequently used items
/// when capacity is reached. Items are tracked by their access frequency.
pub mod lfu;

/// Cache metrics system.
///
/// Provides a metrics collection and reporting system for all cache
/// algorithms. Each algorithm can track algorithm-specific metrics while
/// implementing a common interface.
pub mod metrics;

/// Thread-safe cache wrappers.
///
/// Each wrapper serializes all operations on one mutex per cache instance.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

// Re-export cache types
pub use lfu::LfuCache;
pub use lru::LruCache;

// Re-export the policy and metrics interfaces
pub use metrics::CacheMetrics;
pub use policy::CachePolicy;

// Re-export construction errors
pub use error::ConfigError;

#[cfg(feature = "concurrent")]
pub use concurrent::{ConcurrentLfuCache, ConcurrentLruCache};
