//! Cache configuration structures.
//!
//! Each cache algorithm has a dedicated config struct with public fields, so
//! a config is just a struct literal. Capacity is counted in entries and is
//! carried as a [`NonZeroUsize`]: a zero-capacity cache is not a valid
//! configuration and cannot be expressed once a config exists. The `try_new`
//! constructors accept a plain `usize` for capacities that arrive from
//! runtime input and reject zero with [`ConfigError::ZeroCapacity`].
//!
//! # Examples
//!
//! ```
//! use evcache::config::LruCacheConfig;
//! use core::num::NonZeroUsize;
//!
//! let config = LruCacheConfig {
//!     capacity: NonZeroUsize::new(1024).unwrap(),
//! };
//! assert_eq!(config.capacity.get(), 1024);
//!
//! // Runtime-supplied capacity goes through validation instead.
//! assert!(LruCacheConfig::try_new(0).is_err());
//! ```

use crate::error::ConfigError;
use core::num::NonZeroUsize;

/// Configuration for an LRU (Least Recently Used) cache.
///
/// LRU evicts the entry that has gone longest without being accessed.
#[derive(Debug, Clone, Copy)]
pub struct LruCacheConfig {
    /// Maximum number of key-value pairs the cache can hold.
    pub capacity: NonZeroUsize,
}

impl LruCacheConfig {
    /// Creates a config with the given capacity.
    pub fn new(capacity: NonZeroUsize) -> Self {
        LruCacheConfig { capacity }
    }

    /// Validates a runtime-supplied capacity, rejecting zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(capacity)
            .map(Self::new)
            .ok_or(ConfigError::ZeroCapacity)
    }
}

/// Configuration for an LFU (Least Frequently Used) cache.
///
/// LFU evicts the entry with the lowest access count, breaking ties by
/// recency within the lowest-frequency bucket.
#[derive(Debug, Clone, Copy)]
pub struct LfuCacheConfig {
    /// Maximum number of key-value pairs the cache can hold.
    pub capacity: NonZeroUsize,
}

impl LfuCacheConfig {
    /// Creates a config with the given capacity.
    pub fn new(capacity: NonZeroUsize) -> Self {
        LfuCacheConfig { capacity }
    }

    /// Validates a runtime-supplied capacity, rejecting zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(capacity)
            .map(Self::new)
            .ok_or(ConfigError::ZeroCapacity)
    }
}
