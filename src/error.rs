//! Error types for cache configuration.
//!
//! The cache itself has no recoverable failure modes: a lookup miss is a
//! normal `None` return, never an error. The only thing that can go wrong is
//! constructing a cache with an invalid configuration, which is rejected
//! eagerly here instead of producing a cache with undefined eviction
//! behavior.

use core::fmt;

#[cfg(feature = "std")]
extern crate std;

/// Error returned when cache configuration parameters are invalid.
///
/// Configs carry their capacity as [`NonZeroUsize`](core::num::NonZeroUsize),
/// so a zero capacity is unrepresentable once a config exists. This error is
/// produced by the `try_new` / `try_init` constructors that accept a plain
/// `usize` from runtime input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested capacity was zero. A cache must hold at least one entry.
    ZeroCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroCapacity => f.write_str("cache capacity must be at least 1"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ZeroCapacity;
        assert_eq!(err.to_string(), "cache capacity must be at least 1");
    }
}
