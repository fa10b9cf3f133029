//! Caching subsystem.
//!
//! - [`ExpiringCache`]: bounded LRU + TTL key/value store, shared by every
//!   lookup worker. Generic over key and value.
//!
//! - [`QuoteCache`]: the instance the gateway uses: ticker →
//!   `(display name, QuoteResult)`. Error results are stored too, so a
//!   failing ticker is not re-fetched until its entry expires.

pub mod expiring;

pub use expiring::ExpiringCache;

use std::time::Duration;

use crate::types::QuoteResult;

/// Cache of resolved tickers: ticker → (display name, result).
pub type QuoteCache = ExpiringCache<String, (String, QuoteResult)>;

/// Configuration for the quote cache.
///
/// ```rust
/// # use stockwire::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .capacity(500)
///     .ttl(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached tickers. Default: 1,000.
    pub capacity: usize,
    /// Time-to-live for cached entries, errors included. Default: 60s.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000,
            ttl: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn capacity(mut self, n: usize) -> Self {
        self.capacity = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}
