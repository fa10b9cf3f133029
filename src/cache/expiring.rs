//! Bounded LRU + TTL cache.
//!
//! Entries live in an [`IndexMap`] whose order is recency of access: the
//! front is the least recently used entry, the back the most recent. On a
//! capacity overflow the front entry is evicted. Expiry is checked lazily on
//! [`get`](ExpiringCache::get) and eagerly by
//! [`sweep_expired`](ExpiringCache::sweep_expired).
//!
//! Every operation takes the same mutex, so size, order and counters are
//! never observed half-updated. The lock is never held across an `.await`.
//!
//! Time comes from [`tokio::time::Instant`], which follows the paused test
//! clock under `tokio::time::pause()`.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::CacheConfig;
use crate::stats::MetricsCollector;
use crate::telemetry;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }
}

/// Thread-safe key/value store with capacity eviction and time-based expiry.
///
/// Capacity and TTL are fixed at construction. Values are cloned out on a
/// hit; store an `Arc` if `V` is expensive to clone.
pub struct ExpiringCache<K, V> {
    entries: Mutex<IndexMap<K, CacheEntry<V>>>,
    capacity: usize,
    ttl: Duration,
    stats: Option<Arc<MetricsCollector>>,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries (minimum 1), each
    /// fresh for `ttl` after insertion.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(IndexMap::with_capacity(capacity.min(4_096))),
            capacity,
            ttl,
            stats: None,
        }
    }

    /// Create a cache from a [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, config.ttl)
    }

    /// Report hits and misses to `stats`.
    pub fn with_stats(mut self, stats: Arc<MetricsCollector>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Look up `key`.
    ///
    /// A hit requires the entry to be younger than the TTL; it moves the key
    /// to the most recently used position. A stale entry is removed and
    /// counted as a miss.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let hit = {
            let mut entries = self.entries.lock();
            match entries.shift_remove_entry(key) {
                Some((k, entry)) if entry.age(now) < self.ttl => {
                    let value = entry.value.clone();
                    entries.insert(k, entry);
                    Some(value)
                }
                // stale: already removed by shift_remove_entry
                Some(_) => None,
                None => None,
            }
        };

        if let Some(stats) = &self.stats {
            match hit {
                Some(_) => stats.record_cache_hit(),
                None => stats.record_cache_miss(),
            }
        }
        hit
    }

    /// Insert or replace `key`.
    ///
    /// An existing key gets the new value, a fresh timestamp, and moves to
    /// the most recently used position. A new key on a full cache first
    /// evicts the least recently used entry.
    pub fn set(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };
        let mut entries = self.entries.lock();
        if entries.shift_remove(&key).is_none() && entries.len() >= self.capacity {
            entries.shift_remove_index(0);
        }
        entries.insert(key, entry);
    }

    /// Remove every entry older than the TTL, regardless of recency.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let removed = {
            let mut entries = self.entries.lock();
            let before = entries.len();
            entries.retain(|_, entry| entry.age(now) <= self.ttl);
            before - entries.len()
        };
        if removed > 0 {
            debug!(removed, "swept expired cache entries");
            metrics::counter!(telemetry::CACHE_EXPIRED_TOTAL).increment(removed as u64);
        }
        removed
    }

    /// Number of entries currently stored, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Evict all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
