//! Health and metrics reports, plus periodic cache housekeeping.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;

use super::QuoteGateway;
use crate::stats::ResponseTimeSummary;

/// Shortest sweep period; shorter requests are raised to this.
pub const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(1);

/// Overall service health, cache state and request statistics.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub cache: CacheHealth,
    pub performance: PerformanceSummary,
    pub config: ConfigSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheHealth {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_ratio: f64,
    /// Entries removed by the sweep that ran while building this report.
    pub expired_cleaned: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    pub request_counts: BTreeMap<String, u64>,
    /// Seconds.
    pub avg_response_times: BTreeMap<String, f64>,
    pub error_counts: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub max_workers: usize,
    pub cache_ttl_secs: u64,
}

/// Detailed counters, per-label latency included.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache: CacheCounters,
    pub requests: BTreeMap<String, u64>,
    pub errors: BTreeMap<String, u64>,
    pub response_times: BTreeMap<String, ResponseTimeSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheCounters {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl QuoteGateway {
    /// Sweep expired cache entries, then report health.
    pub fn health(&self) -> HealthReport {
        let cache = &self.inner.cache;
        let expired_cleaned = cache.sweep_expired();
        let snap = self.inner.stats.snapshot();

        HealthReport {
            status: if self.is_shut_down() { "shutting_down" } else { "healthy" },
            timestamp: Utc::now(),
            cache: CacheHealth {
                size: cache.len(),
                capacity: cache.capacity(),
                hits: snap.cache_hits,
                misses: snap.cache_misses,
                hit_ratio: snap.hit_ratio(),
                expired_cleaned,
            },
            performance: PerformanceSummary {
                avg_response_times: snap.avg_response_times(),
                request_counts: snap.request_counts,
                error_counts: snap.error_counts,
            },
            config: ConfigSummary {
                max_workers: self.inner.max_workers,
                cache_ttl_secs: cache.ttl().as_secs(),
            },
        }
    }

    /// Report every counter without touching the cache.
    pub fn metrics_report(&self) -> MetricsReport {
        let snap = self.inner.stats.snapshot();
        MetricsReport {
            cache: CacheCounters {
                hits: snap.cache_hits,
                misses: snap.cache_misses,
                size: self.inner.cache.len(),
            },
            requests: snap.request_counts,
            errors: snap.error_counts,
            response_times: snap.response_time_summary,
        }
    }

    /// Sweep expired cache entries every `period` (at least
    /// [`MIN_SWEEP_PERIOD`]).
    ///
    /// The task holds only a weak reference and exits once every clone of
    /// this gateway has been dropped.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let inner = Arc::downgrade(&self.inner);
        let period = period.max(MIN_SWEEP_PERIOD);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = inner.upgrade() else {
                    debug!("gateway dropped, sweeper exiting");
                    break;
                };
                inner.cache.sweep_expired();
            }
        })
    }
}
