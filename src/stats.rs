//! In-process metrics collector.
//!
//! [`MetricsCollector`] keeps process-lifetime counters keyed by a
//! caller-supplied label (the logical endpoint name) and can be read at
//! any time through [`MetricsCollector::snapshot()`] without resetting
//! anything. Every update is mirrored to the `metrics` facade using the
//! names in [`telemetry`](crate::telemetry).
//!
//! # Sample retention
//!
//! Per-label count, sum, min and max are exact for the lifetime of the
//! collector. Individual samples are kept only for the most recent
//! [`SAMPLE_WINDOW`] observations per label (oldest dropped first), so
//! memory stays bounded in long-running processes.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use crate::telemetry;

/// Number of raw response-time samples retained per label.
pub const SAMPLE_WINDOW: usize = 1_024;

#[derive(Debug, Default)]
struct Samples {
    count: u64,
    total: Duration,
    min: Option<Duration>,
    max: Option<Duration>,
    recent: VecDeque<Duration>,
}

impl Samples {
    fn push(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total = self.total.saturating_add(elapsed);
        self.min = Some(self.min.map_or(elapsed, |m| m.min(elapsed)));
        self.max = Some(self.max.map_or(elapsed, |m| m.max(elapsed)));
        if self.recent.len() == SAMPLE_WINDOW {
            self.recent.pop_front();
        }
        self.recent.push_back(elapsed);
    }

    fn summary(&self) -> ResponseTimeSummary {
        let avg = if self.count == 0 {
            0.0
        } else {
            self.total.as_secs_f64() / self.count as f64
        };
        ResponseTimeSummary {
            count: self.count,
            avg,
            min: self.min.map_or(0.0, |d| d.as_secs_f64()),
            max: self.max.map_or(0.0, |d| d.as_secs_f64()),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    requests: BTreeMap<String, u64>,
    errors: BTreeMap<String, u64>,
    response_times: BTreeMap<String, Samples>,
    cache_hits: u64,
    cache_misses: u64,
}

/// Aggregated response times for one label, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponseTimeSummary {
    pub count: u64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Point-in-time copy of every counter in a [`MetricsCollector`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub request_counts: BTreeMap<String, u64>,
    pub error_counts: BTreeMap<String, u64>,
    /// Most recent samples per label (at most [`SAMPLE_WINDOW`]).
    pub response_times: BTreeMap<String, Vec<Duration>>,
    /// Exact lifetime aggregates per label.
    pub response_time_summary: BTreeMap<String, ResponseTimeSummary>,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl MetricsSnapshot {
    /// `hits / (hits + misses)`, or 0 when nothing has been looked up yet.
    pub fn hit_ratio(&self) -> f64 {
        hit_ratio(self.cache_hits, self.cache_misses)
    }

    /// Average response time in seconds per label.
    pub fn avg_response_times(&self) -> BTreeMap<String, f64> {
        self.response_time_summary
            .iter()
            .filter(|(_, s)| s.count > 0)
            .map(|(label, s)| (label.clone(), s.avg))
            .collect()
    }
}

fn emit_error(label: &str, kind: &'static str) {
    metrics::counter!(telemetry::ERRORS_TOTAL,
        "label" => label.to_owned(),
        "kind" => kind,
    )
    .increment(1);
}

fn hit_ratio(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

/// Thread-safe, monotonically accumulating metrics store.
///
/// Constructed once at startup and shared via `Arc` with the cache and the
/// gateway. All reads and writes go through a single mutex, so snapshots
/// never observe a half-applied update.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    inner: Mutex<Inner>,
}

impl MetricsCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed request for `label` and how long it took.
    pub fn record_request(&self, label: &str, elapsed: Duration) {
        self.record(label, elapsed, None);
    }

    /// Record one failed request for `label`.
    pub fn record_error(&self, label: &str, kind: &'static str) {
        *self.inner.lock().errors.entry(label.to_owned()).or_default() += 1;
        emit_error(label, kind);
    }

    /// Record one completed request and, when `error_kind` is set, its
    /// failure. Both counters move under a single lock.
    pub fn record(&self, label: &str, elapsed: Duration, error_kind: Option<&'static str>) {
        {
            let mut inner = self.inner.lock();
            *inner.requests.entry(label.to_owned()).or_default() += 1;
            inner
                .response_times
                .entry(label.to_owned())
                .or_default()
                .push(elapsed);
            if error_kind.is_some() {
                *inner.errors.entry(label.to_owned()).or_default() += 1;
            }
        }
        metrics::counter!(telemetry::REQUESTS_TOTAL, "label" => label.to_owned()).increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "label" => label.to_owned())
            .record(elapsed.as_secs_f64());
        if let Some(kind) = error_kind {
            emit_error(label, kind);
        }
    }

    pub fn record_cache_hit(&self) {
        self.inner.lock().cache_hits += 1;
        metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
    }

    pub fn record_cache_miss(&self) {
        self.inner.lock().cache_misses += 1;
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
    }

    pub fn cache_hits(&self) -> u64 {
        self.inner.lock().cache_hits
    }

    pub fn cache_misses(&self) -> u64 {
        self.inner.lock().cache_misses
    }

    /// Cache hit ratio, defined as 0 when there have been no lookups.
    pub fn hit_ratio(&self) -> f64 {
        let inner = self.inner.lock();
        hit_ratio(inner.cache_hits, inner.cache_misses)
    }

    /// Copy out every counter without resetting anything.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.lock();
        MetricsSnapshot {
            request_counts: inner.requests.clone(),
            error_counts: inner.errors.clone(),
            response_times: inner
                .response_times
                .iter()
                .map(|(label, s)| (label.clone(), s.recent.iter().copied().collect()))
                .collect(),
            response_time_summary: inner
                .response_times
                .iter()
                .map(|(label, s)| (label.clone(), s.summary()))
                .collect(),
            cache_hits: inner.cache_hits,
            cache_misses: inner.cache_misses,
        }
    }
}
