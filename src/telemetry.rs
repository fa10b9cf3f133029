//! Telemetry metric name constants.
//!
//! Centralised metric names for stockwire operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops. The in-process
//! [`MetricsCollector`](crate::stats::MetricsCollector) is updated
//! regardless of whether a recorder is present.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `stockwire_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `label`: logical endpoint name supplied by the caller
//!   (e.g. "news-with-stock", "company-stockInfo")
//! - `provider`: quote provider name (e.g. "yahoo")
//! - `kind`: error class ("validation", "provider", "incomplete_data", "decode",
//!   "fanout", or "cached" for an error served from cache)

/// Total ticker resolutions, cache hits included.
///
/// Labels: `label`.
pub const REQUESTS_TOTAL: &str = "stockwire_requests_total";

/// Ticker resolution duration in seconds, retry backoff included.
///
/// Labels: `label`.
pub const REQUEST_DURATION_SECONDS: &str = "stockwire_request_duration_seconds";

/// Resolutions that ended in an error payload.
///
/// Labels: `label`, `kind`.
pub const ERRORS_TOTAL: &str = "stockwire_errors_total";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `provider`.
pub const RETRIES_TOTAL: &str = "stockwire_retries_total";

/// Total quote cache hits.
pub const CACHE_HITS_TOTAL: &str = "stockwire_cache_hits_total";

/// Total quote cache misses, stale entries included.
pub const CACHE_MISSES_TOTAL: &str = "stockwire_cache_misses_total";

/// Entries removed by an explicit expiry sweep.
pub const CACHE_EXPIRED_TOTAL: &str = "stockwire_cache_expired_total";
