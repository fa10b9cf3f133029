//! Quote gateway: cached, retried lookups and batch enrichment.
//!
//! [`QuoteGateway`] is built once at startup through [`Stockwire::builder()`]
//! and shared by handle. It owns the quote cache, the metrics collector and
//! the worker pool; nothing here is a global.
//!
//! Composition of a tracked lookup, outermost first:
//!
//! ```text
//! metrics timer ─► ticker validation ─► cache ─► retry (+ per-attempt timeout) ─► provider
//! ```
//!
//! The timer wraps the retry loop, so recorded latency includes backoff.
//!
//! Concurrent batch calls that miss the cache for the same ticker may both
//! call the provider; in-flight lookups are not coalesced.

mod builder;
mod enrich;
mod health;
mod lookup;

pub use builder::{Stockwire, StockwireBuilder};
pub use enrich::BatchResult;
pub use health::{
    CacheCounters, CacheHealth, ConfigSummary, HealthReport, MIN_SWEEP_PERIOD, MetricsReport,
    PerformanceSummary,
};
pub use lookup::{DIRECT_LOOKUP_LABEL, QuoteGateway};
