//! Single-ticker resolution.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::cache::QuoteCache;
use crate::providers::QuoteProvider;
use crate::stats::MetricsCollector;
use crate::types::{Quote, QuoteResult, validate_raw_quote, validate_ticker};

/// Metrics label used for direct lookups made outside any endpoint.
pub const DIRECT_LOOKUP_LABEL: &str = "company-stockInfo";

pub(super) struct GatewayInner {
    /// Already wrapped in retry (and timeout) decorators.
    pub(super) provider: Arc<dyn QuoteProvider>,
    pub(super) cache: QuoteCache,
    pub(super) stats: Arc<MetricsCollector>,
    pub(super) workers: Arc<Semaphore>,
    pub(super) max_workers: usize,
}

/// Resolves tickers to quotes through a shared cache and a retrying provider.
///
/// Cheap to clone: all clones share one cache, one metrics collector and
/// one worker pool.
#[derive(Clone)]
pub struct QuoteGateway {
    pub(super) inner: Arc<GatewayInner>,
}

/// How a lookup was answered, for metrics.
pub(super) struct Resolution {
    pub(super) name: String,
    pub(super) result: QuoteResult,
    /// Error class when `result` is an error.
    pub(super) error_kind: Option<&'static str>,
}

impl QuoteGateway {
    pub(super) fn from_inner(inner: GatewayInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Resolve one ticker to `(display name, result)`.
    ///
    /// 1. A malformed ticker returns an error immediately; the provider is
    ///    never called and nothing is cached.
    /// 2. A fresh cache entry is returned as-is, errors included.
    /// 3. Otherwise the provider is called (with retries). Incomplete data
    ///    becomes an error result without further retries. Success or
    ///    failure, the outcome is cached under the ticker.
    ///
    /// Failed lookups are keyed by the ticker itself.
    pub async fn lookup(&self, ticker: &str) -> (String, QuoteResult) {
        let resolution = self.resolve(ticker).await;
        (resolution.name, resolution.result)
    }

    /// [`lookup`](Self::lookup), recording request count, latency and errors
    /// under `label`. Latency includes any retry backoff.
    pub async fn lookup_tracked(&self, ticker: &str, label: &str) -> (String, QuoteResult) {
        let start = Instant::now();
        let resolution = self.resolve(ticker).await;
        self.record(label, start, resolution.error_kind);
        (resolution.name, resolution.result)
    }

    pub(super) fn record(&self, label: &str, start: Instant, error_kind: Option<&'static str>) {
        self.inner.stats.record(label, start.elapsed(), error_kind);
    }

    #[instrument(skip(self))]
    pub(super) async fn resolve(&self, ticker: &str) -> Resolution {
        if let Err(e) = validate_ticker(ticker) {
            warn!(ticker, "invalid ticker format");
            return Resolution {
                name: ticker.to_string(),
                result: QuoteResult::from(&e),
                error_kind: Some(e.kind()),
            };
        }

        if let Some((name, result)) = self.inner.cache.get(ticker) {
            debug!(ticker, "cache hit");
            let error_kind = result.is_error().then_some("cached");
            return Resolution {
                name,
                result,
                error_kind,
            };
        }

        let outcome = self
            .inner
            .provider
            .fetch(ticker)
            .await
            .and_then(|raw| {
                let (price, previous_close) = validate_raw_quote(&raw)?;
                Ok((raw.display_name(ticker), price, previous_close))
            });

        let resolution = match outcome {
            Ok((name, price, previous_close)) => Resolution {
                name,
                result: QuoteResult::Quote(Quote::from_prices(
                    ticker,
                    price,
                    previous_close,
                    Utc::now(),
                )),
                error_kind: None,
            },
            Err(e) => {
                warn!(ticker, error = %e, kind = e.kind(), "quote lookup failed");
                Resolution {
                    name: ticker.to_string(),
                    result: QuoteResult::from(&e),
                    error_kind: Some(e.kind()),
                }
            }
        };

        self.inner.cache.set(
            ticker.to_string(),
            (resolution.name.clone(), resolution.result.clone()),
        );
        debug!(ticker, cached_error = resolution.result.is_error(), "cached lookup outcome");
        resolution
    }

    /// The shared metrics collector.
    pub fn stats(&self) -> &Arc<MetricsCollector> {
        &self.inner.stats
    }

    /// The shared quote cache.
    pub fn cache(&self) -> &QuoteCache {
        &self.inner.cache
    }

    /// Size of the worker pool used for batch fan-out.
    pub fn max_workers(&self) -> usize {
        self.inner.max_workers
    }

    /// Stop accepting batch work.
    ///
    /// Lookups already holding a worker slot finish normally; queued and
    /// future batch lookups resolve to an error result.
    pub fn shutdown(&self) {
        self.inner.workers.close();
        info!("quote gateway shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.workers.is_closed()
    }
}
