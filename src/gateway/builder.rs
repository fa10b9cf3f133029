//! Builder for configuring gateway instances

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::info;

use super::QuoteGateway;
use super::lookup::GatewayInner;
use crate::cache::{CacheConfig, QuoteCache};
use crate::config::Config;
use crate::providers::{QuoteProvider, RetryConfig, RetryingQuoteProvider, YahooChartProvider};
use crate::stats::MetricsCollector;
use crate::{Result, StockwireError};

/// Default number of concurrent lookups across all batch calls.
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Main entry point for creating gateway instances.
pub struct Stockwire;

impl Stockwire {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> StockwireBuilder {
        StockwireBuilder::new()
    }
}

/// Builder for configuring gateway instances.
pub struct StockwireBuilder {
    provider: Option<Arc<dyn QuoteProvider>>,
    cache: CacheConfig,
    retry: RetryConfig,
    max_workers: usize,
    attempt_timeout: Option<Duration>,
    stats: Option<Arc<MetricsCollector>>,
}

impl Default for StockwireBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StockwireBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            max_workers: DEFAULT_MAX_WORKERS,
            attempt_timeout: None,
            stats: None,
        }
    }

    /// Builder pre-populated from a loaded [`Config`], using the Yahoo chart
    /// provider at `config.provider.base_url`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = config.provider_timeout();
        let provider = YahooChartProvider::with_base_url(&config.provider.base_url, timeout)?;
        Ok(Self::new()
            .provider(Arc::new(provider))
            .cache(CacheConfig::from(&config.cache))
            .retry(RetryConfig::from(&config.retry))
            .max_workers(config.pool.max_workers)
            .attempt_timeout(timeout))
    }

    /// Set the upstream quote provider (required).
    ///
    /// The provider is wrapped in retry and timeout decorators at build time;
    /// pass the raw provider.
    pub fn provider(mut self, provider: Arc<dyn QuoteProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Configure the quote cache.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Configure retry behaviour for provider calls.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Set the worker pool size shared by all batch calls.
    pub fn max_workers(mut self, n: usize) -> Self {
        self.max_workers = n;
        self
    }

    /// Bound each provider attempt; a timed-out attempt counts as a failure.
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Share an existing metrics collector instead of creating one.
    pub fn stats(mut self, stats: Arc<MetricsCollector>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Build the gateway.
    pub fn build(self) -> Result<QuoteGateway> {
        let provider = self.provider.ok_or_else(|| {
            StockwireError::Configuration("no quote provider configured".to_string())
        })?;
        if self.max_workers == 0 {
            return Err(StockwireError::Configuration(
                "max_workers must be at least 1".to_string(),
            ));
        }

        let mut retrying = RetryingQuoteProvider::new(provider, self.retry);
        if let Some(timeout) = self.attempt_timeout {
            retrying = retrying.attempt_timeout(timeout);
        }

        let stats = self.stats.unwrap_or_default();
        let cache = QuoteCache::from_config(&self.cache).with_stats(stats.clone());

        info!(
            provider = retrying.name(),
            cache_capacity = cache.capacity(),
            cache_ttl_secs = cache.ttl().as_secs(),
            max_workers = self.max_workers,
            max_attempts = retrying.config().max_attempts,
            "quote gateway ready"
        );

        Ok(QuoteGateway::from_inner(GatewayInner {
            provider: Arc::new(retrying),
            cache,
            stats,
            workers: Arc::new(Semaphore::new(self.max_workers)),
            max_workers: self.max_workers,
        }))
    }
}
