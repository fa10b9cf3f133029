//! Retry configuration, delay calculation, and the retrying provider decorator.
//!
//! Provides [`RetryConfig`] for controlling retry behaviour, the generic
//! [`with_retry()`] executor, and [`RetryingQuoteProvider`], which wraps a
//! [`QuoteProvider`] with retries and an optional per-attempt timeout.
//!
//! Every failure is retried: upstream quote APIs fail in too many ways to
//! classify reliably. The last failure is returned unchanged.
//!
//! Backoff sleeps run on the task performing the lookup, so a long backoff
//! sequence keeps that worker slot busy for its whole duration.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};

use super::traits::QuoteProvider;
use crate::telemetry;
use crate::types::RawQuote;
use crate::{Result, StockwireError};

/// Configuration for retry behaviour on failed provider calls.
///
/// Uses exponential backoff: the wait after failed attempt `n` (0-indexed)
/// is `backoff_factor * 2^n`, capped at `max_delay`.
///
/// ```rust
/// # use stockwire::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(5)
///     .backoff_factor(Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Base delay before the first retry. Default: 500ms.
    pub backoff_factor: Duration,
    /// Maximum delay between retries (caps exponential growth). Default: 30s.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_factor: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay before the first retry.
    pub fn backoff_factor(mut self, delay: Duration) -> Self {
        self.backoff_factor = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculate the delay after a failed attempt (0-indexed).
    ///
    /// `backoff_factor * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .backoff_factor
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }
}

// ============================================================================
// Shared retry helper
// ============================================================================

/// Execute an async operation with retry logic.
///
/// Runs `f` up to `config.max_attempts` times (at least once). Success on
/// any attempt returns immediately. After a failure with attempts left,
/// sleeps for [`RetryConfig::delay_for_attempt`] and tries again. The
/// failure of the final attempt is returned as-is.
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    operation: &str,
    f: F,
) -> std::result::Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt + 1 < max_attempts => {
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    operation,
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "attempt failed, retrying"
                );
                metrics::counter!(telemetry::RETRIES_TOTAL, "provider" => operation.to_owned())
                    .increment(1);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                error!(operation, attempts = max_attempts, error = %e, "final attempt failed");
                return Err(e);
            }
        }
    }
}

// ============================================================================
// RetryingQuoteProvider
// ============================================================================

/// Decorator that wraps a [`QuoteProvider`] with retry logic.
///
/// Each attempt is optionally bounded by a timeout; a timed-out attempt
/// counts as a failure ([`StockwireError::Timeout`]) and is retried like
/// any other.
pub struct RetryingQuoteProvider {
    inner: Arc<dyn QuoteProvider>,
    config: RetryConfig,
    attempt_timeout: Option<Duration>,
}

impl RetryingQuoteProvider {
    /// Wrap a quote provider with retry logic.
    pub fn new(inner: Arc<dyn QuoteProvider>, config: RetryConfig) -> Self {
        Self {
            inner,
            config,
            attempt_timeout: None,
        }
    }

    /// Bound every individual attempt by `timeout`.
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    async fn fetch_once(&self, ticker: &str) -> Result<RawQuote> {
        match self.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.fetch(ticker))
                .await
                .map_err(|_| StockwireError::Timeout(limit))?,
            None => self.inner.fetch(ticker).await,
        }
    }
}

#[async_trait]
impl QuoteProvider for RetryingQuoteProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, ticker: &str) -> Result<RawQuote> {
        with_retry(&self.config, self.inner.name(), || self.fetch_once(ticker)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff_factor, Duration::from_millis(500));
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let config = RetryConfig::new().backoff_factor(Duration::from_millis(500));
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(2));
    }

    #[test]
    fn delay_is_capped() {
        let config = RetryConfig::new()
            .backoff_factor(Duration::from_secs(1))
            .max_delay(Duration::from_secs(5));
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(5));
        assert_eq!(config.delay_for_attempt(40), Duration::from_secs(5));
    }

    #[test]
    fn disabled_is_single_attempt() {
        assert_eq!(RetryConfig::disabled().max_attempts, 1);
    }
}
