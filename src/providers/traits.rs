//! Provider traits for the upstream services stockwire talks to.
//!
//! - [`QuoteProvider`]: resolves one ticker to raw quote fields. It must not
//!   cache or retry on its own; retry, backoff and caching are layered on top
//!   ([`RetryingQuoteProvider`](super::RetryingQuoteProvider), the gateway's
//!   quote cache).
//! - [`ArticleSource`]: supplies the articles that get enriched.
//!
//! # Example
//!
//! ```ignore
//! struct Fixed;
//!
//! #[async_trait]
//! impl QuoteProvider for Fixed {
//!     fn name(&self) -> &str { "fixed" }
//!
//!     async fn fetch(&self, _ticker: &str) -> Result<RawQuote> {
//!         Ok(RawQuote { regular_market_price: Some(1.0), previous_close: Some(1.0), ..Default::default() })
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::Result;
use crate::types::{Article, NewsByCategory, RawQuote};

// ============================================================================
// Quote Provider
// ============================================================================

/// Upstream source of quote data.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Provider name for logging/metrics.
    fn name(&self) -> &str;

    /// Fetch raw quote fields for `ticker`.
    ///
    /// May fail with a network error, a non-2xx status or a timeout.
    /// Completeness of the returned fields is checked by the caller.
    async fn fetch(&self, ticker: &str) -> Result<RawQuote>;
}

// ============================================================================
// Article Source
// ============================================================================

/// Upstream source of news articles.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Top articles for a date, grouped by category.
    async fn top_news(&self, date: &str) -> Result<NewsByCategory>;

    /// All articles for a date, grouped by category.
    async fn news_by_date(&self, date: &str) -> Result<NewsByCategory>;

    /// Articles about a topic.
    async fn news_by_topic(&self, topic: &str) -> Result<Vec<Article>>;

    /// A single article by ID.
    async fn news_detail(&self, news_id: &str) -> Result<Article>;
}
