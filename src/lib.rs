//! Stockwire - quote enrichment for news articles
//!
//! This crate resolves stock tickers referenced by articles into quote data
//! from a volatile upstream provider. The core is a concurrent
//! fetch-and-cache pipeline:
//!
//! - an expiring, bounded LRU cache that also stores failures,
//! - a retry-with-backoff wrapper around provider calls,
//! - a deduplicating batch orchestrator that fans lookups out over a
//!   bounded worker pool,
//! - a metrics collector that observes all of the above.
//!
//! # Lookup Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stockwire::{Stockwire, YahooChartProvider};
//!
//! #[tokio::main]
//! async fn main() -> stockwire::Result<()> {
//!     let gateway = Stockwire::builder()
//!         .provider(Arc::new(YahooChartProvider::new()?))
//!         .build()?;
//!
//!     let (name, quote) = gateway.lookup("AAPL").await;
//!     println!("{name}: {}", serde_json::to_string(&quote)?);
//!     Ok(())
//! }
//! ```
//!
//! # Enrichment Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stockwire::{Article, IdToken, Stockwire, YahooChartProvider};
//!
//! #[tokio::main]
//! async fn main() -> stockwire::Result<()> {
//!     let gateway = Stockwire::builder()
//!         .provider(Arc::new(YahooChartProvider::new()?))
//!         .max_workers(8)
//!         .build()?;
//!
//!     let articles = vec![
//!         Article::with_companies(["AAPL", "MSFT"]),
//!         Article::with_companies(["AAPL"]),
//!     ];
//!     // AAPL is fetched once for both articles.
//!     let enriched = gateway.enrich(articles, IdToken::Name, "news").await;
//!     println!("{}", serde_json::to_string_pretty(&enriched)?);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod providers;
pub mod stats;
pub mod telemetry;
pub mod types;
mod version;

// Re-export main types at crate root
pub use cache::{CacheConfig, ExpiringCache, QuoteCache};
pub use config::Config;
pub use error::{Result, StockwireError};
pub use gateway::{
    BatchResult, HealthReport, MetricsReport, QuoteGateway, Stockwire, StockwireBuilder,
};
pub use providers::{
    ArticleSource, HttpArticleSource, QuoteProvider, RetryConfig, RetryingQuoteProvider,
    YahooChartProvider,
};
pub use stats::{MetricsCollector, MetricsSnapshot};
pub use version::{BuildInfo, PKG_VERSION, build_info, version_string};

// Re-export all types
pub use types::{Article, Enrichable, IdToken, NewsByCategory, Quote, QuoteResult, RawQuote};
