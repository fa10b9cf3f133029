//! Yahoo Finance chart API client.
//!
//! Reads the `meta` block of `GET {base_url}/v8/finance/chart/{ticker}`,
//! which carries the current price, previous close and company names
//! without requiring a session cookie.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::traits::QuoteProvider;
use crate::types::RawQuote;
use crate::{Result, StockwireError};

/// Default base URL for the Yahoo Finance API.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// Yahoo rejects requests without a browser-like user agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; stockwire)";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    currency: Option<String>,
}

impl From<ChartMeta> for RawQuote {
    fn from(meta: ChartMeta) -> Self {
        RawQuote {
            regular_market_price: meta.regular_market_price,
            current_price: None,
            previous_close: meta.previous_close.or(meta.chart_previous_close),
            short_name: meta.short_name,
            long_name: meta.long_name,
            currency: meta.currency,
        }
    }
}

/// Quote provider backed by the Yahoo Finance chart endpoint.
#[derive(Clone)]
pub struct YahooChartProvider {
    http: Client,
    base_url: String,
}

impl YahooChartProvider {
    /// Create a client against the public Yahoo Finance API.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StockwireError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn error_for_status(ticker: &str, status: u16, body: &str) -> StockwireError {
        let description = serde_json::from_str::<ChartEnvelope>(body)
            .ok()
            .and_then(|env| env.chart.error)
            .and_then(|e| e.description.or(e.code));
        StockwireError::Api {
            status,
            message: description.unwrap_or_else(|| format!("quote request for {ticker} failed")),
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooChartProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    #[instrument(skip(self), fields(provider = "yahoo"))]
    async fn fetch(&self, ticker: &str) -> Result<RawQuote> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        let response = self
            .http
            .get(&url)
            .query(&[("interval", "1d"), ("range", "1d")])
            .send()
            .await
            .map_err(|e| StockwireError::Http(e.to_string()))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Self::error_for_status(ticker, status.as_u16(), &body));
        }

        let envelope: ChartEnvelope = serde_json::from_str(&body)?;
        let meta = envelope
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|r| r.meta)
            .ok_or_else(|| StockwireError::Api {
                status: 404,
                message: format!("No stock data available for {ticker}"),
            })?;

        debug!(ticker, "fetched chart meta");
        Ok(meta.into())
    }
}
