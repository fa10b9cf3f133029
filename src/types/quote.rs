//! Quote payloads.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::StockwireError;

/// Fields returned by a quote provider, before completeness checks.
///
/// Every field is optional: upstream providers routinely omit data for
/// delisted, halted or unknown symbols.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_market_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl RawQuote {
    /// Current price: regular market price, falling back to current price.
    pub fn price(&self) -> Option<f64> {
        self.regular_market_price.or(self.current_price)
    }

    /// Human-readable name: short name, then long name, then `ticker`.
    pub fn display_name(&self, ticker: &str) -> String {
        self.short_name
            .as_deref()
            .or(self.long_name.as_deref())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(ticker)
            .to_string()
    }
}

/// A successfully resolved quote, formatted for display.
///
/// Numbers are pre-formatted strings (`price` with two decimals, `change`
/// and `changePercent` with an explicit sign) so every consumer renders
/// them identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub price: String,
    pub change: String,
    pub change_percent: String,
    pub is_positive: bool,
    pub ticker: String,
    pub last_updated: String,
}

impl Quote {
    /// Build a quote from current and reference prices.
    ///
    /// `change = price - previous_close`, `change_percent = change /
    /// previous_close * 100`, positive when `change >= 0`.
    pub fn from_prices(
        ticker: &str,
        price: f64,
        previous_close: f64,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let change = price - previous_close;
        let change_percent = change / previous_close * 100.0;
        Self {
            price: format!("{price:.2}"),
            change: format!("{change:+.2}"),
            change_percent: format!("{change_percent:+.2}"),
            is_positive: change >= 0.0,
            ticker: ticker.to_string(),
            last_updated: fetched_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Outcome of resolving one ticker: a quote or an error message, never both.
///
/// Serialized untagged, so JSON consumers see either the quote fields or
/// `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuoteResult {
    Quote(Quote),
    Error { error: String },
}

impl QuoteResult {
    pub fn error(message: impl Into<String>) -> Self {
        QuoteResult::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QuoteResult::Error { .. })
    }

    pub fn as_quote(&self) -> Option<&Quote> {
        match self {
            QuoteResult::Quote(q) => Some(q),
            QuoteResult::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            QuoteResult::Error { error } => Some(error),
            QuoteResult::Quote(_) => None,
        }
    }
}

impl From<&StockwireError> for QuoteResult {
    fn from(err: &StockwireError) -> Self {
        QuoteResult::error(err.to_string())
    }
}
