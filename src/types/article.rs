//! Articles and the enrichment contract.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::QuoteResult;
use crate::StockwireError;

/// How an enriched item lists its companies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdToken {
    /// Resolved display names (e.g. "Apple Inc.").
    #[default]
    Name,
    /// The original tickers (e.g. "AAPL").
    Ticker,
}

impl IdToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdToken::Name => "name",
            IdToken::Ticker => "ticker",
        }
    }
}

impl fmt::Display for IdToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdToken {
    type Err = StockwireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(IdToken::Name),
            "ticker" => Ok(IdToken::Ticker),
            other => Err(StockwireError::InvalidInput(format!(
                "unknown id token '{other}', expected 'name' or 'ticker'"
            ))),
        }
    }
}

/// An item that carries tickers and can receive resolved quote data.
///
/// The batch enricher reads [`identifiers`](Enrichable::identifiers) from
/// every item, resolves the union once, then hands each item its slice of
/// the results.
pub trait Enrichable {
    /// Tickers referenced by this item, possibly with duplicates.
    fn identifiers(&self) -> &[String];

    /// Replace the identifier list and attach quote data.
    ///
    /// `quotes` is keyed by display name (or by ticker for tickers that
    /// failed to resolve).
    fn apply_enrichment(
        &mut self,
        identifiers: Vec<String>,
        quotes: BTreeMap<String, QuoteResult>,
        updated_at: DateTime<Utc>,
    );
}

/// A news article as served by the upstream article API.
///
/// Only `companies` is interpreted; every other field is carried through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(
        rename = "companiesInfo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub companies_info: Option<BTreeMap<String, QuoteResult>>,
    #[serde(
        rename = "stockDataUpdated",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub stock_data_updated: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Article {
    /// Article referencing the given tickers, with no other fields.
    pub fn with_companies<I, S>(companies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            companies: companies.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

impl Enrichable for Article {
    fn identifiers(&self) -> &[String] {
        &self.companies
    }

    fn apply_enrichment(
        &mut self,
        identifiers: Vec<String>,
        quotes: BTreeMap<String, QuoteResult>,
        updated_at: DateTime<Utc>,
    ) {
        self.companies = identifiers;
        self.companies_info = Some(quotes);
        self.stock_data_updated = Some(updated_at);
    }
}

/// Articles grouped by category, as returned by the listing endpoints.
pub type NewsByCategory = BTreeMap<String, Vec<Article>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_token_parses() {
        assert_eq!("name".parse::<IdToken>().unwrap(), IdToken::Name);
        assert_eq!("ticker".parse::<IdToken>().unwrap(), IdToken::Ticker);
        assert!("symbol".parse::<IdToken>().is_err());
        assert_eq!(IdToken::default(), IdToken::Name);
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let raw = json!({
            "title": "Chips rally",
            "newsId": 42,
            "companies": ["NVDA", "AMD"]
        });
        let article: Article = serde_json::from_value(raw).unwrap();
        assert_eq!(article.companies, vec!["NVDA", "AMD"]);
        assert_eq!(article.extra["title"], "Chips rally");

        let back = serde_json::to_value(&article).unwrap();
        assert_eq!(back["newsId"], 42);
        assert!(back.get("companiesInfo").is_none());
    }

    #[test]
    fn missing_companies_defaults_to_empty() {
        let article: Article = serde_json::from_value(json!({"title": "Quiet day"})).unwrap();
        assert!(article.companies.is_empty());
    }

    #[test]
    fn apply_enrichment_sets_all_fields() {
        let mut article = Article::with_companies(["AAPL"]);
        let mut info = BTreeMap::new();
        info.insert("Apple".to_string(), QuoteResult::error("x"));
        let now = Utc::now();
        article.apply_enrichment(vec!["Apple".into()], info, now);

        assert_eq!(article.companies, vec!["Apple"]);
        assert_eq!(article.companies_info.as_ref().unwrap().len(), 1);
        assert_eq!(article.stock_data_updated, Some(now));

        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["companiesInfo"]["Apple"]["error"], "x");
        assert!(json["stockDataUpdated"].is_string());
    }
}
