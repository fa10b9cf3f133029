//! Batch enrichment.
//!
//! Items are enriched in three steps:
//!
//! ```text
//! items ──► union of unique tickers ──► fan-out over worker pool ──► BatchResult
//!                                        (cache → retrying provider)       │
//! items' ◄── per-item identifier list + quote map + timestamp ◄────────────┘
//! ```
//!
//! A ticker referenced by many items is resolved once per call. Each
//! lookup runs in its own task; a task that panics or is cancelled becomes
//! an error result for its ticker only.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tokio::time::Instant;
use tracing::{error, info, instrument};

use super::QuoteGateway;
use crate::StockwireError;
use crate::types::{Article, Enrichable, IdToken, NewsByCategory, QuoteResult};

/// Results of one batch call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    /// Ticker → display name (the ticker itself when unresolved).
    pub id_to_name: BTreeMap<String, String>,
    /// Display name → result.
    pub name_to_quote: BTreeMap<String, QuoteResult>,
}

impl BatchResult {
    /// Display name for `ticker`, falling back to the ticker.
    pub fn name_for<'a>(&'a self, ticker: &'a str) -> &'a str {
        self.id_to_name
            .get(ticker)
            .map(String::as_str)
            .unwrap_or(ticker)
    }

    /// Result for `ticker`, if it was part of the batch.
    pub fn quote_for(&self, ticker: &str) -> Option<&QuoteResult> {
        self.name_to_quote.get(self.name_for(ticker))
    }

    fn insert(&mut self, ticker: String, name: String, result: QuoteResult) {
        self.name_to_quote.insert(name.clone(), result);
        self.id_to_name.insert(ticker, name);
    }

    /// Rewrite one item from this batch's results.
    fn apply<T: Enrichable>(&self, item: &mut T, id_token: IdToken, updated_at: DateTime<Utc>) {
        let mut identifiers = Vec::with_capacity(item.identifiers().len());
        let mut quotes = BTreeMap::new();
        for ticker in item.identifiers() {
            let name = self.name_for(ticker);
            identifiers.push(match id_token {
                IdToken::Ticker => ticker.clone(),
                IdToken::Name => name.to_string(),
            });
            if let Some(result) = self.name_to_quote.get(name) {
                quotes.insert(name.to_string(), result.clone());
            }
        }
        item.apply_enrichment(identifiers, quotes, updated_at);
    }
}

fn unique_tickers<'a, T>(items: impl IntoIterator<Item = &'a T>) -> BTreeSet<String>
where
    T: Enrichable + 'a,
{
    items
        .into_iter()
        .flat_map(|item| item.identifiers().iter().cloned())
        .collect()
}

impl QuoteGateway {
    /// Resolve a set of tickers in parallel, each at most once.
    ///
    /// Lookups run on the shared worker pool; when all slots are busy the
    /// remaining lookups wait for a free slot. Every resolution is recorded
    /// under `label`, whether it came from cache or provider.
    #[instrument(skip(self, tickers))]
    pub async fn fetch_batch<I, S>(&self, tickers: I, label: &str) -> BatchResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = tickers.into_iter().map(Into::into).collect();
        if unique.is_empty() {
            return BatchResult::default();
        }
        info!(tickers = unique.len(), "fetching quotes");

        let handles = unique.iter().cloned().map(|ticker| {
            let gateway = self.clone();
            let label = label.to_owned();
            tokio::spawn(async move { gateway.lookup_on_worker(&ticker, &label).await })
        });
        let joined = join_all(handles).await;

        let mut batch = BatchResult::default();
        for (ticker, outcome) in unique.into_iter().zip(joined) {
            match outcome {
                Ok((name, result)) => batch.insert(ticker, name, result),
                Err(join_err) => {
                    error!(%ticker, error = %join_err, "lookup task failed");
                    let err = StockwireError::Fanout(join_err.to_string());
                    self.inner.stats.record_error(label, err.kind());
                    batch.insert(ticker.clone(), ticker, QuoteResult::from(&err));
                }
            }
        }
        info!(resolved = batch.name_to_quote.len(), "batch complete");
        batch
    }

    /// One lookup, holding a worker slot for its whole duration.
    async fn lookup_on_worker(&self, ticker: &str, label: &str) -> (String, QuoteResult) {
        let start = Instant::now();
        let Ok(_permit) = self.inner.workers.clone().acquire_owned().await else {
            let err = StockwireError::ShutDown;
            self.record(label, start, Some(err.kind()));
            return (ticker.to_string(), QuoteResult::from(&err));
        };
        let resolution = self.resolve(ticker).await;
        self.record(label, start, resolution.error_kind);
        (resolution.name, resolution.result)
    }

    /// Enrich a batch of items.
    ///
    /// Every item gets its identifier list rewritten (display names or the
    /// original tickers, per `id_token`), a quote map keyed by display name,
    /// and a freshness timestamp. Unresolved tickers appear under their own
    /// name with an error payload; one bad ticker never fails the batch.
    pub async fn enrich<T: Enrichable>(
        &self,
        mut items: Vec<T>,
        id_token: IdToken,
        label: &str,
    ) -> Vec<T> {
        let batch = self.fetch_batch(unique_tickers(&items), label).await;
        let updated_at = Utc::now();
        for item in &mut items {
            batch.apply(item, id_token, updated_at);
        }
        info!(items = items.len(), "enriched items");
        items
    }

    /// Enrich every category of a news listing, resolving tickers once
    /// across all categories.
    pub async fn enrich_categories(
        &self,
        mut news: NewsByCategory,
        id_token: IdToken,
        label: &str,
    ) -> NewsByCategory {
        let tickers = unique_tickers(news.values().flatten());
        let batch = self.fetch_batch(tickers, label).await;
        let updated_at = Utc::now();
        for article in news.values_mut().flatten() {
            batch.apply(article, id_token, updated_at);
        }
        news
    }

    /// Enrich a single article, listing companies by display name.
    pub async fn enrich_article(&self, mut article: Article, label: &str) -> Article {
        let batch = self.fetch_batch(article.companies.clone(), label).await;
        batch.apply(&mut article, IdToken::Name, Utc::now());
        article
    }
}
