use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use stockwire::{
    Article, IdToken, NewsByCategory, QuoteGateway, QuoteProvider, RawQuote, Result, RetryConfig,
    Stockwire, StockwireError,
};

// ============================================================================
// Mock providers
// ============================================================================

/// Names tickers "<TICKER> Corp"; panics on "BOOM", fails on "FAIL".
#[derive(Default)]
struct ScriptedProvider {
    calls: Mutex<BTreeMap<String, u32>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    fn calls(&self) -> BTreeMap<String, u32> {
        self.calls.lock().clone()
    }

    fn total_calls(&self) -> u32 {
        self.calls.lock().values().sum()
    }
}

#[async_trait]
impl QuoteProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, ticker: &str) -> Result<RawQuote> {
        *self.calls.lock().entry(ticker.to_string()).or_default() += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match ticker {
            "BOOM" => panic!("provider blew up"),
            "FAIL" => Err(StockwireError::Http("connection reset".into())),
            _ => Ok(RawQuote {
                regular_market_price: Some(110.0),
                previous_close: Some(100.0),
                short_name: Some(format!("{ticker} Corp")),
                ..Default::default()
            }),
        }
    }
}

fn gateway(provider: Arc<ScriptedProvider>, workers: usize) -> QuoteGateway {
    Stockwire::builder()
        .provider(provider)
        .retry(RetryConfig::disabled())
        .max_workers(workers)
        .build()
        .unwrap()
}

// ============================================================================
// fetch_batch
// ============================================================================

#[tokio::test]
async fn duplicate_tickers_are_fetched_once() {
    let provider = Arc::new(ScriptedProvider::default());
    let gateway = gateway(provider.clone(), 4);

    let batch = gateway.fetch_batch(["AAPL", "MSFT", "AAPL"], "test").await;

    assert_eq!(provider.total_calls(), 2);
    assert_eq!(batch.id_to_name.len(), 2);
    assert_eq!(batch.name_to_quote.len(), 2);
    assert_eq!(batch.name_for("AAPL"), "AAPL Corp");
    assert!(batch.quote_for("MSFT").is_some());
}

#[tokio::test]
async fn empty_batch_does_nothing() {
    let provider = Arc::new(ScriptedProvider::default());
    let gateway = gateway(provider.clone(), 4);

    let batch = gateway.fetch_batch(Vec::<String>::new(), "test").await;

    assert!(batch.id_to_name.is_empty());
    assert_eq!(provider.total_calls(), 0);
    assert!(gateway.stats().snapshot().request_counts.is_empty());
}

#[tokio::test]
async fn one_failure_does_not_fail_the_batch() {
    let provider = Arc::new(ScriptedProvider::default());
    let gateway = gateway(provider, 4);

    let batch = gateway.fetch_batch(["AAPL", "FAIL", "bad ticker"], "test").await;

    assert!(!batch.quote_for("AAPL").unwrap().is_error());
    assert!(batch.quote_for("FAIL").unwrap().is_error());
    assert_eq!(
        batch.quote_for("bad ticker").unwrap().error_message(),
        Some("Invalid ticker format")
    );
    // Failures are keyed by the ticker itself.
    assert_eq!(batch.name_for("FAIL"), "FAIL");
}

#[tokio::test]
async fn panicking_lookup_is_isolated() {
    let provider = Arc::new(ScriptedProvider::default());
    let gateway = gateway(provider, 4);

    let batch = gateway.fetch_batch(["AAPL", "BOOM", "MSFT"], "test").await;

    let boom = batch.quote_for("BOOM").unwrap();
    assert!(boom.error_message().unwrap().contains("lookup task failed"));
    assert!(!batch.quote_for("AAPL").unwrap().is_error());
    assert!(!batch.quote_for("MSFT").unwrap().is_error());

    let snap = gateway.stats().snapshot();
    assert_eq!(snap.error_counts["test"], 1);
}

#[tokio::test(start_paused = true)]
async fn worker_pool_bounds_concurrency() {
    let provider = Arc::new(ScriptedProvider::slow(Duration::from_millis(50)));
    let gateway = gateway(provider.clone(), 2);

    let tickers: Vec<String> = (0..10).map(|i| format!("T{i}")).collect();
    let batch = gateway.fetch_batch(tickers, "test").await;

    assert_eq!(batch.name_to_quote.len(), 10);
    assert_eq!(provider.max_in_flight.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn pool_is_shared_across_concurrent_batches() {
    let provider = Arc::new(ScriptedProvider::slow(Duration::from_millis(50)));
    let gateway = gateway(provider.clone(), 3);

    let first: Vec<String> = (0..6).map(|i| format!("A{i}")).collect();
    let second: Vec<String> = (0..6).map(|i| format!("B{i}")).collect();
    let (a, b) = tokio::join!(
        gateway.fetch_batch(first, "one"),
        gateway.fetch_batch(second, "two")
    );

    assert_eq!(a.name_to_quote.len() + b.name_to_quote.len(), 12);
    assert!(provider.max_in_flight.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn every_resolution_is_recorded_under_label() {
    let provider = Arc::new(ScriptedProvider::default());
    let gateway = gateway(provider, 4);

    gateway.fetch_batch(["AAPL", "FAIL"], "news-with-stock").await;
    gateway.fetch_batch(["AAPL"], "news-with-stock").await;

    let snap = gateway.stats().snapshot();
    assert_eq!(snap.request_counts["news-with-stock"], 3);
    assert_eq!(snap.error_counts["news-with-stock"], 1);
    assert_eq!(snap.cache_hits, 1);
}

#[tokio::test]
async fn shutdown_rejects_batch_work() {
    let provider = Arc::new(ScriptedProvider::default());
    let gateway = gateway(provider.clone(), 4);

    gateway.shutdown();
    assert!(gateway.is_shut_down());

    let batch = gateway.fetch_batch(["AAPL", "MSFT"], "test").await;

    assert_eq!(provider.total_calls(), 0);
    for ticker in ["AAPL", "MSFT"] {
        assert_eq!(
            batch.quote_for(ticker).unwrap().error_message(),
            Some("gateway is shut down")
        );
    }
}

// ============================================================================
// enrich
// ============================================================================

#[tokio::test]
async fn enrich_by_name_rewrites_companies() {
    let provider = Arc::new(ScriptedProvider::default());
    let gateway = gateway(provider.clone(), 4);

    let articles = vec![
        Article::with_companies(["AAPL", "MSFT"]),
        Article::with_companies(["AAPL", "FAIL"]),
        Article::default(),
    ];
    let enriched = gateway.enrich(articles, IdToken::Name, "test").await;

    assert_eq!(provider.total_calls(), 3);
    assert_eq!(enriched[0].companies, vec!["AAPL Corp", "MSFT Corp"]);
    assert_eq!(enriched[1].companies, vec!["AAPL Corp", "FAIL"]);

    let info = enriched[1].companies_info.as_ref().unwrap();
    assert_eq!(info.len(), 2);
    assert!(info["FAIL"].is_error());
    assert_eq!(info["AAPL Corp"].as_quote().unwrap().price, "110.00");

    // Items without tickers still get an (empty) quote map and a timestamp.
    assert!(enriched[2].companies_info.as_ref().unwrap().is_empty());
    assert!(enriched[2].stock_data_updated.is_some());

    // One timestamp for the whole batch.
    assert_eq!(enriched[0].stock_data_updated, enriched[2].stock_data_updated);
}

#[tokio::test]
async fn enrich_by_ticker_keeps_tickers() {
    let provider = Arc::new(ScriptedProvider::default());
    let gateway = gateway(provider, 4);

    let enriched = gateway
        .enrich(vec![Article::with_companies(["AAPL"])], IdToken::Ticker, "test")
        .await;

    assert_eq!(enriched[0].companies, vec!["AAPL"]);
    assert!(enriched[0].companies_info.as_ref().unwrap().contains_key("AAPL Corp"));
}

#[tokio::test]
async fn enrich_categories_resolves_each_ticker_once() {
    let provider = Arc::new(ScriptedProvider::default());
    let gateway = gateway(provider.clone(), 4);

    let mut news = NewsByCategory::new();
    news.insert(
        "tech".into(),
        vec![Article::with_companies(["AAPL", "NVDA"])],
    );
    news.insert(
        "markets".into(),
        vec![
            Article::with_companies(["AAPL"]),
            Article::with_companies(["JPM"]),
        ],
    );

    let news = gateway
        .enrich_categories(news, IdToken::Name, "date-news-with-stock")
        .await;

    assert_eq!(provider.calls().values().copied().max(), Some(1));
    assert_eq!(provider.total_calls(), 3);
    assert_eq!(news["tech"][0].companies, vec!["AAPL Corp", "NVDA Corp"]);
    assert_eq!(news["markets"][1].companies, vec!["JPM Corp"]);
}

#[tokio::test]
async fn enrich_article_uses_display_names() {
    let provider = Arc::new(ScriptedProvider::default());
    let gateway = gateway(provider, 4);

    let article: Article = serde_json::from_value(serde_json::json!({
        "newsId": "n-1",
        "title": "Earnings",
        "companies": ["AAPL", "AAPL"]
    }))
    .unwrap();
    let article = gateway
        .enrich_article(article, "news-content-with-stock")
        .await;

    assert_eq!(article.companies, vec!["AAPL Corp", "AAPL Corp"]);
    let json = serde_json::to_value(&article).unwrap();
    assert_eq!(json["newsId"], "n-1");
    assert_eq!(json["companiesInfo"]["AAPL Corp"]["ticker"], "AAPL");
    assert!(json["stockDataUpdated"].is_string());
}

#[tokio::test]
async fn retries_are_counted_per_ticker_not_per_item() {
    let provider = Arc::new(ScriptedProvider::default());
    let gateway = Stockwire::builder()
        .provider(provider.clone())
        .retry(RetryConfig::new().backoff_factor(Duration::from_millis(1)))
        .build()
        .unwrap();

    let items = vec![
        Article::with_companies(["FAIL"]),
        Article::with_companies(["FAIL"]),
    ];
    gateway.enrich(items, IdToken::Name, "test").await;

    assert_eq!(provider.calls()["FAIL"], 3);
}

