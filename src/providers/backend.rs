//! HTTP client for the upstream news backend.
//!
//! Endpoints (all `GET`, JSON responses):
//!
//! | Method | Path | Query |
//! |--------|------|-------|
//! | [`top_news`](ArticleSource::top_news) | `/api/news/top` | `date` |
//! | [`news_by_date`](ArticleSource::news_by_date) | `/api/news/by-date` | `date` |
//! | [`news_by_topic`](ArticleSource::news_by_topic) | `/api/news/list` | `topic` |
//! | [`news_detail`](ArticleSource::news_detail) | `/api/news/detail` | `newsId` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::traits::ArticleSource;
use crate::types::{Article, NewsByCategory};
use crate::{Result, StockwireError};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`ArticleSource`] backed by the news backend's REST API.
#[derive(Clone)]
pub struct HttpArticleSource {
    http: Client,
    base_url: String,
}

impl HttpArticleSource {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(StockwireError::Configuration(
                "backend URL is not set".to_string(),
            ));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StockwireError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, ?query, "fetching from backend");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!(endpoint, error = %e, "backend request failed");
                StockwireError::Http(format!("Failed to fetch from backend {endpoint}: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(endpoint, status = status.as_u16(), "backend returned error status");
            return Err(StockwireError::Api {
                status: status.as_u16(),
                message: format!("Failed to fetch from backend {endpoint}"),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ArticleSource for HttpArticleSource {
    async fn top_news(&self, date: &str) -> Result<NewsByCategory> {
        self.get_json("/api/news/top", &[("date", date)]).await
    }

    async fn news_by_date(&self, date: &str) -> Result<NewsByCategory> {
        self.get_json("/api/news/by-date", &[("date", date)]).await
    }

    async fn news_by_topic(&self, topic: &str) -> Result<Vec<Article>> {
        self.get_json("/api/news/list", &[("topic", topic)]).await
    }

    async fn news_detail(&self, news_id: &str) -> Result<Article> {
        self.get_json("/api/news/detail", &[("newsId", news_id)]).await
    }
}
