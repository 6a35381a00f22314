//! Polygon.io client for previous-close prices and ticker news

use crate::article::NewsArticle;
use crate::error::{MarketError, Result};
use crate::price::PriceProvider;
use crate::provider::{FetchWindow, NewsProvider};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const POLYGON_BASE_URL: &str = "https://api.polygon.io";

/// Configuration for the Polygon client
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Requests per minute (free tier: 5)
    pub rate_limit_per_minute: u32,
    /// Per-request timeout; a hung fetch must never stall a whole batch
    pub request_timeout: Duration,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_minute: 5,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Polygon.io client with rate limiting and request timeout
pub struct PolygonClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

#[derive(Debug, Deserialize)]
struct PrevCloseResponse {
    #[serde(default)]
    results: Vec<PrevBar>,
}

#[derive(Debug, Deserialize)]
struct PrevBar {
    /// Close price
    c: f64,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    title: String,
    article_url: String,
    #[serde(default)]
    publisher: Option<Publisher>,
    #[serde(default)]
    published_utc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Publisher {
    name: String,
}

impl PolygonClient {
    /// Create a new Polygon client
    ///
    /// # Arguments
    /// * `api_key` - Polygon API key; an empty key is rejected
    /// * `config` - Rate limit and timeout settings
    pub fn new(api_key: impl Into<String>, config: &MarketConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(MarketError::MissingApiKey("POLYGON_API_KEY"));
        }

        let quota = Quota::per_minute(
            NonZeroU32::new(config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN),
        );
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: POLYGON_BASE_URL.to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Create a client from the `POLYGON_API_KEY` environment variable
    pub fn from_env(config: &MarketConfig) -> Result<Self> {
        let api_key = std::env::var("POLYGON_API_KEY")
            .map_err(|_| MarketError::MissingApiKey("POLYGON_API_KEY"))?;
        Self::new(api_key, config)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MarketError::Api(format!("Polygon error {status}: {body}")));
        }

        Ok(response.json::<T>().await?)
    }

    /// Fetch the previous session's close for a symbol
    ///
    /// Returns `None` when Polygon has no bar for the symbol.
    pub async fn prev_close_price(&self, symbol: &str) -> Result<Option<f64>> {
        let url = Url::parse_with_params(
            &format!("{}/v2/aggs/ticker/{symbol}/prev", self.base_url),
            &[("adjusted", "true"), ("apiKey", self.api_key.as_str())],
        )
        .map_err(|e| MarketError::Api(format!("invalid Polygon URL: {e}")))?;

        let body: PrevCloseResponse = self.get_json(url).await?;
        Ok(body.results.first().map(|bar| bar.c))
    }
}

#[async_trait]
impl PriceProvider for PolygonClient {
    async fn prev_close(&self, symbol: &str) -> Result<Option<f64>> {
        self.prev_close_price(symbol).await
    }
}

#[async_trait]
impl NewsProvider for PolygonClient {
    async fn fetch_news(&self, symbol: &str, window: FetchWindow) -> Result<Vec<NewsArticle>> {
        let since = Utc::now() - ChronoDuration::days(i64::from(window.days));
        let url = Url::parse_with_params(
            &format!("{}/v2/reference/news", self.base_url),
            &[
                ("ticker", symbol),
                ("published_utc.gte", &since.to_rfc3339()),
                ("limit", &window.limit.to_string()),
                ("order", "desc"),
                ("apiKey", self.api_key.as_str()),
            ],
        )
        .map_err(|e| MarketError::Api(format!("invalid Polygon URL: {e}")))?;

        let body: NewsResponse = self.get_json(url).await?;
        Ok(body
            .results
            .into_iter()
            .map(|item| NewsArticle {
                title: item.title,
                url: item.article_url,
                publisher: item.publisher.map(|p| p.name),
                published_at: item
                    .published_utc
                    .as_deref()
                    .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                    .map(|dt| dt.with_timezone(&Utc)),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "polygon"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_empty_key() {
        let result = PolygonClient::new("", &MarketConfig::default());
        assert!(matches!(result, Err(MarketError::MissingApiKey(_))));
    }

    #[test]
    fn test_client_creation() {
        let client = PolygonClient::new("test_key", &MarketConfig::default()).expect("client");
        assert_eq!(client.api_key, "test_key");
        assert_eq!(NewsProvider::name(&client), "polygon");
    }

    #[test]
    fn test_news_response_parsing() {
        let json = r#"{
            "results": [{
                "title": "Apple beats estimates",
                "article_url": "https://example.com/a",
                "publisher": {"name": "Example Wire"},
                "published_utc": "2026-08-20T12:00:00Z"
            }]
        }"#;
        let body: NewsResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(body.results.len(), 1);
        assert_eq!(body.results[0].title, "Apple beats estimates");
        assert_eq!(body.results[0].publisher.as_ref().map(|p| p.name.as_str()), Some("Example Wire"));
    }

    #[test]
    fn test_prev_close_response_parsing() {
        let json = r#"{"results": [{"c": 187.44, "o": 180.1}]}"#;
        let body: PrevCloseResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(body.results.first().map(|b| b.c), Some(187.44));

        let empty: PrevCloseResponse = serde_json::from_str("{}").expect("parse");
        assert!(empty.results.is_empty());
    }
}
