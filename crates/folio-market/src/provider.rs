//! Pluggable news-provider capability

use crate::article::NewsArticle;
use crate::error::Result;
use async_trait::async_trait;

/// Window for a per-symbol news fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    /// Look back this many days from now
    pub days: u32,
    /// Cap on articles returned
    pub limit: usize,
}

/// Capability: fetch recent news articles for a symbol
///
/// Any component that can fetch articles within N days capped at M items may
/// be substituted, which is what makes the evidence fetcher testable with a
/// deterministic stub.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Fetch recent articles for a symbol
    async fn fetch_news(&self, symbol: &str, window: FetchWindow) -> Result<Vec<NewsArticle>>;

    /// Provider name, recorded in bundle metadata
    fn name(&self) -> &str;
}
