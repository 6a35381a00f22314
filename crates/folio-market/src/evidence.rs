//! Bounded-concurrency evidence fetcher
//!
//! Fetches recent news for every symbol in a research scope, at most
//! `concurrency` provider calls in flight at once. Per-symbol failures are
//! isolated: a failed fetch contributes an empty article list and an error
//! entry instead of aborting the batch. The only error that escapes is an
//! invalid configuration, checked before any fetch starts.

use crate::article::NewsArticle;
use crate::error::{MarketError, Result};
use crate::provider::{FetchWindow, NewsProvider};
use chrono::{DateTime, Utc};
use folio_core::SymbolScope;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Configuration for an evidence-gathering run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchConfig {
    /// News look-back window in days
    pub days: u32,
    /// Maximum articles per symbol
    pub per_symbol_limit: usize,
    /// Maximum provider calls in flight at once
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            days: 7,
            per_symbol_limit: 3,
            concurrency: 3,
        }
    }
}

impl FetchConfig {
    /// Reject invalid parameters before any fetch begins
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(MarketError::Config("fetch concurrency must be at least 1".to_string()));
        }
        if self.days == 0 {
            return Err(MarketError::Config("fetch window must be at least 1 day".to_string()));
        }
        Ok(())
    }
}

/// A single symbol's failed fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchError {
    pub symbol: String,
    pub message: String,
}

/// Metadata about an evidence-gathering run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceMeta {
    pub provider: String,
    /// Deduplicated union of requested symbols, submission order
    pub fetched_symbols: Vec<String>,
    pub total_articles: usize,
    /// One entry per failed fetch, stabilized by submission order
    pub errors: Vec<FetchError>,
}

/// Raw per-symbol news results for one research run; immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceBundle {
    /// Captured once at the start of the run, not per symbol
    pub as_of: DateTime<Utc>,
    pub window_days: u32,
    pub per_symbol_limit: usize,
    pub holdings: BTreeMap<String, Vec<NewsArticle>>,
    pub diversifiers: BTreeMap<String, Vec<NewsArticle>>,
    pub meta: EvidenceMeta,
}

struct FetchResult {
    symbol: String,
    articles: Vec<NewsArticle>,
    error: Option<String>,
}

async fn fetch_one(
    provider: Arc<dyn NewsProvider>,
    semaphore: Arc<Semaphore>,
    symbol: String,
    window: FetchWindow,
) -> FetchResult {
    // The permit covers only the provider call; it is released on failure
    // exactly like on success when it drops at the end of this scope.
    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(closed) => {
            return FetchResult {
                symbol,
                articles: Vec::new(),
                error: Some(closed.to_string()),
            };
        }
    };

    match provider.fetch_news(&symbol, window).await {
        Ok(articles) => {
            debug!(symbol = %symbol, count = articles.len(), "fetched news");
            FetchResult {
                symbol,
                articles,
                error: None,
            }
        }
        Err(err) => FetchResult {
            symbol,
            articles: Vec::new(),
            error: Some(err.to_string()),
        },
    }
}

fn results_to_map(results: &[FetchResult]) -> BTreeMap<String, Vec<NewsArticle>> {
    results
        .iter()
        .map(|r| (r.symbol.clone(), r.articles.clone()))
        .collect()
}

/// Fetch news evidence for every symbol in the scope
///
/// `join_all` over the submission-ordered task list keeps results (and thus
/// the `errors` list) in submission order regardless of completion timing,
/// while the shared semaphore enforces the concurrency cap.
pub async fn fetch_evidence(
    scope: &SymbolScope,
    provider: Arc<dyn NewsProvider>,
    config: &FetchConfig,
) -> Result<EvidenceBundle> {
    config.validate()?;

    let as_of = Utc::now();
    let window = FetchWindow {
        days: config.days,
        limit: config.per_symbol_limit,
    };
    let semaphore = Arc::new(Semaphore::new(config.concurrency));

    let tasks = scope.all_symbols().map(|symbol| {
        fetch_one(
            Arc::clone(&provider),
            Arc::clone(&semaphore),
            symbol.clone(),
            window,
        )
    });
    let results = join_all(tasks).await;

    let (holdings_results, diversifier_results) = results.split_at(scope.holdings_symbols.len());
    let holdings = results_to_map(holdings_results);
    let diversifiers = results_to_map(diversifier_results);

    let mut fetched_symbols: Vec<String> = Vec::new();
    for symbol in scope.all_symbols() {
        if !fetched_symbols.contains(symbol) {
            fetched_symbols.push(symbol.clone());
        }
    }

    // Counted from the grouped maps, not the raw task results: a duplicated
    // scope symbol collapses to one map entry and must be counted once.
    let total_articles = holdings
        .values()
        .chain(diversifiers.values())
        .map(Vec::len)
        .sum();
    let errors = results
        .iter()
        .filter_map(|r| {
            r.error.as_ref().map(|message| FetchError {
                symbol: r.symbol.clone(),
                message: message.clone(),
            })
        })
        .collect();

    Ok(EvidenceBundle {
        as_of,
        window_days: config.days,
        per_symbol_limit: config.per_symbol_limit,
        holdings,
        diversifiers,
        meta: EvidenceMeta {
            provider: provider.name().to_string(),
            fetched_symbols,
            total_articles,
            errors,
        },
    })
}
