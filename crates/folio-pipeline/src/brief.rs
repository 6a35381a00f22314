//! Research brief types and size bounds
//!
//! The brief is the schema-validated object handed to narrative generation.
//! This crate builds the skeleton (scope and citations filled in, narrative
//! fields empty) and enforces the size bounds before handoff.

use chrono::{DateTime, Utc};
use folio_core::{Error, Result, SymbolScope};
use folio_market::{EvidenceBundle, FetchConfig, NewsArticle};
use serde::{Deserialize, Serialize};

/// Maximum per-symbol briefs across the whole brief
pub const MAX_SYMBOL_BRIEFS: usize = 20;
/// Maximum briefs in each of the holdings/diversifiers groups
pub const MAX_GROUP_BRIEFS: usize = 10;
/// Maximum citations in the rolled-up list
pub const MAX_CITATIONS: usize = 50;

/// A cited source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl From<&NewsArticle> for Citation {
    fn from(article: &NewsArticle) -> Self {
        Self {
            title: article.title.clone(),
            url: article.url.clone(),
            publisher: article.publisher.clone(),
            published_at: article.published_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Per-symbol research summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolBrief {
    pub symbol: String,
    pub bullets: Vec<String>,
    pub sentiment: Sentiment,
    pub confidence: Confidence,
    pub citations: Vec<Citation>,
}

/// What was researched, and under which limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefScope {
    pub symbols: Vec<String>,
    pub diversifier_tickers: Vec<String>,
    pub time_window_days: u32,
    pub max_sources_per_symbol: usize,
}

/// Bounded, citable research brief
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchBrief {
    pub as_of: DateTime<Utc>,
    pub scope: BriefScope,
    pub key_themes: Vec<String>,
    pub symbol_briefs: Vec<SymbolBrief>,
    pub holdings_briefs: Vec<SymbolBrief>,
    pub diversifier_briefs: Vec<SymbolBrief>,
    pub notable_risks: Vec<String>,
    pub notable_opportunities: Vec<String>,
    /// Deduplicated (by URL) rollup of all citations
    pub citations: Vec<Citation>,
}

impl ResearchBrief {
    /// Build the empty brief for a research run: scope and citation rollup
    /// populated from the evidence, narrative fields left for downstream.
    pub fn skeleton(scope: &SymbolScope, bundle: &EvidenceBundle, config: &FetchConfig) -> Self {
        let mut citations: Vec<Citation> = Vec::new();
        let articles = bundle
            .holdings
            .values()
            .chain(bundle.diversifiers.values())
            .flatten();
        for article in articles {
            if citations.len() == MAX_CITATIONS {
                break;
            }
            if !citations.iter().any(|c| c.url == article.url) {
                citations.push(Citation::from(article));
            }
        }

        Self {
            as_of: bundle.as_of,
            scope: BriefScope {
                symbols: scope.holdings_symbols.clone(),
                diversifier_tickers: scope.diversifier_tickers.clone(),
                time_window_days: config.days,
                max_sources_per_symbol: config.per_symbol_limit,
            },
            key_themes: Vec::new(),
            symbol_briefs: Vec::new(),
            holdings_briefs: Vec::new(),
            diversifier_briefs: Vec::new(),
            notable_risks: Vec::new(),
            notable_opportunities: Vec::new(),
            citations,
        }
    }

    /// Enforce the size bounds the downstream schema expects
    pub fn validate(&self) -> Result<()> {
        if self.symbol_briefs.len() > MAX_SYMBOL_BRIEFS {
            return Err(Error::Config(format!(
                "research brief has {} symbol briefs, max is {MAX_SYMBOL_BRIEFS}",
                self.symbol_briefs.len()
            )));
        }
        if self.holdings_briefs.len() > MAX_GROUP_BRIEFS {
            return Err(Error::Config(format!(
                "research brief has {} holdings briefs, max is {MAX_GROUP_BRIEFS}",
                self.holdings_briefs.len()
            )));
        }
        if self.diversifier_briefs.len() > MAX_GROUP_BRIEFS {
            return Err(Error::Config(format!(
                "research brief has {} diversifier briefs, max is {MAX_GROUP_BRIEFS}",
                self.diversifier_briefs.len()
            )));
        }
        if self.citations.len() > MAX_CITATIONS {
            return Err(Error::Config(format!(
                "research brief has {} citations, max is {MAX_CITATIONS}",
                self.citations.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_market::{EvidenceMeta, NewsArticle};
    use std::collections::BTreeMap;

    fn bundle_with(holdings: &[(&str, usize)]) -> EvidenceBundle {
        let holdings: BTreeMap<String, Vec<NewsArticle>> = holdings
            .iter()
            .map(|(symbol, count)| {
                let articles = (0..*count)
                    .map(|i| {
                        NewsArticle::new(
                            format!("{symbol} story {i}"),
                            format!("https://example.com/{symbol}/{i}"),
                        )
                    })
                    .collect();
                ((*symbol).to_string(), articles)
            })
            .collect();
        EvidenceBundle {
            as_of: Utc::now(),
            window_days: 7,
            per_symbol_limit: 3,
            holdings,
            diversifiers: BTreeMap::new(),
            meta: EvidenceMeta {
                provider: "stub".to_string(),
                fetched_symbols: Vec::new(),
                total_articles: 0,
                errors: Vec::new(),
            },
        }
    }

    fn test_scope() -> SymbolScope {
        SymbolScope {
            holdings_symbols: vec!["AAPL".to_string()],
            diversifier_tickers: vec!["VEA".to_string()],
        }
    }

    #[test]
    fn test_skeleton_carries_scope_and_citations() {
        let bundle = bundle_with(&[("AAPL", 2)]);
        let brief = ResearchBrief::skeleton(&test_scope(), &bundle, &FetchConfig::default());
        assert_eq!(brief.scope.symbols, vec!["AAPL"]);
        assert_eq!(brief.scope.time_window_days, 7);
        assert_eq!(brief.citations.len(), 2);
        assert!(brief.symbol_briefs.is_empty());
        assert!(brief.validate().is_ok());
    }

    #[test]
    fn test_citation_rollup_capped_and_deduplicated() {
        let symbols: Vec<(String, usize)> = (0..30).map(|i| (format!("S{i}"), 3)).collect();
        let refs: Vec<(&str, usize)> = symbols.iter().map(|(s, c)| (s.as_str(), *c)).collect();
        let bundle = bundle_with(&refs);
        let brief = ResearchBrief::skeleton(&test_scope(), &bundle, &FetchConfig::default());
        assert_eq!(brief.citations.len(), MAX_CITATIONS);
    }

    #[test]
    fn test_validate_rejects_oversized_groups() {
        let bundle = bundle_with(&[]);
        let mut brief = ResearchBrief::skeleton(&test_scope(), &bundle, &FetchConfig::default());
        brief.holdings_briefs = (0..MAX_GROUP_BRIEFS + 1)
            .map(|i| SymbolBrief {
                symbol: format!("S{i}"),
                bullets: Vec::new(),
                sentiment: Sentiment::Neutral,
                confidence: Confidence::Low,
                citations: Vec::new(),
            })
            .collect();
        assert!(brief.validate().is_err());
    }
}
