//! Diversifier-candidate selection and research-scope computation
//!
//! Candidate selection is deterministic and menu-driven, not model-driven:
//! a fixed lookup from risk tier to three asset categories, each category
//! carrying a literal ticker menu with a "first ticker not already held"
//! tie-break. Downstream research scope depends on this staying reproducible.

use crate::holding::{Holding, normalize_symbol};
use crate::risk::RiskLevel;
use crate::stats::PortfolioStats;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Asset category a diversifier candidate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiversifierCategory {
    DefensiveSector,
    DividendQuality,
    BroadUsEquity,
    InternationalEquity,
    BondsShortDuration,
    BondsCore,
    GoldCommodities,
    LowVolatility,
    RealEstate,
    CashEquivalent,
}

/// A deterministically suggested non-held ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversifierCandidate {
    pub ticker: String,
    pub category: DiversifierCategory,
    /// Fixed one-line rationale from the menu
    pub rationale: String,
}

/// Prioritized symbols for the evidence-gathering stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolScope {
    /// At most 5 normalized symbols, largest weights first
    pub holdings_symbols: Vec<String>,
    /// At most 3 normalized diversifier tickers
    pub diversifier_tickers: Vec<String>,
}

impl SymbolScope {
    /// All symbols in submission order: holdings first, then diversifiers
    pub fn all_symbols(&self) -> impl Iterator<Item = &String> {
        self.holdings_symbols.iter().chain(self.diversifier_tickers.iter())
    }
}

struct MenuEntry {
    category: DiversifierCategory,
    tickers: &'static [&'static str],
    rationale: &'static str,
}

// Hardcoded menu of diversifier options
const DIVERSIFIER_MENU: &[MenuEntry] = &[
    MenuEntry {
        category: DiversifierCategory::DefensiveSector,
        tickers: &["PG", "JNJ", "NEE"],
        rationale: "Defensive sectors tend to exhibit lower volatility during market downturns.",
    },
    MenuEntry {
        category: DiversifierCategory::BondsShortDuration,
        tickers: &["SGOV", "BIL"],
        rationale: "Short-duration bonds offer stability with minimal interest rate sensitivity.",
    },
    MenuEntry {
        category: DiversifierCategory::BondsCore,
        tickers: &["BND", "AGG"],
        rationale: "Core bond funds provide diversified fixed-income exposure across maturities.",
    },
    MenuEntry {
        category: DiversifierCategory::LowVolatility,
        tickers: &["USMV", "SPLV"],
        rationale: "Low-volatility equity strategies target stocks with historically lower price swings.",
    },
    MenuEntry {
        category: DiversifierCategory::BroadUsEquity,
        tickers: &["VTI", "SCHB", "ITOT"],
        rationale: "Broad US market ETFs offer diversified exposure across all market capitalizations.",
    },
    MenuEntry {
        category: DiversifierCategory::InternationalEquity,
        tickers: &["VEA", "EFA"],
        rationale: "International equity funds provide geographic diversification beyond US markets.",
    },
    MenuEntry {
        category: DiversifierCategory::GoldCommodities,
        tickers: &["GLD", "IAU"],
        rationale: "Gold and commodity exposure can serve as a hedge during inflationary periods.",
    },
];

/// The 3 categories to suggest for a risk tier, in fixed order
fn categories_for_risk(level: RiskLevel) -> [DiversifierCategory; 3] {
    match level {
        RiskLevel::High => [
            DiversifierCategory::DefensiveSector,
            DiversifierCategory::BondsShortDuration,
            DiversifierCategory::LowVolatility,
        ],
        RiskLevel::Low => [
            DiversifierCategory::BroadUsEquity,
            DiversifierCategory::InternationalEquity,
            DiversifierCategory::GoldCommodities,
        ],
        RiskLevel::Medium => [
            DiversifierCategory::DefensiveSector,
            DiversifierCategory::InternationalEquity,
            DiversifierCategory::BondsCore,
        ],
    }
}

/// First ticker from the menu not already held; first overall if all are held
fn pick_first_not_held(tickers: &[&str], held: &HashSet<String>) -> String {
    tickers
        .iter()
        .find(|t| !held.contains(&normalize_symbol(t)))
        .unwrap_or(&tickers[0])
        .to_string()
}

/// Suggest exactly 3 diversifier candidates for the portfolio's risk tier
pub fn diversifier_candidates(holdings: &[Holding], level: RiskLevel) -> Vec<DiversifierCandidate> {
    let held: HashSet<String> = holdings.iter().map(|h| normalize_symbol(&h.symbol)).collect();

    categories_for_risk(level)
        .iter()
        .filter_map(|category| {
            let entry = DIVERSIFIER_MENU.iter().find(|m| m.category == *category)?;
            Some(DiversifierCandidate {
                ticker: pick_first_not_held(entry.tickers, &held),
                category: entry.category,
                rationale: entry.rationale.to_string(),
            })
        })
        .collect()
}

/// Derive the research scope: top 5 holdings plus up to 3 diversifier tickers
pub fn compute_scope(
    stats: &PortfolioStats,
    candidates: &[DiversifierCandidate],
) -> SymbolScope {
    let holdings_symbols = stats
        .top_symbols
        .iter()
        .take(5)
        .map(|s| normalize_symbol(s))
        .filter(|s| !s.is_empty())
        .collect();

    let diversifier_tickers = candidates
        .iter()
        .take(3)
        .map(|c| normalize_symbol(&c.ticker))
        .filter(|s| !s.is_empty())
        .collect();

    SymbolScope {
        holdings_symbols,
        diversifier_tickers,
    }
}
