//! Portfolio statistics computation
//!
//! `compute_stats` is the StatsEngine: holdings in, value/weight/concentration
//! out. Pure and deterministic; recomputed on every call, never mutated.

use crate::error::{Error, Result};
use crate::holding::{Holding, UNKNOWN_ASSET_CLASS};
use serde::{Deserialize, Serialize};

/// Per-symbol slice of the portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolStat {
    pub symbol: String,
    pub value: f64,
    /// Fraction of total portfolio value, 0..1
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_class: Option<String>,
}

/// Per-asset-class slice of the portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetClassStat {
    pub asset_class: String,
    pub value: f64,
    pub weight: f64,
}

/// Derived portfolio statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    pub total_value: f64,
    /// Sorted by weight descending, input order preserved on ties
    pub by_symbol: Vec<SymbolStat>,
    /// Sorted by weight descending; absent class buckets under "UNKNOWN"
    pub by_asset_class: Vec<AssetClassStat>,
    /// Symbols of the 5 largest positions
    pub top_symbols: Vec<String>,
    /// Weight of the single largest position
    pub concentration_top1: f64,
    /// Combined weight of the 3 largest positions
    pub concentration_top3: f64,
}

/// Compute portfolio statistics from holdings
///
/// Missing prices are treated as zero value rather than an error, so a
/// partially-priced portfolio still ranks by known value. When the total
/// value is zero (all shares zero, or no prices at all) every weight is
/// reported as `0.0` instead of the NaN a raw division would produce.
pub fn compute_stats(holdings: &[Holding]) -> Result<PortfolioStats> {
    if holdings.is_empty() {
        return Err(Error::EmptyPortfolio);
    }

    let total_value: f64 = holdings.iter().map(Holding::value).sum();

    let weight_of = |value: f64| -> f64 {
        if total_value > 0.0 { value / total_value } else { 0.0 }
    };

    let mut by_symbol: Vec<SymbolStat> = holdings
        .iter()
        .map(|h| {
            let value = h.value();
            SymbolStat {
                symbol: h.symbol.clone(),
                value,
                weight: weight_of(value),
                asset_class: h.asset_class.clone(),
            }
        })
        .collect();

    // Stable sort keeps input order for equal weights
    by_symbol.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    // Aggregate by exact asset-class string, first-seen order before sorting
    let mut by_asset_class: Vec<AssetClassStat> = Vec::new();
    for h in holdings {
        let class = h.asset_class.as_deref().unwrap_or(UNKNOWN_ASSET_CLASS);
        let value = h.value();
        match by_asset_class.iter_mut().find(|s| s.asset_class == class) {
            Some(stat) => stat.value += value,
            None => by_asset_class.push(AssetClassStat {
                asset_class: class.to_string(),
                value,
                weight: 0.0,
            }),
        }
    }
    for stat in &mut by_asset_class {
        stat.weight = weight_of(stat.value);
    }
    by_asset_class.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    let concentration_top1 = by_symbol.first().map_or(0.0, |s| s.weight);
    let concentration_top3 = by_symbol.iter().take(3).map(|s| s.weight).sum();
    let top_symbols = by_symbol.iter().take(5).map(|s| s.symbol.clone()).collect();

    Ok(PortfolioStats {
        total_value,
        by_symbol,
        by_asset_class,
        top_symbols,
        concentration_top1,
        concentration_top3,
    })
}
