//! Rule-based portfolio risk assessment

use crate::stats::PortfolioStats;
use serde::{Deserialize, Serialize};

/// Portfolio risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Risk tier plus the concrete factors that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub factors: Vec<String>,
}

/// Assess concentration and asset-mix risk from portfolio statistics
///
/// Three checks, each contributing one factor: top position above 20%,
/// top 3 positions above 50%, and stock-like asset classes above 80% of the
/// portfolio. Two or more factors is High, one is Medium, none is Low.
pub fn assess_risk(stats: &PortfolioStats) -> RiskAssessment {
    let equity_weight: f64 = stats
        .by_asset_class
        .iter()
        .filter(|ac| ac.asset_class.contains("STOCK"))
        .map(|ac| ac.weight)
        .sum();

    let mut factors = Vec::new();
    if stats.concentration_top1 > 0.2 {
        factors.push("Top position is more than 20% of the portfolio.".to_string());
    }
    if stats.concentration_top3 > 0.5 {
        factors.push("Top 3 positions make up more than 50% of the portfolio.".to_string());
    }
    if equity_weight > 0.8 {
        factors.push("More than 80% is in stocks (little bonds/cash).".to_string());
    }

    let level = match factors.len() {
        0 => RiskLevel::Low,
        1 => RiskLevel::Medium,
        _ => RiskLevel::High,
    };

    RiskAssessment { level, factors }
}
