//! Holding type and symbol normalization

use serde::{Deserialize, Serialize};

/// A single portfolio position
///
/// Holdings come from CSV import or a persisted snapshot; both serialize with
/// camelCase field names, which this type mirrors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Ticker symbol as supplied by the source (not yet normalized)
    pub symbol: String,
    /// Number of shares held
    pub shares: f64,
    /// Last known price per share, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Asset class label (e.g. "STOCK", "BOND", "CASH"), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_class: Option<String>,
}

/// Sentinel asset class for holdings without one
pub const UNKNOWN_ASSET_CLASS: &str = "UNKNOWN";

impl Holding {
    /// Create a holding with a known price
    pub fn new(symbol: impl Into<String>, shares: f64, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            shares,
            price: Some(price),
            asset_class: None,
        }
    }

    /// Set the asset class
    pub fn with_asset_class(mut self, asset_class: impl Into<String>) -> Self {
        self.asset_class = Some(asset_class.into());
        self
    }

    /// Market value of the position; missing price counts as zero
    pub fn value(&self) -> f64 {
        self.shares * self.price.unwrap_or(0.0)
    }

    /// Whether this position is cash-like and should skip price refresh
    pub fn is_cash_like(&self) -> bool {
        self.asset_class.as_deref() == Some("CASH") || self.symbol == "SPAXX"
    }
}

/// Normalize a symbol for identity comparison: trim and uppercase
///
/// All symbol identity in this crate (diffing, scope membership, held-set
/// lookups) goes through this. Asset classes are deliberately matched
/// verbatim and never normalized.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
