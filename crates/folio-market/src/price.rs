//! Holdings price refresh

use crate::error::Result;
use async_trait::async_trait;
use folio_core::Holding;
use tracing::warn;

/// Capability: fetch the previous session's close for a symbol
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// `None` means the provider has no bar for the symbol
    async fn prev_close(&self, symbol: &str) -> Result<Option<f64>>;
}

/// Refresh holding prices from the provider's previous close
///
/// Cash-like positions are skipped. A failed fetch or a missing bar keeps the
/// existing price; a price refresh must never fail the analysis run.
pub async fn refresh_prices(holdings: &[Holding], provider: &dyn PriceProvider) -> Vec<Holding> {
    let mut out = Vec::with_capacity(holdings.len());
    for holding in holdings {
        if holding.is_cash_like() {
            out.push(holding.clone());
            continue;
        }

        let mut updated = holding.clone();
        match provider.prev_close(&holding.symbol).await {
            Ok(Some(close)) => updated.price = Some(close),
            Ok(None) => {}
            Err(err) => {
                warn!(symbol = %holding.symbol, error = %err, "price refresh failed, keeping existing price");
            }
        }
        out.push(updated);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarketError;
    use std::collections::HashMap;

    struct StubPrices {
        closes: HashMap<&'static str, f64>,
        fail: Vec<&'static str>,
    }

    #[async_trait]
    impl PriceProvider for StubPrices {
        async fn prev_close(&self, symbol: &str) -> Result<Option<f64>> {
            if self.fail.contains(&symbol) {
                return Err(MarketError::Api("boom".to_string()));
            }
            Ok(self.closes.get(symbol).copied())
        }
    }

    #[tokio::test]
    async fn test_refresh_updates_prices() {
        let provider = StubPrices {
            closes: HashMap::from([("AAPL", 190.0)]),
            fail: Vec::new(),
        };
        let holdings = vec![Holding::new("AAPL", 10.0, 100.0)];
        let updated = refresh_prices(&holdings, &provider).await;
        assert_eq!(updated[0].price, Some(190.0));
    }

    #[tokio::test]
    async fn test_cash_like_skipped() {
        let provider = StubPrices {
            closes: HashMap::from([("SPAXX", 2.0)]),
            fail: Vec::new(),
        };
        let holdings = vec![Holding::new("SPAXX", 100.0, 1.0)];
        let updated = refresh_prices(&holdings, &provider).await;
        assert_eq!(updated[0].price, Some(1.0));
    }

    #[tokio::test]
    async fn test_failure_keeps_existing_price() {
        let provider = StubPrices {
            closes: HashMap::new(),
            fail: vec!["AAPL"],
        };
        let holdings = vec![
            Holding::new("AAPL", 10.0, 100.0),
            Holding::new("MSFT", 5.0, 200.0),
        ];
        let updated = refresh_prices(&holdings, &provider).await;
        assert_eq!(updated[0].price, Some(100.0));
        assert_eq!(updated[1].price, Some(200.0));
    }

    #[tokio::test]
    async fn test_missing_bar_keeps_existing_price() {
        let provider = StubPrices {
            closes: HashMap::new(),
            fail: Vec::new(),
        };
        let holdings = vec![Holding::new("AAPL", 10.0, 100.0)];
        let updated = refresh_prices(&holdings, &provider).await;
        assert_eq!(updated[0].price, Some(100.0));
    }
}
