//! Market-data boundary for folio-rs
//!
//! Defines the pluggable `NewsProvider`/`PriceProvider` capabilities, the
//! Polygon HTTP client implementing both, the holdings price refresh, and the
//! bounded-concurrency evidence fetcher that feeds narrative generation.

pub mod article;
pub mod error;
pub mod evidence;
pub mod polygon;
pub mod price;
pub mod provider;

pub use article::NewsArticle;
pub use error::{MarketError, Result};
pub use evidence::{EvidenceBundle, EvidenceMeta, FetchConfig, FetchError, fetch_evidence};
pub use polygon::{MarketConfig, PolygonClient};
pub use price::{PriceProvider, refresh_prices};
pub use provider::{FetchWindow, NewsProvider};
