//! Environment-driven application configuration

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Polygon API key; absent means offline mode
    pub polygon_api_key: Option<String>,
    /// Polygon requests per minute (free tier: 5)
    pub polygon_rate_limit: u32,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            polygon_api_key: None,
            polygon_rate_limit: 5,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Reads `FOLIO_ENV`, `POLYGON_API_KEY`, `FOLIO_POLYGON_RATE_LIMIT` and
    /// `FOLIO_REQUEST_TIMEOUT_SECS`; missing or unparseable variables fall
    /// back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            environment: std::env::var("FOLIO_ENV")
                .unwrap_or_else(|_| defaults.environment.clone()),
            polygon_api_key: std::env::var("POLYGON_API_KEY").ok(),
            polygon_rate_limit: std::env::var("FOLIO_POLYGON_RATE_LIMIT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.polygon_rate_limit),
            request_timeout_secs: std::env::var("FOLIO_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        }
    }
}
