//! Error types for market-data operations

use thiserror::Error;

/// Market-data specific errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// API request failed or returned a non-success status
    #[error("API error: {0}")]
    Api(String),

    /// Network or HTTP error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider cannot be constructed without its API key
    #[error("missing API key: {0}")]
    MissingApiKey(&'static str),

    /// Invalid fetch configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for market-data operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Convert MarketError to folio_core::Error at the crate boundary
impl From<MarketError> for folio_core::Error {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::Config(msg) => folio_core::Error::Config(msg),
            other => folio_core::Error::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarketError::Api("Polygon error 403: forbidden".to_string());
        assert_eq!(err.to_string(), "API error: Polygon error 403: forbidden");

        let err = MarketError::MissingApiKey("POLYGON_API_KEY");
        assert_eq!(err.to_string(), "missing API key: POLYGON_API_KEY");
    }

    #[test]
    fn test_config_error_maps_to_core_config() {
        let err: folio_core::Error = MarketError::Config("concurrency must be > 0".to_string()).into();
        assert!(matches!(err, folio_core::Error::Config(_)));
    }
}
