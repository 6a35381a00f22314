//! Error types for folio-core

use thiserror::Error;

/// Result type alias for folio-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for portfolio analytics operations
#[derive(Error, Debug)]
pub enum Error {
    /// Portfolio has no holdings; stats cannot be computed
    #[error("portfolio has no holdings")]
    EmptyPortfolio,

    /// Invalid configuration supplied by the caller
    #[error("configuration error: {0}")]
    Config(String),

    /// A pipeline step ran before its required input was computed
    #[error("missing pipeline input: {0}")]
    MissingInput(&'static str),

    /// Generic error message
    #[error("{0}")]
    Other(String),
}
