//! Core error types for the Coinfolio ingestion layer.

use thiserror::Error;

use coinfolio_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type of the core crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    /// A raw record is well-formed JSON but its values cannot be used
    #[error("Normalization failed: {0}")]
    Normalization(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Whether the error concerns a single record. Such errors are
    /// skipped with a warning instead of failing the batch.
    pub fn is_record_level(&self) -> bool {
        match self {
            Error::MarketData(e) => e.is_record_level(),
            Error::Normalization(_) => true,
            Error::Serialization(_) | Error::Unexpected(_) => false,
        }
    }
}
