//! Error types for the market data crate.
//!
//! [`MarketDataError`] covers symbol decoding, provider calls and cache
//! persistence. Record-level failures (an unknown asset code, an undecodable
//! pair) are separated from call-level failures by
//! [`is_record_level`](MarketDataError::is_record_level), which is what the
//! normalizers use to decide between skip-and-warn and aborting.

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The venue asset code is not present in the venue's mapping table.
    #[error("Unknown asset {0}")]
    UnknownAsset(String),

    /// No split of the raw venue pair resolves to two known assets and no
    /// override exists for it.
    #[error("Unprocessable trade pair {0}")]
    UnprocessableTradePair(String),

    /// A pair was requested whose base and quote are the same asset.
    #[error("Invalid pair: base {base} equals quote {quote}")]
    InvalidPair {
        /// Canonical identifier of the base asset
        base: String,
        /// Canonical identifier of the quote asset
        quote: String,
    },

    /// A time range whose start lies after its end.
    #[error("Invalid time range: {start} > {end}")]
    InvalidRange {
        /// Requested start (unix seconds)
        start: i64,
        /// Requested end (unix seconds)
        end: i64,
    },

    /// The cache covers the requested time but holds no data points at all.
    #[error("No price data for {pair} at {timestamp}")]
    NoPriceData {
        /// Canonical pair name (BASE_QUOTE)
        pair: String,
        /// Requested timestamp (unix seconds)
        timestamp: i64,
    },

    /// The provider rejected the request or returned an unusable payload.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The venue's live asset list and the local mapping table disagree.
    #[error(
        "Asset table for {venue} does not match the venue. Missing locally: {missing:?}. Unknown to venue: {unexpected:?}"
    )]
    AssetTableMismatch {
        /// Venue whose table was checked
        venue: String,
        /// Codes the venue lists that the local table lacks
        missing: Vec<String>,
        /// Codes in the local table that the venue no longer lists
        unexpected: Vec<String>,
    },

    /// A venue asset table could not be parsed.
    #[error("Invalid asset table: {0}")]
    InvalidAssetTable(String),

    /// Persisting a cache file failed. The previous file is left untouched.
    #[error("Failed to write cache file {path}: {message}")]
    CacheWrite {
        /// Target cache file
        path: String,
        /// Underlying I/O or serialization error
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Whether this error concerns a single record rather than the call.
    ///
    /// Record-level errors are handled by skipping the record and recording a
    /// warning; any other error aborts the operation and reaches the caller.
    ///
    /// # Examples
    ///
    /// ```
    /// use coinfolio_market_data::errors::MarketDataError;
    ///
    /// let error = MarketDataError::UnknownAsset("IDONTEXIST".to_string());
    /// assert!(error.is_record_level());
    ///
    /// let error = MarketDataError::Timeout { provider: "CRYPTOCOMPARE".to_string() };
    /// assert!(!error.is_record_level());
    /// ```
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            Self::UnknownAsset(_) | Self::UnprocessableTradePair(_) | Self::InvalidPair { .. }
        )
    }

    /// Shorthand for a [`MarketDataError::ProviderError`].
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Classify a failed HTTP exchange with `provider`: timeouts become
    /// [`Timeout`](Self::Timeout), anything else stays a
    /// [`Network`](Self::Network) error.
    pub fn transport(provider: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else {
            Self::Network(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_asset_is_record_level() {
        let error = MarketDataError::UnknownAsset("NOTAREALASSET".to_string());
        assert!(error.is_record_level());
    }

    #[test]
    fn test_unprocessable_pair_is_record_level() {
        let error = MarketDataError::UnprocessableTradePair("GABOOBABOO".to_string());
        assert!(error.is_record_level());
    }

    #[test]
    fn test_invalid_pair_is_record_level() {
        let error = MarketDataError::InvalidPair {
            base: "BTC".to_string(),
            quote: "BTC".to_string(),
        };
        assert!(error.is_record_level());
    }

    #[test]
    fn test_provider_errors_are_not_record_level() {
        assert!(!MarketDataError::provider("CRYPTOCOMPARE", "boom").is_record_level());
        assert!(!MarketDataError::RateLimited {
            provider: "CRYPTOCOMPARE".to_string()
        }
        .is_record_level());
        assert!(!MarketDataError::CacheWrite {
            path: "/tmp/x.json".to_string(),
            message: "disk full".to_string(),
        }
        .is_record_level());
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let error = reqwest::Client::new()
            .get("not a url")
            .send()
            .await
            .unwrap_err();
        let error = MarketDataError::transport("CRYPTOCOMPARE", error);
        assert!(matches!(error, MarketDataError::Network(_)));
        assert!(!error.is_record_level());
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::UnknownAsset("IDONTEXIST".to_string());
        assert_eq!(format!("{}", error), "Unknown asset IDONTEXIST");

        let error = MarketDataError::UnprocessableTradePair("GABOOBABOO".to_string());
        assert_eq!(format!("{}", error), "Unprocessable trade pair GABOOBABOO");

        let error = MarketDataError::provider("CRYPTOCOMPARE", "pair not traded");
        assert_eq!(
            format!("{}", error),
            "Provider error: CRYPTOCOMPARE - pair not traded"
        );

        let error = MarketDataError::InvalidRange { start: 10, end: 5 };
        assert_eq!(format!("{}", error), "Invalid time range: 10 > 5");
    }
}
