//! Price-history provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{PriceHistoryEntry, Timestamp, TradingPair};

/// Remote source of historical OHLC data.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use coinfolio_market_data::provider::PriceHistoryProvider;
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl PriceHistoryProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn get_price_history(
///         &self,
///         pair: &TradingPair,
///         start: Timestamp,
///         end: Timestamp,
///     ) -> Result<Vec<PriceHistoryEntry>, MarketDataError> {
///         // ... query the remote API
///     }
/// }
/// ```
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Unique identifier for this provider, used in errors and logs.
    fn id(&self) -> &'static str;

    /// Fetch the hourly series of `pair` covering `[start, end]`.
    ///
    /// Entries come back sorted ascending by time. An empty vector means
    /// the provider has no data for the range, which is not an error.
    ///
    /// # Errors
    /// * `ProviderError` - the provider rejected the pair or range
    /// * `RateLimited` / `Timeout` / `Network` - transport failures
    async fn get_price_history(
        &self,
        pair: &TradingPair,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<PriceHistoryEntry>, MarketDataError>;
}
