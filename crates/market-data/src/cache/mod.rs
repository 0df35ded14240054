//! Persistent historical price cache.
//!
//! [`PriceHistoryCache`] answers price lookups from per-pair files under the
//! data directory and fills coverage gaps from a [`PriceHistoryProvider`].
//!
//! [`PriceHistoryProvider`]: crate::provider::PriceHistoryProvider

mod file_store;
mod price_history_cache;

pub use file_store::PriceHistoryFileStore;
pub use price_history_cache::PriceHistoryCache;
