//! Price-history providers and venue clients.
//!
//! This module contains:
//! - The `PriceHistoryProvider` trait the cache fetches missing ranges through
//! - `CryptoCompareProvider`, the hourly OHLC source
//! - `KrakenPublicClient`, used for the startup asset-table check
//!
//! Providers never retry. A failed call surfaces to the caller unchanged and
//! any retry policy belongs to whatever schedules the calls.

mod traits;

pub mod cryptocompare;
pub mod kraken;

pub use traits::PriceHistoryProvider;
