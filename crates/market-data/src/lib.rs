//! Coinfolio Market Data Crate
//!
//! Symbol decoding and historical price data for the Coinfolio ingestion
//! layer.
//!
//! # Overview
//!
//! The market data crate provides:
//! - Canonical asset registry and per-venue asset tables
//! - Venue pair-symbol decoding (e.g., Kraken's `XXBTZGBP.d` → `BTC_GBP`)
//! - A startup completeness check of venue asset tables
//! - Hourly OHLC history from CryptoCompare
//! - A persistent per-pair price-history cache that only fetches gaps
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |  raw venue code  | --> | VenueAssetTable  |  (AssetResolver)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   PairDecoder    |  (split + overrides)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   TradingPair    |  (canonical BASE_QUOTE)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | PriceHistoryCache|  (files + provider)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Asset`] - Canonical asset, shared read-only
//! - [`TradingPair`] - Ordered base/quote pair
//! - [`PriceHistoryEntry`] - One hourly OHLC point
//! - [`CachedRange`] - Cached series plus its coverage claim
//! - [`MarketDataError`] - Error type; see `is_record_level`

pub mod cache;
pub mod errors;
pub mod models;
pub mod provider;
pub mod resolver;

pub use models::{
    Asset, AssetType, CachedRange, PriceHistoryEntry, Timestamp, TradingPair, VenueId, HOUR_SECS,
};

pub use resolver::{
    check_asset_table_coverage, AssetRegistry, AssetResolver, PairDecoder, VenueAssetTable,
};

pub use cache::{PriceHistoryCache, PriceHistoryFileStore};

pub use provider::cryptocompare::CryptoCompareProvider;
pub use provider::kraken::KrakenPublicClient;
pub use provider::PriceHistoryProvider;

pub use errors::MarketDataError;
