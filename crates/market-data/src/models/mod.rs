//! Market data models
//!
//! This module contains the core data types shared by every component:
//! - `types` - Type aliases for common identifiers (VenueId, Timestamp)
//! - `asset` - Canonical asset identity (Asset) and its classification (AssetType)
//! - `pair` - Ordered base/quote pair of canonical assets (TradingPair)
//! - `price_history` - OHLC points and the cached coverage range around them
//! - `decimal_format` - serde helpers writing decimals as strings

pub mod decimal_format;

mod asset;
mod pair;
mod price_history;
mod types;

pub use asset::{Asset, AssetType};
pub use pair::TradingPair;
pub use price_history::{CachedRange, PriceHistoryEntry, HOUR_SECS};
pub use types::{Timestamp, VenueId};
