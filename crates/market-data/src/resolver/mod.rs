//! Asset and pair resolution for venues.
//!
//! This module turns venue-specific spellings into canonical assets:
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────────────┐
//! │  assets.json         │     │  kraken_assets.json  │
//! │  type overrides      │     │  (code, altname,     │
//! │  (AssetRegistry)     │◄────│   canonical)         │
//! └──────────────────────┘     └──────────┬───────────┘
//!                                         │
//!                              ┌──────────▼───────────┐
//!                              │  VenueAssetTable     │
//!                              │  (AssetResolver)     │
//!                              └──────────┬───────────┘
//!                                         │
//!                              ┌──────────▼───────────┐
//!                              │  PairDecoder         │
//!                              │  "XXBTZGBP.d" →      │
//!                              │  BTC_GBP             │
//!                              └──────────────────────┘
//! ```
//!
//! The venue tables must be total over the venue's documented listing.
//! [`check_asset_table_coverage`] verifies that at startup; at resolution
//! time an unknown code is simply `UnknownAsset`.
//!
//! # Example
//!
//! ```
//! use coinfolio_market_data::resolver::PairDecoder;
//!
//! let decoder = PairDecoder::kraken();
//! assert_eq!(decoder.to_world_pair("XXBTZGBP.d").unwrap(), "BTC_GBP");
//! ```

mod asset_resolver;
mod completeness;
mod pair_decoder;
mod registry;
mod traits;

pub use asset_resolver::{VenueAssetEntry, VenueAssetTable};
pub use completeness::check_asset_table_coverage;
pub use pair_decoder::PairDecoder;
pub use registry::{asset, asset_type_overrides, AssetRegistry, AssetTypeOverrides};
pub use traits::AssetResolver;
