//! Resolution traits for the market data crate.
//!
//! Defines the abstraction that maps venue-specific asset codes to canonical
//! assets and back.

use crate::errors::MarketDataError;
use crate::models::{Asset, VenueId};

/// Maps a single venue's asset codes to canonical assets.
///
/// Implementations are backed by static data and must be pure: resolving the
/// same code twice always yields the same asset and has no side effects.
pub trait AssetResolver: Send + Sync {
    /// Venue this table belongs to (e.g., "kraken").
    fn venue(&self) -> &VenueId;

    /// Resolve a venue code to its canonical asset.
    ///
    /// # Errors
    /// * `UnknownAsset(code)` - the code is not in the venue's table
    fn resolve(&self, venue_code: &str) -> Result<Asset, MarketDataError>;

    /// Primary venue code for a canonical asset, if the venue lists it.
    fn venue_code(&self, asset: &Asset) -> Option<&str>;

    /// Every primary venue code in the table.
    fn known_codes(&self) -> Vec<&str>;
}
