//! Startup check that a venue asset table matches the venue's live listing.

use std::collections::BTreeSet;

use log::debug;

use super::traits::AssetResolver;
use crate::errors::MarketDataError;

/// Compare a venue's live asset codes against the local table.
///
/// Fails with `AssetTableMismatch` when the symmetric difference is not
/// empty, or when a live code does not map back to itself through
/// `resolve` and `venue_code`. The latter is reported as a missing code.
pub fn check_asset_table_coverage<S: AsRef<str>>(
    resolver: &dyn AssetResolver,
    live_codes: &[S],
) -> Result<(), MarketDataError> {
    let live: BTreeSet<&str> = live_codes.iter().map(AsRef::as_ref).collect();
    let local: BTreeSet<&str> = resolver.known_codes().into_iter().collect();

    let mut missing: Vec<String> = live.difference(&local).map(|c| c.to_string()).collect();
    let unexpected: Vec<String> = local.difference(&live).map(|c| c.to_string()).collect();

    for code in live.intersection(&local) {
        let round_trips = resolver
            .resolve(code)
            .ok()
            .and_then(|asset| resolver.venue_code(&asset).map(|c| c == *code))
            .unwrap_or(false);
        if !round_trips {
            missing.push(code.to_string());
        }
    }

    if missing.is_empty() && unexpected.is_empty() {
        debug!(
            "Asset table for {} covers all {} live codes",
            resolver.venue(),
            live.len()
        );
        return Ok(());
    }

    Err(MarketDataError::AssetTableMismatch {
        venue: resolver.venue().to_string(),
        missing,
        unexpected,
    })
}
