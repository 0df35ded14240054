//! Data-driven venue asset tables.
//!
//! Each venue ships a JSON table listing its asset codes, the short
//! alternative names used inside pair symbols, and the canonical identifier
//! each maps to. Tables compiled into the crate are parsed once via
//! `lazy_static`.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::Deserialize;

use super::registry;
use super::traits::AssetResolver;
use crate::errors::MarketDataError;
use crate::models::{Asset, VenueId};

// ── JSON schema ──────────────────────────────────────────────────────────────

/// One row of a venue asset table.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueAssetEntry {
    /// Primary code as returned by the venue's asset listing (e.g., "XXBT")
    pub code: String,
    /// Short name used inside pair symbols (e.g., "XBT")
    pub altname: String,
    /// Canonical identifier (e.g., "BTC")
    pub canonical: String,
}

#[derive(Debug, Deserialize)]
struct VenueTableFile {
    venue: String,
    #[serde(default)]
    suffixes: Vec<String>,
    assets: Vec<VenueAssetEntry>,
    #[serde(default)]
    pair_overrides: HashMap<String, (String, String)>,
    #[serde(default)]
    known_pairs: Vec<String>,
}

// ── Table ────────────────────────────────────────────────────────────────────

/// Asset table of one venue, implementing [`AssetResolver`].
#[derive(Debug)]
pub struct VenueAssetTable {
    venue: VenueId,
    /// Primary codes and altnames → canonical asset
    by_code: HashMap<String, Asset>,
    /// Canonical identifier → primary code
    code_by_identifier: HashMap<String, String>,
    primary_codes: BTreeSet<String>,
    pair_suffixes: Vec<String>,
    pair_overrides: HashMap<String, (String, String)>,
    known_pairs: Vec<String>,
}

lazy_static! {
    static ref KRAKEN: Arc<VenueAssetTable> = Arc::new(
        VenueAssetTable::from_json(include_str!("data/kraken_assets.json"))
            .expect("kraken_assets.json must be valid")
    );
}

impl VenueAssetTable {
    /// The Kraken table.
    pub fn kraken() -> Arc<VenueAssetTable> {
        Arc::clone(&KRAKEN)
    }

    /// Build a table from rows.
    ///
    /// Every canonical identifier must exist in the asset registry. When an
    /// altname collides with another row's primary code, the primary code
    /// wins.
    pub fn from_entries(
        venue: impl Into<VenueId>,
        entries: Vec<VenueAssetEntry>,
    ) -> Result<Self, MarketDataError> {
        let mut by_code = HashMap::new();
        let mut code_by_identifier = HashMap::new();
        let mut primary_codes = BTreeSet::new();

        let mut rows = Vec::with_capacity(entries.len());
        for entry in entries {
            let asset = registry::asset(&entry.canonical)
                .ok_or_else(|| MarketDataError::UnknownAsset(entry.canonical.clone()))?;
            rows.push((entry, asset));
        }

        for (entry, asset) in &rows {
            by_code.insert(entry.altname.clone(), asset.clone());
        }
        for (entry, asset) in rows {
            by_code.insert(entry.code.clone(), asset.clone());
            code_by_identifier.insert(asset.identifier().to_string(), entry.code.clone());
            primary_codes.insert(entry.code);
        }

        Ok(Self {
            venue: venue.into(),
            by_code,
            code_by_identifier,
            primary_codes,
            pair_suffixes: Vec::new(),
            pair_overrides: HashMap::new(),
            known_pairs: Vec::new(),
        })
    }

    /// Parse a complete venue table file.
    pub fn from_json(json: &str) -> Result<Self, MarketDataError> {
        let file: VenueTableFile = serde_json::from_str(json)
            .map_err(|e| MarketDataError::InvalidAssetTable(e.to_string()))?;
        let mut table = Self::from_entries(file.venue, file.assets)?;
        table.pair_suffixes = file.suffixes;
        table.pair_overrides = file.pair_overrides;
        table.known_pairs = file.known_pairs;
        Ok(table)
    }

    /// Suffixes stripped from pair symbols before decoding (e.g., ".d").
    pub fn pair_suffixes(&self) -> &[String] {
        &self.pair_suffixes
    }

    /// Raw symbols with a fixed canonical decomposition.
    pub fn pair_overrides(&self) -> &HashMap<String, (String, String)> {
        &self.pair_overrides
    }

    /// Pair symbols the venue is known to list.
    pub fn known_pairs(&self) -> &[String] {
        &self.known_pairs
    }
}

impl AssetResolver for VenueAssetTable {
    fn venue(&self) -> &VenueId {
        &self.venue
    }

    fn resolve(&self, venue_code: &str) -> Result<Asset, MarketDataError> {
        self.by_code
            .get(venue_code)
            .cloned()
            .ok_or_else(|| MarketDataError::UnknownAsset(venue_code.to_string()))
    }

    fn venue_code(&self, asset: &Asset) -> Option<&str> {
        self.code_by_identifier
            .get(asset.identifier())
            .map(String::as_str)
    }

    fn known_codes(&self) -> Vec<&str> {
        self.primary_codes.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, altname: &str, canonical: &str) -> VenueAssetEntry {
        VenueAssetEntry {
            code: code.to_string(),
            altname: altname.to_string(),
            canonical: canonical.to_string(),
        }
    }

    #[test]
    fn test_kraken_resolves_codes_and_altnames() {
        let kraken = VenueAssetTable::kraken();
        assert_eq!(kraken.venue().as_ref(), "kraken");
        assert_eq!(kraken.resolve("XXBT").unwrap().identifier(), "BTC");
        assert_eq!(kraken.resolve("XBT").unwrap().identifier(), "BTC");
        assert_eq!(kraken.resolve("ZEUR").unwrap().identifier(), "EUR");
        assert_eq!(kraken.resolve("XXDG").unwrap().identifier(), "DOGE");
        assert_eq!(kraken.resolve("KFEE").unwrap().identifier(), "KFEE");
    }

    #[test]
    fn test_unknown_code() {
        let kraken = VenueAssetTable::kraken();
        let err = kraken.resolve("IDONTEXIST").unwrap_err();
        assert!(matches!(err, MarketDataError::UnknownAsset(code) if code == "IDONTEXIST"));
    }

    #[test]
    fn test_venue_code_round_trips() {
        let kraken = VenueAssetTable::kraken();
        for code in kraken.known_codes() {
            let asset = kraken.resolve(code).unwrap();
            assert_eq!(kraken.venue_code(&asset), Some(code));
        }
    }

    #[test]
    fn test_from_entries_rejects_unregistered_canonical() {
        let err = VenueAssetTable::from_entries("test", vec![entry("FOO", "FOO", "NOTREAL")])
            .unwrap_err();
        assert!(matches!(err, MarketDataError::UnknownAsset(_)));
    }

    #[test]
    fn test_primary_code_beats_colliding_altname() {
        let table = VenueAssetTable::from_entries(
            "test",
            vec![entry("ETH", "ETH", "ETH"), entry("XETC", "ETH", "ETC")],
        )
        .unwrap();
        assert_eq!(table.resolve("ETH").unwrap().identifier(), "ETH");
        assert_eq!(table.resolve("XETC").unwrap().identifier(), "ETC");
    }

    #[test]
    fn test_from_json_rejects_malformed_file() {
        assert!(VenueAssetTable::from_json("{ not json").is_err());
    }
}
