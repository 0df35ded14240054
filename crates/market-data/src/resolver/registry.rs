//! JSON-driven canonical asset registry.
//!
//! Loads `assets.json` and `asset_type_overrides.json` at compile time via
//! `include_str!` and builds the lookup index once via `lazy_static`.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::Deserialize;

use crate::models::{Asset, AssetType};

// ── JSON schema ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AssetEntry {
    #[serde(default, rename = "type")]
    asset_type: Option<AssetType>,
}

// ── Type overrides ───────────────────────────────────────────────────────────

/// Manually checked asset types.
///
/// Entries here were verified by hand and take precedence over whatever
/// classification the registry data carries.
pub struct AssetTypeOverrides {
    by_identifier: HashMap<String, AssetType>,
}

impl AssetTypeOverrides {
    fn load() -> Self {
        let json = include_str!("data/asset_type_overrides.json");
        let by_identifier: HashMap<String, AssetType> =
            serde_json::from_str(json).expect("asset_type_overrides.json must be valid");
        Self { by_identifier }
    }

    /// The checked type for `identifier`, if one was recorded.
    pub fn lookup(&self, identifier: &str) -> Option<AssetType> {
        self.by_identifier.get(identifier).copied()
    }

    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }
}

// ── Registry ─────────────────────────────────────────────────────────────────

/// Every canonical asset the system knows about.
pub struct AssetRegistry {
    by_identifier: HashMap<String, Asset>,
}

lazy_static! {
    static ref OVERRIDES: AssetTypeOverrides = AssetTypeOverrides::load();
    static ref REGISTRY: AssetRegistry = AssetRegistry::load(&OVERRIDES);
}

impl AssetRegistry {
    fn load(overrides: &AssetTypeOverrides) -> Self {
        let json = include_str!("data/assets.json");
        let entries: HashMap<String, AssetEntry> =
            serde_json::from_str(json).expect("assets.json must be valid");

        let by_identifier = entries
            .into_iter()
            .map(|(identifier, entry)| {
                let asset_type = overrides.lookup(&identifier).or(entry.asset_type);
                let asset = Asset::new(&identifier, asset_type);
                (identifier, asset)
            })
            .collect();

        Self { by_identifier }
    }

    /// The process-wide registry.
    pub fn global() -> &'static AssetRegistry {
        &REGISTRY
    }

    /// Canonical asset with the given identifier.
    pub fn get(&self, identifier: &str) -> Option<Asset> {
        self.by_identifier.get(identifier).cloned()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.by_identifier.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }
}

/// Look up a canonical asset in the global registry.
pub fn asset(identifier: &str) -> Option<Asset> {
    REGISTRY.get(identifier)
}

/// The global manually-checked type table.
pub fn asset_type_overrides() -> &'static AssetTypeOverrides {
    &OVERRIDES
}
