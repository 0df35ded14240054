//! Venue pair-symbol decoding.
//!
//! Venue symbols are concatenated asset codes without a delimiter, sometimes
//! carrying a settlement suffix (Kraken's darkpool pairs end in `.d`). The
//! decoder splits them against the venue's asset table.

use std::collections::HashMap;
use std::sync::Arc;

use super::asset_resolver::VenueAssetTable;
use super::registry;
use super::traits::AssetResolver;
use crate::errors::MarketDataError;
use crate::models::{Asset, TradingPair, VenueId};

/// Decodes raw venue pair symbols into canonical [`TradingPair`]s.
///
/// # Algorithm
///
/// 1. An entry in the override table wins unconditionally.
/// 2. The symbol is upper-cased and known suffixes are stripped.
/// 3. Every split point is tried, longest quote first; the first split whose
///    halves both resolve to distinct assets is the answer.
///
/// Quote currencies are mostly fixed-length fiat codes, which is why the
/// longer quote is preferred when more than one split resolves.
pub struct PairDecoder {
    resolver: Arc<dyn AssetResolver>,
    suffixes: Vec<String>,
    overrides: HashMap<String, (String, String)>,
}

impl PairDecoder {
    /// Decoder with no suffixes and no overrides.
    pub fn new(resolver: Arc<dyn AssetResolver>) -> Self {
        Self {
            resolver,
            suffixes: Vec::new(),
            overrides: HashMap::new(),
        }
    }

    /// Decoder using the suffixes and overrides shipped with `table`.
    pub fn for_table(table: Arc<VenueAssetTable>) -> Self {
        let suffixes = table.pair_suffixes().to_vec();
        let overrides = table.pair_overrides().clone();
        Self {
            resolver: table,
            suffixes,
            overrides,
        }
    }

    /// Decoder over the Kraken asset table.
    pub fn kraken() -> Self {
        Self::for_table(VenueAssetTable::kraken())
    }

    pub fn with_overrides(mut self, overrides: HashMap<String, (String, String)>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn resolver(&self) -> &Arc<dyn AssetResolver> {
        &self.resolver
    }

    pub fn venue(&self) -> &VenueId {
        self.resolver.venue()
    }

    /// Decode a raw venue symbol.
    ///
    /// # Errors
    /// * `UnprocessableTradePair(raw)` - no split resolves and no override exists
    /// * `UnknownAsset(id)` - an override names an asset missing from the registry
    pub fn decode(&self, raw_pair: &str) -> Result<TradingPair, MarketDataError> {
        if let Some(pair) = self.decode_override(raw_pair)? {
            return Ok(pair);
        }

        let cleaned = self.clean(raw_pair);
        if let Some(pair) = self.decode_override(&cleaned)? {
            return Ok(pair);
        }

        for (split, _) in cleaned.char_indices().skip(1) {
            let (base_code, quote_code) = cleaned.split_at(split);
            let (Ok(base), Ok(quote)) = (
                self.resolver.resolve(base_code),
                self.resolver.resolve(quote_code),
            ) else {
                continue;
            };
            if let Ok(pair) = TradingPair::new(base, quote) {
                return Ok(pair);
            }
        }

        Err(MarketDataError::UnprocessableTradePair(
            raw_pair.to_string(),
        ))
    }

    /// Decode a raw venue symbol into its canonical `BASE_QUOTE` name.
    pub fn to_world_pair(&self, raw_pair: &str) -> Result<String, MarketDataError> {
        self.decode(raw_pair).map(|pair| pair.canonical_name())
    }

    /// Build a pair from a canonical `BASE_QUOTE` name.
    ///
    /// # Errors
    /// * `UnprocessableTradePair(name)` - the name has no `_` separator
    /// * `UnknownAsset(id)` - either side is not a registered asset
    /// * `InvalidPair` - both sides are the same asset
    pub fn decode_canonical(&self, canonical: &str) -> Result<TradingPair, MarketDataError> {
        let (base, quote) = canonical
            .split_once('_')
            .ok_or_else(|| MarketDataError::UnprocessableTradePair(canonical.to_string()))?;
        TradingPair::new(registry_asset(base)?, registry_asset(quote)?)
    }

    fn decode_override(&self, symbol: &str) -> Result<Option<TradingPair>, MarketDataError> {
        match self.overrides.get(symbol) {
            Some((base, quote)) => {
                TradingPair::new(registry_asset(base)?, registry_asset(quote)?).map(Some)
            }
            None => Ok(None),
        }
    }

    fn clean(&self, raw_pair: &str) -> String {
        let mut cleaned = raw_pair.trim().to_uppercase();
        for suffix in &self.suffixes {
            if let Some(stripped) = cleaned.strip_suffix(suffix.to_uppercase().as_str()) {
                cleaned = stripped.to_string();
                break;
            }
        }
        cleaned
    }
}

fn registry_asset(identifier: &str) -> Result<Asset, MarketDataError> {
    registry::asset(identifier).ok_or_else(|| MarketDataError::UnknownAsset(identifier.to_string()))
}
