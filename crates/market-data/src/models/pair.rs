use serde::{Serialize, Serializer};
use std::fmt;

use super::asset::Asset;
use crate::errors::MarketDataError;

/// Ordered (base, quote) pair of canonical assets.
///
/// Built by the pair decoder only; base and quote always differ.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TradingPair {
    base: Asset,
    quote: Asset,
}

impl TradingPair {
    pub(crate) fn new(base: Asset, quote: Asset) -> Result<Self, MarketDataError> {
        if base == quote {
            return Err(MarketDataError::InvalidPair {
                base: base.identifier().to_string(),
                quote: quote.identifier().to_string(),
            });
        }
        Ok(Self { base, quote })
    }

    pub fn base(&self) -> &Asset {
        &self.base
    }

    pub fn quote(&self) -> &Asset {
        &self.quote
    }

    /// Canonical `BASE_QUOTE` name.
    pub fn canonical_name(&self) -> String {
        format!("{}_{}", self.base, self.quote)
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.base, self.quote)
    }
}

impl Serialize for TradingPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetType;

    #[test]
    fn test_rejects_identical_assets() {
        let btc = Asset::new("BTC", Some(AssetType::OwnChain));
        let err = TradingPair::new(btc.clone(), btc).unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidPair { .. }));
    }

    #[test]
    fn test_canonical_name() {
        let pair = TradingPair::new(
            Asset::new("BTC", Some(AssetType::OwnChain)),
            Asset::new("GBP", Some(AssetType::Fiat)),
        )
        .unwrap();
        assert_eq!(pair.canonical_name(), "BTC_GBP");
        assert_eq!(pair.to_string(), "BTC_GBP");
        assert_eq!(serde_json::to_string(&pair).unwrap(), r#""BTC_GBP""#);
    }
}
