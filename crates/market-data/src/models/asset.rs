use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Classification tag of an asset.
///
/// Serialized with the exact tag strings used by the asset data files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    #[serde(rename = "fiat")]
    Fiat,
    #[serde(rename = "own chain")]
    OwnChain,
    #[serde(rename = "ethereum token")]
    EthereumToken,
    #[serde(rename = "ethereum token and own chain")]
    EthereumTokenAndOwnChain,
    #[serde(rename = "ethereum token and more")]
    EthereumTokenAndMore,
    #[serde(rename = "omni token")]
    OmniToken,
    #[serde(rename = "binance token")]
    BinanceToken,
    #[serde(rename = "neo token")]
    NeoToken,
    #[serde(rename = "counterparty token")]
    CounterpartyToken,
    #[serde(rename = "bitshares token")]
    BitsharesToken,
    #[serde(rename = "ardor token")]
    ArdorToken,
    #[serde(rename = "nxt token")]
    NxtToken,
    #[serde(rename = "Ubiq token")]
    UbiqToken,
    #[serde(rename = "Nubits token")]
    NubitsToken,
    #[serde(rename = "Burst token")]
    BurstToken,
    #[serde(rename = "waves token")]
    WavesToken,
    #[serde(rename = "qtum token")]
    QtumToken,
    #[serde(rename = "stellar token")]
    StellarToken,
    #[serde(rename = "tron token")]
    TronToken,
    #[serde(rename = "ontology token")]
    OntologyToken,
    #[serde(rename = "vechain token")]
    VechainToken,
    /// Venue-internal units such as Kraken fee credits
    #[serde(rename = "exchange specific")]
    ExchangeSpecific,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Fiat => "fiat",
            AssetType::OwnChain => "own chain",
            AssetType::EthereumToken => "ethereum token",
            AssetType::EthereumTokenAndOwnChain => "ethereum token and own chain",
            AssetType::EthereumTokenAndMore => "ethereum token and more",
            AssetType::OmniToken => "omni token",
            AssetType::BinanceToken => "binance token",
            AssetType::NeoToken => "neo token",
            AssetType::CounterpartyToken => "counterparty token",
            AssetType::BitsharesToken => "bitshares token",
            AssetType::ArdorToken => "ardor token",
            AssetType::NxtToken => "nxt token",
            AssetType::UbiqToken => "Ubiq token",
            AssetType::NubitsToken => "Nubits token",
            AssetType::BurstToken => "Burst token",
            AssetType::WavesToken => "waves token",
            AssetType::QtumToken => "qtum token",
            AssetType::StellarToken => "stellar token",
            AssetType::TronToken => "tron token",
            AssetType::OntologyToken => "ontology token",
            AssetType::VechainToken => "vechain token",
            AssetType::ExchangeSpecific => "exchange specific",
        }
    }

    pub fn is_fiat(&self) -> bool {
        matches!(self, AssetType::Fiat)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical asset.
///
/// Instances come out of the asset registry and are never mutated; cloning
/// is cheap (the identifier is shared). Equality, ordering and hashing look
/// at the identifier only, and serialization collapses the asset to its
/// identifier string.
#[derive(Clone, Debug)]
pub struct Asset {
    identifier: Arc<str>,
    asset_type: Option<AssetType>,
}

impl Asset {
    pub(crate) fn new(identifier: &str, asset_type: Option<AssetType>) -> Self {
        Self {
            identifier: Arc::from(identifier),
            asset_type,
        }
    }

    /// Globally unique canonical identifier (e.g., "BTC")
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn asset_type(&self) -> Option<AssetType> {
        self.asset_type
    }

    pub fn is_fiat(&self) -> bool {
        self.asset_type.is_some_and(|t| t.is_fiat())
    }
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Asset {}

impl Hash for Asset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

impl PartialOrd for Asset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Asset {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identifier.cmp(&other.identifier)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_type_tag() {
        let a = Asset::new("BTC", Some(AssetType::OwnChain));
        let b = Asset::new("BTC", None);
        assert_eq!(a, b);
        assert_ne!(a, Asset::new("ETH", Some(AssetType::OwnChain)));
    }

    #[test]
    fn test_serializes_to_identifier() {
        let asset = Asset::new("EUR", Some(AssetType::Fiat));
        assert_eq!(serde_json::to_string(&asset).unwrap(), r#""EUR""#);
        assert!(asset.is_fiat());
    }

    #[test]
    fn test_asset_type_tags_round_trip_through_serde() {
        let tag: AssetType = serde_json::from_str(r#""ethereum token and more""#).unwrap();
        assert_eq!(tag, AssetType::EthereumTokenAndMore);
        assert_eq!(tag.as_str(), "ethereum token and more");
        assert_eq!(
            serde_json::to_string(&AssetType::ExchangeSpecific).unwrap(),
            r#""exchange specific""#
        );
    }
}
