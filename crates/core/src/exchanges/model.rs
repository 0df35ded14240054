//! Canonical exchange records and the raw venue payloads they come from.

use coinfolio_market_data::models::decimal_format;
use coinfolio_market_data::{Asset, Timestamp, TradingPair, VenueId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

/// Direction of a trade, from the base asset's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Buy,
    Sell,
}

impl FromStr for TradeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(TradeType::Buy),
            "sell" => Ok(TradeType::Sell),
            other => Err(Error::Normalization(format!("unknown trade type '{}'", other))),
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::Buy => f.write_str("buy"),
            TradeType::Sell => f.write_str("sell"),
        }
    }
}

/// Declared category of a deposit/withdrawal ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementCategory {
    Deposit,
    Withdrawal,
}

impl FromStr for MovementCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(MovementCategory::Deposit),
            "withdrawal" => Ok(MovementCategory::Withdrawal),
            other => Err(Error::Normalization(format!(
                "'{}' is not a deposit or withdrawal",
                other
            ))),
        }
    }
}

impl fmt::Display for MovementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementCategory::Deposit => f.write_str("deposit"),
            MovementCategory::Withdrawal => f.write_str("withdrawal"),
        }
    }
}

/// A normalized trade.
///
/// Built in one piece from one raw record; a record that cannot be fully
/// converted is dropped instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trade {
    pub timestamp: Timestamp,
    pub location: VenueId,
    pub pair: TradingPair,
    pub trade_type: TradeType,
    /// Base amount traded, always > 0
    #[serde(with = "decimal_format")]
    pub amount: Decimal,
    /// Price of one base unit in the quote asset
    #[serde(with = "decimal_format")]
    pub rate: Decimal,
    #[serde(with = "decimal_format::option")]
    pub fee: Option<Decimal>,
    pub fee_currency: Option<Asset>,
    /// Venue transaction id
    pub link: String,
}

/// A normalized deposit or withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetMovement {
    pub timestamp: Timestamp,
    pub location: VenueId,
    pub category: MovementCategory,
    pub asset: Asset,
    /// Always > 0, whatever sign the venue used
    #[serde(with = "decimal_format")]
    pub amount: Decimal,
    #[serde(with = "decimal_format")]
    pub fee: Decimal,
    /// Venue reference id
    pub link: String,
}

// ============================================================================
// Raw venue payloads
// ============================================================================

/// One entry of Kraken's `TradesHistory` result.
///
/// Numeric fields are kept as text and parsed during normalization so that a
/// single malformed value only loses its own record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawTrade {
    /// Key of the entry in the venue's result map
    #[serde(default)]
    pub txid: String,
    #[serde(default)]
    pub ordertxid: String,
    pub pair: String,
    /// Unix seconds with a fractional part
    #[serde(with = "decimal_format")]
    pub time: Decimal,
    #[serde(rename = "type")]
    pub trade_type: String,
    pub price: String,
    pub vol: String,
    #[serde(default)]
    pub fee: String,
}

/// One entry of Kraken's `Ledgers` result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawMovement {
    #[serde(default)]
    pub refid: String,
    #[serde(with = "decimal_format")]
    pub time: Decimal,
    /// Declared category ("deposit", "withdrawal", ...)
    #[serde(rename = "type")]
    pub category: String,
    pub asset: String,
    pub amount: String,
    #[serde(default)]
    pub fee: String,
}
