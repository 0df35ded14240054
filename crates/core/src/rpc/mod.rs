//! Outbound RPC value conversion.
//!
//! Results handed to a UI are built as [`RpcValue`] trees and flattened to
//! JSON here. Decimals always leave as strings so the client decides how to
//! turn them into numbers, and assets (values or map keys) leave as their
//! canonical identifier.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Map, Value};

use coinfolio_market_data::models::decimal_format;
use coinfolio_market_data::{Asset, Timestamp, VenueId};

use crate::exchanges::{AssetMovement, Trade};

/// Total balance of one asset at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetBalance {
    pub time: Timestamp,
    pub asset: Asset,
    #[serde(with = "decimal_format")]
    pub amount: Decimal,
    #[serde(with = "decimal_format")]
    pub usd_value: Decimal,
}

/// Balance of an asset already known from context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleAssetBalance {
    pub time: Timestamp,
    #[serde(with = "decimal_format")]
    pub amount: Decimal,
    #[serde(with = "decimal_format")]
    pub usd_value: Decimal,
}

/// USD value held at one location at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationData {
    pub time: Timestamp,
    pub location: VenueId,
    #[serde(with = "decimal_format")]
    pub usd_value: Decimal,
}

/// Map key of an outbound result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcKey {
    Str(String),
    Asset(Asset),
}

impl RpcKey {
    fn into_string(self) -> String {
        match self {
            RpcKey::Str(s) => s,
            RpcKey::Asset(asset) => asset.identifier().to_string(),
        }
    }
}

impl From<&str> for RpcKey {
    fn from(value: &str) -> Self {
        RpcKey::Str(value.to_string())
    }
}

impl From<String> for RpcKey {
    fn from(value: String) -> Self {
        RpcKey::Str(value)
    }
}

impl From<Asset> for RpcKey {
    fn from(value: Asset) -> Self {
        RpcKey::Asset(value)
    }
}

/// Every kind of value an outbound result may contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Decimal(Decimal),
    Asset(Asset),
    List(Vec<RpcValue>),
    /// Entries keep their insertion order until flattened
    Map(Vec<(RpcKey, RpcValue)>),
    AssetBalance(AssetBalance),
    SingleAssetBalance(SingleAssetBalance),
    LocationData(LocationData),
    Trade(Trade),
    AssetMovement(AssetMovement),
}

impl RpcValue {
    pub fn to_json(&self) -> Value {
        match self {
            RpcValue::Null => Value::Null,
            RpcValue::Bool(b) => Value::Bool(*b),
            RpcValue::Int(i) => Value::from(*i),
            RpcValue::Str(s) => Value::String(s.clone()),
            RpcValue::Decimal(d) => decimal_to_json(d),
            RpcValue::Asset(asset) => asset_to_json(asset),
            RpcValue::List(entries) => Value::Array(entries.iter().map(RpcValue::to_json).collect()),
            RpcValue::Map(entries) => Value::Object(map_to_json(entries.iter().cloned())),
            RpcValue::AssetBalance(balance) => asset_balance_to_json(balance),
            RpcValue::SingleAssetBalance(balance) => single_asset_balance_to_json(balance),
            RpcValue::LocationData(data) => location_data_to_json(data),
            RpcValue::Trade(trade) => trade_to_json(trade),
            RpcValue::AssetMovement(movement) => asset_movement_to_json(movement),
        }
    }
}

impl From<Decimal> for RpcValue {
    fn from(value: Decimal) -> Self {
        RpcValue::Decimal(value)
    }
}

impl From<Asset> for RpcValue {
    fn from(value: Asset) -> Self {
        RpcValue::Asset(value)
    }
}

impl From<&str> for RpcValue {
    fn from(value: &str) -> Self {
        RpcValue::Str(value.to_string())
    }
}

impl From<i64> for RpcValue {
    fn from(value: i64) -> Self {
        RpcValue::Int(value)
    }
}

impl From<bool> for RpcValue {
    fn from(value: bool) -> Self {
        RpcValue::Bool(value)
    }
}

impl From<Trade> for RpcValue {
    fn from(value: Trade) -> Self {
        RpcValue::Trade(value)
    }
}

impl From<AssetMovement> for RpcValue {
    fn from(value: AssetMovement) -> Self {
        RpcValue::AssetMovement(value)
    }
}

impl<T: Into<RpcValue>> From<Vec<T>> for RpcValue {
    fn from(value: Vec<T>) -> Self {
        RpcValue::List(value.into_iter().map(Into::into).collect())
    }
}

/// Flatten a result map for sending.
///
/// When two keys collapse to the same string the later entry wins.
pub fn process_result<I, K>(result: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, RpcValue)>,
    K: Into<RpcKey>,
{
    map_to_json(result.into_iter().map(|(k, v)| (k.into(), v)))
}

/// Flatten a result list for sending.
pub fn process_result_list(result: Vec<RpcValue>) -> Vec<Value> {
    result.iter().map(RpcValue::to_json).collect()
}

fn map_to_json(entries: impl Iterator<Item = (RpcKey, RpcValue)>) -> Map<String, Value> {
    entries
        .map(|(key, value)| (key.into_string(), value.to_json()))
        .collect()
}

fn decimal_to_json(value: &Decimal) -> Value {
    Value::String(value.normalize().to_string())
}

fn asset_to_json(asset: &Asset) -> Value {
    Value::String(asset.identifier().to_string())
}

fn asset_balance_to_json(balance: &AssetBalance) -> Value {
    json!({
        "time": balance.time,
        "asset": balance.asset.identifier(),
        "amount": decimal_to_json(&balance.amount),
        "usd_value": decimal_to_json(&balance.usd_value),
    })
}

fn single_asset_balance_to_json(balance: &SingleAssetBalance) -> Value {
    json!({
        "time": balance.time,
        "amount": decimal_to_json(&balance.amount),
        "usd_value": decimal_to_json(&balance.usd_value),
    })
}

fn location_data_to_json(data: &LocationData) -> Value {
    json!({
        "time": data.time,
        "location": data.location.to_string(),
        "usd_value": decimal_to_json(&data.usd_value),
    })
}

fn trade_to_json(trade: &Trade) -> Value {
    json!({
        "timestamp": trade.timestamp,
        "location": trade.location.to_string(),
        "pair": trade.pair.canonical_name(),
        "trade_type": trade.trade_type.to_string(),
        "amount": decimal_to_json(&trade.amount),
        "rate": decimal_to_json(&trade.rate),
        "fee": trade.fee.as_ref().map(decimal_to_json),
        "fee_currency": trade.fee_currency.as_ref().map(asset_to_json),
        "link": trade.link,
    })
}

fn asset_movement_to_json(movement: &AssetMovement) -> Value {
    json!({
        "timestamp": movement.timestamp,
        "location": movement.location.to_string(),
        "category": movement.category.to_string(),
        "asset": movement.asset.identifier(),
        "amount": decimal_to_json(&movement.amount),
        "fee": decimal_to_json(&movement.fee),
        "link": movement.link,
    })
}
