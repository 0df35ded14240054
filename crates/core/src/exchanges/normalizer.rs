//! Raw venue record normalization with skip-and-warn semantics.

use std::collections::BTreeMap;
use std::sync::Arc;

use coinfolio_market_data::models::decimal_format::parse_decimal;
use coinfolio_market_data::{Asset, MarketDataError, PairDecoder, Timestamp, VenueId};
use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::model::{AssetMovement, MovementCategory, RawMovement, RawTrade, Trade, TradeType};
use crate::errors::{Error, Result};
use crate::warnings::MessageSink;

/// Turns a venue's raw trades, ledger entries and balances into canonical
/// records.
///
/// A record that cannot be converted is skipped and exactly one warning is
/// sent to the sink for it; the rest of the batch is still processed and
/// output order follows input order.
pub struct TradeNormalizer {
    decoder: Arc<PairDecoder>,
    sink: Arc<dyn MessageSink>,
}

impl TradeNormalizer {
    pub fn new(decoder: Arc<PairDecoder>, sink: Arc<dyn MessageSink>) -> Self {
        Self { decoder, sink }
    }

    /// Normalizer over the Kraken tables.
    pub fn kraken(sink: Arc<dyn MessageSink>) -> Self {
        Self::new(Arc::new(PairDecoder::kraken()), sink)
    }

    pub fn venue(&self) -> &VenueId {
        self.decoder.venue()
    }

    /// Convert a single raw trade.
    pub fn normalize_trade(&self, raw: &RawTrade) -> Result<Trade> {
        let pair = self.decoder.decode(&raw.pair)?;
        let trade_type: TradeType = raw.trade_type.parse()?;
        let amount = parse_positive(&raw.vol, "vol")?;
        let rate = parse_non_negative(&raw.price, "price")?;
        let fee = parse_optional(&raw.fee, "fee")?;
        let fee_currency = fee.map(|_| pair.quote().clone());
        let link = if raw.txid.is_empty() {
            raw.ordertxid.clone()
        } else {
            raw.txid.clone()
        };

        Ok(Trade {
            timestamp: to_timestamp(raw.time)?,
            location: self.venue().clone(),
            pair,
            trade_type,
            amount,
            rate,
            fee,
            fee_currency,
            link,
        })
    }

    /// Convert a batch of raw trades, skipping and warning about bad ones.
    pub fn normalize_trades(&self, raw_trades: &[RawTrade]) -> Vec<Trade> {
        let mut trades = Vec::with_capacity(raw_trades.len());
        for raw in raw_trades {
            match self.normalize_trade(raw) {
                Ok(trade) => trades.push(trade),
                Err(e) => self.sink.warn(self.trade_warning(raw, &e)),
            }
        }
        debug!(
            "Normalized {} of {} {} trades",
            trades.len(),
            raw_trades.len(),
            self.venue()
        );
        trades
    }

    /// Convert a single deposit/withdrawal ledger entry.
    pub fn normalize_movement(&self, raw: &RawMovement) -> Result<AssetMovement> {
        let asset = self.decoder.resolver().resolve(&raw.asset)?;
        let category: MovementCategory = raw.category.parse()?;
        let amount = parse_decimal_field(&raw.amount, "amount")?.abs();
        if amount.is_zero() {
            return Err(Error::Normalization("amount is zero".to_string()));
        }
        let fee = parse_optional(&raw.fee, "fee")?.unwrap_or(Decimal::ZERO);

        Ok(AssetMovement {
            timestamp: to_timestamp(raw.time)?,
            location: self.venue().clone(),
            category,
            asset,
            amount,
            fee,
            link: raw.refid.clone(),
        })
    }

    /// Convert a batch of ledger entries, skipping and warning about bad ones.
    pub fn normalize_movements(&self, raw_movements: &[RawMovement]) -> Vec<AssetMovement> {
        let mut movements = Vec::with_capacity(raw_movements.len());
        for raw in raw_movements {
            match self.normalize_movement(raw) {
                Ok(movement) => movements.push(movement),
                Err(e) => self.sink.warn(self.movement_warning(raw, &e)),
            }
        }
        debug!(
            "Normalized {} of {} {} deposits/withdrawals",
            movements.len(),
            raw_movements.len(),
            self.venue()
        );
        movements
    }

    /// Resolve a venue balance map (code → amount) to canonical assets.
    ///
    /// Codes mapping to the same asset are summed.
    pub fn normalize_balances(
        &self,
        raw_balances: &BTreeMap<String, String>,
    ) -> BTreeMap<Asset, Decimal> {
        let mut balances: BTreeMap<Asset, Decimal> = BTreeMap::new();
        for (code, amount) in raw_balances {
            let asset = match self.decoder.resolver().resolve(code) {
                Ok(asset) => asset,
                Err(_) => {
                    self.sink.warn(format!(
                        "Found unsupported/unknown {} asset {} in balances. Ignoring it.",
                        self.venue(),
                        code
                    ));
                    continue;
                }
            };
            let amount = match parse_decimal_field(amount, "amount") {
                Ok(amount) => amount,
                Err(e) => {
                    self.sink.warn(format!(
                        "Found {} balance of {} with invalid data: {}. Ignoring it.",
                        self.venue(),
                        code,
                        e
                    ));
                    continue;
                }
            };
            let total = balances.entry(asset).or_insert(Decimal::ZERO);
            match total.checked_add(amount) {
                Some(sum) => *total = sum,
                None => {
                    self.sink.warn(format!(
                        "Found {} balance of {} with invalid data: amount {} overflows the running total. Ignoring it.",
                        self.venue(),
                        code,
                        amount
                    ));
                }
            }
        }
        balances
    }

    fn trade_warning(&self, raw: &RawTrade, error: &Error) -> String {
        match error {
            Error::MarketData(MarketDataError::UnprocessableTradePair(pair)) => format!(
                "Found {} trade with unprocessable pair {}. Ignoring it.",
                self.venue(),
                pair
            ),
            Error::MarketData(MarketDataError::UnknownAsset(code)) => format!(
                "Found {} trade with unknown asset {}. Ignoring it.",
                self.venue(),
                code
            ),
            other => format!(
                "Found {} trade {} with invalid data: {}. Ignoring it.",
                self.venue(),
                raw.txid,
                other
            ),
        }
    }

    fn movement_warning(&self, raw: &RawMovement, error: &Error) -> String {
        match error {
            Error::MarketData(MarketDataError::UnknownAsset(code)) => format!(
                "Found unknown {} asset {}. Ignoring its deposit/withdrawal.",
                self.venue(),
                code
            ),
            other => format!(
                "Found {} deposit/withdrawal {} with invalid data: {}. Ignoring it.",
                self.venue(),
                raw.refid,
                other
            ),
        }
    }
}

fn parse_decimal_field(value: &str, field: &str) -> Result<Decimal> {
    parse_decimal(value)
        .ok_or_else(|| Error::Normalization(format!("invalid {} '{}'", field, value)))
}

fn parse_positive(value: &str, field: &str) -> Result<Decimal> {
    let parsed = parse_decimal_field(value, field)?;
    if parsed <= Decimal::ZERO {
        return Err(Error::Normalization(format!(
            "{} must be positive, got {}",
            field, parsed
        )));
    }
    Ok(parsed)
}

fn parse_non_negative(value: &str, field: &str) -> Result<Decimal> {
    let parsed = parse_decimal_field(value, field)?;
    if parsed.is_sign_negative() {
        return Err(Error::Normalization(format!(
            "{} must not be negative, got {}",
            field, parsed
        )));
    }
    Ok(parsed)
}

/// Empty text means "not given". Venues disagree on fee signs, so the
/// magnitude is kept.
fn parse_optional(value: &str, field: &str) -> Result<Option<Decimal>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_decimal_field(value, field).map(|d| Some(d.abs()))
}

fn to_timestamp(time: Decimal) -> Result<Timestamp> {
    time.trunc()
        .to_i64()
        .filter(|t| *t >= 0)
        .ok_or_else(|| Error::Normalization(format!("invalid time {}", time)))
}
