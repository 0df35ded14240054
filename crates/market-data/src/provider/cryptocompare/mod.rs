//! CryptoCompare price-history provider.
//!
//! Uses the hourly `histohour` endpoint. One call returns at most 2000
//! points ending at `toTs`, so longer ranges are paged backwards until the
//! requested start is reached.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{PriceHistoryEntry, Timestamp, TradingPair, HOUR_SECS};
use crate::provider::PriceHistoryProvider;

const BASE_URL: &str = "https://min-api.cryptocompare.com/data/histohour";
const PROVIDER_ID: &str = "CRYPTOCOMPARE";
const PAGE_LIMIT: &str = "2000";

/// CryptoCompare hourly OHLC provider.
pub struct CryptoCompareProvider {
    client: Client,
}

// ============================================================================
// Response structures for the CryptoCompare API
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HistoHourResponse {
    response: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

/// Outcome of one backwards page.
#[derive(Debug, PartialEq)]
struct Page {
    entries: Vec<PriceHistoryEntry>,
    /// `toTs` for the next call, or `None` once the range start is reached
    next_to_ts: Option<Timestamp>,
}

impl CryptoCompareProvider {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Make a request to the histohour endpoint.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let url = reqwest::Url::parse_with_params(BASE_URL, params).map_err(|e| {
            MarketDataError::provider(PROVIDER_ID, format!("Failed to build URL: {}", e))
        })?;

        debug!("CryptoCompare request: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MarketDataError::transport(PROVIDER_ID, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::provider(
                PROVIDER_ID,
                format!("HTTP {}", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::transport(PROVIDER_ID, e))
    }

    async fn fetch_page(
        &self,
        pair: &TradingPair,
        to_ts: Timestamp,
    ) -> Result<Vec<PriceHistoryEntry>, MarketDataError> {
        let to_ts = to_ts.to_string();
        let params = [
            ("fsym", pair.base().identifier()),
            ("tsym", pair.quote().identifier()),
            ("limit", PAGE_LIMIT),
            ("toTs", to_ts.as_str()),
        ];
        let text = self.fetch(&params).await?;
        parse_response(&text)
    }
}

impl Default for CryptoCompareProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a histohour payload into entries sorted by time.
fn parse_response(text: &str) -> Result<Vec<PriceHistoryEntry>, MarketDataError> {
    let response: HistoHourResponse = serde_json::from_str(text).map_err(|e| {
        MarketDataError::provider(PROVIDER_ID, format!("Failed to parse response: {}", e))
    })?;

    if response.response != "Success" {
        return Err(MarketDataError::provider(
            PROVIDER_ID,
            response
                .message
                .unwrap_or_else(|| format!("Response: {}", response.response)),
        ));
    }

    let mut entries: Vec<PriceHistoryEntry> = serde_json::from_value(response.data)
        .map_err(|e| MarketDataError::provider(PROVIDER_ID, format!("Invalid data: {}", e)))?;
    entries.sort_by_key(|e| e.time);
    Ok(entries)
}

/// Keep the part of a page inside `[bucket_start, ..]` and work out where the
/// next page ends.
///
/// CryptoCompare zero-fills hours before a pair started trading. Those points
/// are dropped, and a page made only of them ends the paging.
fn select_page(data: Vec<PriceHistoryEntry>, bucket_start: Timestamp, to_ts: Timestamp) -> Page {
    let Some(earliest) = data.first().map(|e| e.time) else {
        return Page {
            entries: Vec::new(),
            next_to_ts: None,
        };
    };

    let entries: Vec<PriceHistoryEntry> = data
        .into_iter()
        .filter(|e| e.time >= bucket_start && e.time <= to_ts)
        .filter(|e| !(e.open.is_zero() && e.high.is_zero() && e.low.is_zero() && e.close.is_zero()))
        .collect();

    let next_to_ts = if earliest <= bucket_start || entries.is_empty() || earliest > to_ts {
        None
    } else {
        Some(earliest - 1)
    };

    Page {
        entries,
        next_to_ts,
    }
}

#[async_trait]
impl PriceHistoryProvider for CryptoCompareProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_price_history(
        &self,
        pair: &TradingPair,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<PriceHistoryEntry>, MarketDataError> {
        if start > end {
            return Err(MarketDataError::InvalidRange { start, end });
        }

        let bucket_start = start - start.rem_euclid(HOUR_SECS);
        let mut pages: Vec<Vec<PriceHistoryEntry>> = Vec::new();
        let mut to_ts = end;

        loop {
            let data = self.fetch_page(pair, to_ts).await?;
            let page = select_page(data, bucket_start, to_ts);
            debug!(
                "CryptoCompare {} page ending {} returned {} entries",
                pair,
                to_ts,
                page.entries.len()
            );
            pages.push(page.entries);
            match page.next_to_ts {
                Some(next) if next < to_ts => to_ts = next,
                _ => break,
            }
        }

        let mut entries: Vec<PriceHistoryEntry> = pages.into_iter().rev().flatten().collect();
        entries.sort_by_key(|e| e.time);
        entries.dedup_by_key(|e| e.time);
        Ok(entries)
    }
}
