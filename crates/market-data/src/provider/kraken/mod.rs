//! Kraken public API client.
//!
//! Only the unauthenticated `Assets` listing is used, as the source of truth
//! for the startup asset-table completeness check.

use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::errors::MarketDataError;

const BASE_URL: &str = "https://api.kraken.com/0/public";
const PROVIDER_ID: &str = "KRAKEN";

/// Client for Kraken's public endpoints.
pub struct KrakenPublicClient {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct KrakenResponse<T> {
    #[serde(default)]
    error: Vec<String>,
    result: Option<T>,
}

impl KrakenPublicClient {
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

    /// Every asset code Kraken currently lists, sorted.
    pub async fn query_assets(&self) -> Result<Vec<String>, MarketDataError> {
        let text = self.query_public("Assets").await?;
        parse_assets(&text)
    }

    async fn query_public(&self, method: &str) -> Result<String, MarketDataError> {
        let url = format!("{}/{}", BASE_URL, method);
        debug!("Kraken request: {}", url);

        let response = self
            .client
            .get(&url)
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
}

impl Default for KrakenPublicClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_assets(text: &str) -> Result<Vec<String>, MarketDataError> {
    let response: KrakenResponse<BTreeMap<String, serde_json::Value>> = serde_json::from_str(text)
        .map_err(|e| {
            MarketDataError::provider(PROVIDER_ID, format!("Failed to parse response: {}", e))
        })?;

    if !response.error.is_empty() {
        return Err(MarketDataError::provider(
            PROVIDER_ID,
            response.error.join(", "),
        ));
    }

    let assets = response
        .result
        .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, "Response has no result"))?;
    Ok(assets.into_keys().collect())
}
