use std::sync::Arc;

use coinfolio_core::{MessageAggregator, MessageSink};
use coinfolio_market_data::{
    check_asset_table_coverage, CryptoCompareProvider, KrakenPublicClient, PairDecoder,
    PriceHistoryCache, PriceHistoryFileStore, PriceHistoryProvider, Timestamp, TradingPair,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat};

pub struct AppState {
    pub warnings: Arc<MessageAggregator>,
    pub decoder: Arc<PairDecoder>,
    pub price_cache: Arc<PriceHistoryCache>,
    pub tracked_pairs: Vec<TradingPair>,
    pub history_start: Timestamp,
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let decoder = Arc::new(PairDecoder::kraken());
    if config.skip_asset_check {
        tracing::info!("Skipping {} asset table check", decoder.venue());
    } else {
        verify_asset_table(&decoder, config).await?;
    }

    let provider = Arc::new(CryptoCompareProvider::with_timeout(config.request_timeout));
    build_state_with_provider(config, decoder, provider)
}

/// Wire the state around an already chosen price provider.
pub fn build_state_with_provider(
    config: &Config,
    decoder: Arc<PairDecoder>,
    provider: Arc<dyn PriceHistoryProvider>,
) -> anyhow::Result<Arc<AppState>> {
    std::fs::create_dir_all(&config.data_dir)?;
    tracing::info!("Price history cache in {}", config.data_dir.display());
    tracing::info!("Price history provider: {}", provider.id());

    let store = PriceHistoryFileStore::new(config.data_dir.clone());
    let price_cache = Arc::new(PriceHistoryCache::new(store, provider));
    let warnings = Arc::new(MessageAggregator::new());

    let mut tracked_pairs = Vec::with_capacity(config.tracked_pairs.len());
    for name in &config.tracked_pairs {
        match decoder.decode_canonical(name) {
            Ok(pair) => tracked_pairs.push(pair),
            Err(e) => warnings.warn(format!("Ignoring tracked pair {}: {}", name, e)),
        }
    }

    Ok(Arc::new(AppState {
        warnings,
        decoder,
        price_cache,
        tracked_pairs,
        history_start: config.history_start,
    }))
}

/// Compare the local venue table against the venue's live asset list.
///
/// A mismatch stops startup; an unreachable venue only logs.
async fn verify_asset_table(decoder: &PairDecoder, config: &Config) -> anyhow::Result<()> {
    let client = KrakenPublicClient::with_timeout(config.request_timeout);
    match client.query_assets().await {
        Ok(live_codes) => {
            check_asset_table_coverage(decoder.resolver().as_ref(), &live_codes)?;
            tracing::info!(
                "{} asset table covers all {} live assets",
                decoder.venue(),
                live_codes.len()
            );
        }
        Err(e) => {
            tracing::warn!("Could not verify {} asset table: {}", decoder.venue(), e);
        }
    }
    Ok(())
}
