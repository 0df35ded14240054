use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::Mutex;

use super::file_store::PriceHistoryFileStore;
use crate::errors::MarketDataError;
use crate::models::{CachedRange, PriceHistoryEntry, Timestamp, TradingPair};
use crate::provider::PriceHistoryProvider;

/// Historical price cache backed by per-pair files and a remote provider.
///
/// Each pair's [`CachedRange`] is loaded from disk on first use and kept in
/// memory afterwards. A request that falls outside the cached coverage
/// fetches only the missing head and/or tail, merges it and writes the file
/// once. If any fetch or the write fails nothing is changed, neither in
/// memory nor on disk.
///
/// Requests are serialized through one lock, so a fetch for one pair blocks
/// lookups for every other pair until it completes.
pub struct PriceHistoryCache {
    store: PriceHistoryFileStore,
    provider: Arc<dyn PriceHistoryProvider>,
    ranges: Mutex<HashMap<String, CachedRange>>,
}

impl PriceHistoryCache {
    pub fn new(store: PriceHistoryFileStore, provider: Arc<dyn PriceHistoryProvider>) -> Self {
        Self {
            store,
            provider,
            ranges: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &PriceHistoryFileStore {
        &self.store
    }

    /// The entry for `timestamp`, making sure `[historical_data_start,
    /// timestamp]` is covered first.
    ///
    /// # Errors
    /// * `InvalidRange` - `historical_data_start > timestamp`
    /// * `NoPriceData` - the provider has no points at all for the range
    /// * provider and `CacheWrite` errors from filling the coverage
    pub async fn get_historical_price(
        &self,
        pair: &TradingPair,
        timestamp: Timestamp,
        historical_data_start: Timestamp,
    ) -> Result<PriceHistoryEntry, MarketDataError> {
        self.with_coverage(pair, historical_data_start, timestamp, |range| {
            range.entry_at(timestamp).cloned()
        })
        .await?
        .ok_or_else(|| MarketDataError::NoPriceData {
            pair: pair.canonical_name(),
            timestamp,
        })
    }

    /// Copies of every cached entry in `[historical_data_start, timestamp]`,
    /// after making sure the range is covered.
    pub async fn get_historical_data(
        &self,
        pair: &TradingPair,
        timestamp: Timestamp,
        historical_data_start: Timestamp,
    ) -> Result<Vec<PriceHistoryEntry>, MarketDataError> {
        self.with_coverage(pair, historical_data_start, timestamp, |range| {
            range.entries_between(historical_data_start, timestamp)
        })
        .await
    }

    /// Forget everything cached for `pair`, in memory and on disk.
    pub async fn reset(&self, pair: &TradingPair) -> Result<(), MarketDataError> {
        let mut ranges = self.ranges.lock().await;
        self.store.remove(pair)?;
        ranges.remove(&pair.canonical_name());
        info!("Reset price history cache for {}", pair);
        Ok(())
    }

    /// Forget every cached pair.
    pub async fn reset_all(&self) -> Result<(), MarketDataError> {
        let mut ranges = self.ranges.lock().await;
        let removed = self.store.remove_all()?;
        ranges.clear();
        info!("Reset price history cache ({} files removed)", removed);
        Ok(())
    }

    async fn with_coverage<T>(
        &self,
        pair: &TradingPair,
        start: Timestamp,
        end: Timestamp,
        read: impl FnOnce(&CachedRange) -> T,
    ) -> Result<T, MarketDataError> {
        if start > end {
            return Err(MarketDataError::InvalidRange { start, end });
        }

        let key = pair.canonical_name();
        let mut ranges = self.ranges.lock().await;
        let current = ranges
            .entry(key.clone())
            .or_insert_with(|| self.store.load(pair));

        if current.covers(start, end) {
            debug!("Price history cache hit for {} [{}, {}]", pair, start, end);
            return Ok(read(current));
        }

        let missing = current.missing_ranges(start, end);
        let mut updated = current.clone();
        for (from, to) in missing {
            debug!(
                "Fetching {} [{}, {}] from {}",
                pair,
                from,
                to,
                self.provider.id()
            );
            let fetched = self.provider.get_price_history(pair, from, to).await?;
            debug!("{} returned {} entries", self.provider.id(), fetched.len());
            updated.merge(fetched, from, to)?;
        }

        self.store.persist(pair, &updated)?;
        let result = read(&updated);
        ranges.insert(key, updated);
        Ok(result)
    }
}
