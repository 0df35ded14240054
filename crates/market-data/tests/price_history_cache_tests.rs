//! Integration tests for the persistent price-history cache.
//!
//! A mock provider records every range it is asked for, so the tests can
//! assert exactly which sub-ranges were fetched.

use async_trait::async_trait;
use coinfolio_market_data::{
    CachedRange, MarketDataError, PairDecoder, PriceHistoryCache, PriceHistoryEntry,
    PriceHistoryFileStore, PriceHistoryProvider, Timestamp, TradingPair, HOUR_SECS,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

// =============================================================================
// Mock provider
// =============================================================================

struct MockProvider {
    calls: Arc<Mutex<Vec<(String, Timestamp, Timestamp)>>>,
    /// Hourly points the "remote" has
    data: Vec<PriceHistoryEntry>,
    fail: bool,
}

impl MockProvider {
    fn with_hours(hours: std::ops::Range<i64>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            data: hours.map(|h| entry(h * HOUR_SECS, Decimal::from(h))).collect(),
            fail: false,
        }
    }

    fn empty() -> Self {
        Self::with_hours(0..0)
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::empty()
        }
    }

    fn calls(&self) -> Arc<Mutex<Vec<(String, Timestamp, Timestamp)>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl PriceHistoryProvider for MockProvider {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    async fn get_price_history(
        &self,
        pair: &TradingPair,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<PriceHistoryEntry>, MarketDataError> {
        self.calls
            .lock()
            .unwrap()
            .push((pair.canonical_name(), start, end));
        if self.fail {
            return Err(MarketDataError::ProviderError {
                provider: "MOCK".to_string(),
                message: "pair not traded".to_string(),
            });
        }
        let bucket_start = start - start.rem_euclid(HOUR_SECS);
        Ok(self
            .data
            .iter()
            .filter(|e| e.time >= bucket_start && e.time <= end)
            .cloned()
            .collect())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn entry(time: Timestamp, price: Decimal) -> PriceHistoryEntry {
    PriceHistoryEntry {
        time,
        open: price,
        high: price,
        low: price,
        close: price,
        volumefrom: price,
        volumeto: price,
    }
}

fn pair(name: &str) -> TradingPair {
    PairDecoder::kraken().decode_canonical(name).unwrap()
}

fn setup(provider: MockProvider) -> (TempDir, PriceHistoryCache, Arc<Mutex<Vec<(String, Timestamp, Timestamp)>>>) {
    let dir = tempdir().unwrap();
    let calls = provider.calls();
    let cache = PriceHistoryCache::new(PriceHistoryFileStore::new(dir.path()), Arc::new(provider));
    (dir, cache, calls)
}

fn read_file(dir: &TempDir, name: &str) -> CachedRange {
    let raw = fs::read(dir.path().join(format!("price_history_{}.json", name))).unwrap();
    serde_json::from_slice(&raw).unwrap()
}

const H: Timestamp = HOUR_SECS;

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_cached_file_is_used_without_fetching() {
    let (dir, cache, calls) = setup(MockProvider::empty());
    let contents = r#"{"start_time": 0, "end_time": 1439390800,
    "data": [{"time": 1438387200, "close": 10, "high": 10, "low": 10, "open": 10,
    "volumefrom": 10, "volumeto": 10}, {"time": 1438390800, "close": 20, "high": 20,
    "low": 20, "open": 20, "volumefrom": 20, "volumeto": 20}]}"#;
    fs::write(dir.path().join("price_history_SNGLS_BTC.json"), contents).unwrap();

    let result = cache
        .get_historical_data(&pair("SNGLS_BTC"), 1438390801, 0)
        .await
        .unwrap();

    assert_eq!(calls.lock().unwrap().len(), 0);
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].low, dec!(10));
    assert_eq!(result[0].high, dec!(10));
    assert_eq!(result[1].low, dec!(20));
    assert_eq!(result[1].high, dec!(20));
}

#[tokio::test]
async fn test_first_request_fetches_once_then_hits() {
    let (dir, cache, calls) = setup(MockProvider::with_hours(0..100));
    let btc_eur = pair("BTC_EUR");

    let first = cache
        .get_historical_data(&btc_eur, 20 * H, 10 * H)
        .await
        .unwrap();
    assert_eq!(first.len(), 11);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![("BTC_EUR".to_string(), 10 * H, 20 * H)]
    );

    let stored = read_file(&dir, "BTC_EUR");
    assert_eq!(stored.start_time, 10 * H);
    assert_eq!(stored.end_time, 20 * H);

    let second = cache
        .get_historical_data(&btc_eur, 20 * H, 10 * H)
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_fresh_instance_reads_previous_writes() {
    let dir = tempdir().unwrap();
    let btc_eur = pair("BTC_EUR");

    let provider = MockProvider::with_hours(0..100);
    let cache = PriceHistoryCache::new(PriceHistoryFileStore::new(dir.path()), Arc::new(provider));
    cache.get_historical_data(&btc_eur, 20 * H, 10 * H).await.unwrap();

    let provider = MockProvider::with_hours(0..100);
    let calls = provider.calls();
    let cache = PriceHistoryCache::new(PriceHistoryFileStore::new(dir.path()), Arc::new(provider));
    cache.get_historical_data(&btc_eur, 15 * H, 12 * H).await.unwrap();
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_only_missing_tail_is_fetched() {
    let (_dir, cache, calls) = setup(MockProvider::with_hours(0..100));
    let btc_eur = pair("BTC_EUR");

    cache.get_historical_data(&btc_eur, 20 * H, 10 * H).await.unwrap();
    let result = cache
        .get_historical_data(&btc_eur, 30 * H, 10 * H)
        .await
        .unwrap();

    assert_eq!(result.len(), 21);
    assert_eq!(
        calls.lock().unwrap()[1],
        ("BTC_EUR".to_string(), 20 * H + 1, 30 * H)
    );
}

#[tokio::test]
async fn test_head_and_tail_are_fetched_separately() {
    let (dir, cache, calls) = setup(MockProvider::with_hours(0..100));
    let btc_eur = pair("BTC_EUR");

    cache.get_historical_data(&btc_eur, 20 * H, 10 * H).await.unwrap();
    cache.get_historical_data(&btc_eur, 25 * H, 5 * H).await.unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1], ("BTC_EUR".to_string(), 5 * H, 10 * H - 1));
    assert_eq!(calls[2], ("BTC_EUR".to_string(), 20 * H + 1, 25 * H));

    let stored = read_file(&dir, "BTC_EUR");
    assert_eq!(stored.start_time, 5 * H);
    assert_eq!(stored.end_time, 25 * H);
    assert_eq!(stored.data.len(), 21);
    assert!(stored.validate().is_ok());
}

#[tokio::test]
async fn test_empty_provider_range_is_recorded_as_checked() {
    let (dir, cache, calls) = setup(MockProvider::empty());
    let eth_eur = pair("ETH_EUR");

    let result = cache
        .get_historical_data(&eth_eur, 20 * H, 10 * H)
        .await
        .unwrap();
    assert!(result.is_empty());

    let stored = read_file(&dir, "ETH_EUR");
    assert_eq!((stored.start_time, stored.end_time), (10 * H, 20 * H));

    let err = cache
        .get_historical_price(&eth_eur, 15 * H, 10 * H)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::NoPriceData { .. }));
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unsorted_cache_file_triggers_full_refetch() {
    let (dir, cache, calls) = setup(MockProvider::with_hours(0..100));
    let contents = r#"{"start_time": 0, "end_time": 360000,
    "data": [{"time": 7200, "close": 2, "high": 2, "low": 2, "open": 2,
    "volumefrom": 2, "volumeto": 2}, {"time": 3600, "close": 1, "high": 1, "low": 1,
    "open": 1, "volumefrom": 1, "volumeto": 1}]}"#;
    fs::write(dir.path().join("price_history_BTC_EUR.json"), contents).unwrap();

    let result = cache
        .get_historical_data(&pair("BTC_EUR"), 20 * H, 10 * H)
        .await
        .unwrap();

    assert_eq!(result.len(), 11);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![("BTC_EUR".to_string(), 10 * H, 20 * H)]
    );
    assert!(read_file(&dir, "BTC_EUR").validate().is_ok());
}

#[tokio::test]
async fn test_malformed_cache_file_triggers_full_refetch() {
    let (dir, cache, calls) = setup(MockProvider::with_hours(0..100));
    fs::write(dir.path().join("price_history_BTC_EUR.json"), "not json at all").unwrap();

    cache
        .get_historical_price(&pair("BTC_EUR"), 20 * H, 10 * H)
        .await
        .unwrap();
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_provider_error_leaves_cache_untouched() {
    let (dir, cache, _calls) = setup(MockProvider::failing());
    let btc_eur = pair("BTC_EUR");
    let path = dir.path().join("price_history_BTC_EUR.json");

    let err = cache
        .get_historical_data(&btc_eur, 20 * H, 10 * H)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::ProviderError { .. }));
    assert!(!path.exists());

    let contents = r#"{"start_time":36000,"end_time":72000,"data":[]}"#;
    fs::write(&path, contents).unwrap();
    let err = cache
        .get_historical_data(&btc_eur, 30 * H, 10 * H)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::ProviderError { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), contents);
}

#[tokio::test]
async fn test_rejects_inverted_range() {
    let (_dir, cache, calls) = setup(MockProvider::with_hours(0..100));
    let err = cache
        .get_historical_price(&pair("BTC_EUR"), 10 * H, 20 * H)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::InvalidRange { .. }));
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_price_comes_from_containing_bucket() {
    let (_dir, cache, _calls) = setup(MockProvider::with_hours(0..100));
    let entry = cache
        .get_historical_price(&pair("BTC_EUR"), 12 * H + 100, 10 * H)
        .await
        .unwrap();
    assert_eq!(entry.time, 12 * H);
    assert_eq!(entry.close, dec!(12));
}

#[tokio::test]
async fn test_reset_forces_refetch() {
    let (dir, cache, calls) = setup(MockProvider::with_hours(0..100));
    let btc_eur = pair("BTC_EUR");
    let eth_eur = pair("ETH_EUR");

    cache.get_historical_data(&btc_eur, 20 * H, 10 * H).await.unwrap();
    cache.get_historical_data(&eth_eur, 20 * H, 10 * H).await.unwrap();

    cache.reset(&btc_eur).await.unwrap();
    assert!(!dir.path().join("price_history_BTC_EUR.json").exists());
    assert!(dir.path().join("price_history_ETH_EUR.json").exists());

    cache.get_historical_data(&btc_eur, 20 * H, 10 * H).await.unwrap();
    assert_eq!(calls.lock().unwrap().len(), 3);

    cache.reset_all().await.unwrap();
    assert!(!dir.path().join("price_history_ETH_EUR.json").exists());
    cache.get_historical_data(&eth_eur, 20 * H, 10 * H).await.unwrap();
    assert_eq!(calls.lock().unwrap().len(), 4);
}
