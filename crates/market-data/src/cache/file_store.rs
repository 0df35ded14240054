//! On-disk storage of cached price-history ranges.
//!
//! One JSON file per canonical pair, named `price_history_<BASE>_<QUOTE>.json`
//! inside the data directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::errors::MarketDataError;
use crate::models::{CachedRange, TradingPair};

const FILE_PREFIX: &str = "price_history_";
const FILE_SUFFIX: &str = ".json";

/// Directory of price-history cache files.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so readers never see a partially written file. Two
/// processes extending the same pair at once race: the last rename wins and
/// the other process's update is lost.
#[derive(Debug, Clone)]
pub struct PriceHistoryFileStore {
    dir: PathBuf,
}

impl PriceHistoryFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file of `pair`.
    pub fn path_for(&self, pair: &TradingPair) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", FILE_PREFIX, pair.canonical_name(), FILE_SUFFIX))
    }

    /// Load the cached range of `pair`.
    ///
    /// A missing file yields the empty range. So does a file that cannot be
    /// read, parsed or validated; that case is logged and the file is left
    /// in place until the next successful write replaces it.
    pub fn load(&self, pair: &TradingPair) -> CachedRange {
        let path = self.path_for(pair);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No price history cache for {}", pair);
                return CachedRange::empty();
            }
            Err(e) => {
                warn!("Failed to read {}: {}. Ignoring the cache file", path.display(), e);
                return CachedRange::empty();
            }
        };

        let range: CachedRange = match serde_json::from_slice(&raw) {
            Ok(range) => range,
            Err(e) => {
                warn!("Malformed cache file {}: {}. Ignoring it", path.display(), e);
                return CachedRange::empty();
            }
        };

        if let Err(reason) = range.validate() {
            warn!("Invalid cache file {}: {}. Ignoring it", path.display(), reason);
            return CachedRange::empty();
        }

        debug!(
            "Loaded price history cache for {} covering [{}, {}] with {} entries",
            pair,
            range.start_time,
            range.end_time,
            range.data.len()
        );
        range
    }

    /// Atomically replace the cache file of `pair` with `range`.
    pub fn persist(&self, pair: &TradingPair, range: &CachedRange) -> Result<(), MarketDataError> {
        let path = self.path_for(pair);
        let cache_error = |message: String| MarketDataError::CacheWrite {
            path: path.display().to_string(),
            message,
        };

        fs::create_dir_all(&self.dir).map_err(|e| cache_error(e.to_string()))?;
        let json = serde_json::to_vec(range).map_err(|e| cache_error(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| cache_error(e.to_string()))?;
        tmp.write_all(&json).map_err(|e| cache_error(e.to_string()))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| cache_error(e.to_string()))?;
        tmp.persist(&path)
            .map_err(|e| cache_error(e.error.to_string()))?;

        debug!("Wrote {}", path.display());
        Ok(())
    }

    /// Delete the cache file of `pair`. A missing file is not an error.
    pub fn remove(&self, pair: &TradingPair) -> Result<(), MarketDataError> {
        let path = self.path_for(pair);
        remove_file(&path)
    }

    /// Delete every price-history cache file in the directory.
    ///
    /// Returns how many files were removed.
    pub fn remove_all(&self) -> Result<usize, MarketDataError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(MarketDataError::CacheWrite {
                    path: self.dir.display().to_string(),
                    message: e.to_string(),
                })
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX) {
                remove_file(&entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn remove_file(path: &Path) -> Result<(), MarketDataError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MarketDataError::CacheWrite {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceHistoryEntry;
    use crate::resolver::PairDecoder;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn pair(name: &str) -> TradingPair {
        PairDecoder::kraken().decode_canonical(name).unwrap()
    }

    fn sample_range() -> CachedRange {
        CachedRange {
            start_time: 0,
            end_time: 7200,
            data: vec![PriceHistoryEntry {
                time: 3600,
                open: dec!(1.5),
                high: dec!(2),
                low: dec!(1),
                close: dec!(1.75),
                volumefrom: dec!(10),
                volumeto: dec!(17.5),
            }],
        }
    }

    #[test]
    fn test_file_naming() {
        let store = PriceHistoryFileStore::new("/data");
        assert_eq!(
            store.path_for(&pair("SNGLS_BTC")),
            PathBuf::from("/data/price_history_SNGLS_BTC.json")
        );
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let store = PriceHistoryFileStore::new(dir.path());
        let btc_eur = pair("BTC_EUR");

        assert!(store.load(&btc_eur).is_empty());
        store.persist(&btc_eur, &sample_range()).unwrap();
        assert_eq!(store.load(&btc_eur), sample_range());
    }

    #[test]
    fn test_decimals_are_written_as_strings() {
        let dir = tempdir().unwrap();
        let store = PriceHistoryFileStore::new(dir.path());
        let btc_eur = pair("BTC_EUR");
        store.persist(&btc_eur, &sample_range()).unwrap();

        let raw = fs::read_to_string(store.path_for(&btc_eur)).unwrap();
        assert!(raw.contains(r#""close":"1.75""#));
    }

    #[test]
    fn test_persist_creates_directory() {
        let dir = tempdir().unwrap();
        let store = PriceHistoryFileStore::new(dir.path().join("nested").join("cache"));
        store.persist(&pair("ETH_EUR"), &sample_range()).unwrap();
        assert!(store.path_for(&pair("ETH_EUR")).exists());
    }

    #[test]
    fn test_corrupt_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let store = PriceHistoryFileStore::new(dir.path());
        let btc_eur = pair("BTC_EUR");
        fs::write(store.path_for(&btc_eur), b"{\"start_time\": 0, \"end_ti").unwrap();
        assert!(store.load(&btc_eur).is_empty());
    }

    #[test]
    fn test_remove_and_remove_all() {
        let dir = tempdir().unwrap();
        let store = PriceHistoryFileStore::new(dir.path());
        store.persist(&pair("BTC_EUR"), &sample_range()).unwrap();
        store.persist(&pair("ETH_EUR"), &sample_range()).unwrap();
        fs::write(dir.path().join("unrelated.json"), b"{}").unwrap();

        store.remove(&pair("BTC_EUR")).unwrap();
        store.remove(&pair("BTC_EUR")).unwrap();
        assert!(!store.path_for(&pair("BTC_EUR")).exists());

        assert_eq!(store.remove_all().unwrap(), 1);
        assert!(dir.path().join("unrelated.json").exists());
    }
}
