use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::decimal_format;
use super::types::Timestamp;
use crate::errors::MarketDataError;

/// Width of one price-history bucket. Series are stored hourly.
pub const HOUR_SECS: Timestamp = 3600;

/// One OHLC point of a price-history series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    /// Start of the bucket (unix seconds)
    pub time: Timestamp,
    #[serde(with = "decimal_format")]
    pub open: Decimal,
    #[serde(with = "decimal_format")]
    pub high: Decimal,
    #[serde(with = "decimal_format")]
    pub low: Decimal,
    #[serde(with = "decimal_format")]
    pub close: Decimal,
    /// Volume traded, in the base asset
    #[serde(with = "decimal_format")]
    pub volumefrom: Decimal,
    /// Volume traded, in the quote asset
    #[serde(with = "decimal_format")]
    pub volumeto: Decimal,
}

impl PriceHistoryEntry {
    /// All prices and volumes are non-negative.
    pub fn is_valid(&self) -> bool {
        [
            self.open,
            self.high,
            self.low,
            self.close,
            self.volumefrom,
            self.volumeto,
        ]
        .iter()
        .all(|v| !v.is_sign_negative())
    }

    /// Whether `timestamp` falls inside this entry's hourly bucket.
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        timestamp >= self.time && timestamp - self.time < HOUR_SECS
    }
}

/// Cached price history of one pair together with its coverage claim.
///
/// `start_time..=end_time` is the span that has been checked against the
/// remote provider. Points may be missing inside it when the provider has
/// gaps; callers must still treat the whole span as known.
///
/// # Invariants
///
/// - `data` is sorted by `time`, strictly increasing
/// - `start_time <= data[0].time` and `end_time >= data[last].time`
/// - `start_time == end_time == 0` with no data means "nothing cached"
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRange {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub data: Vec<PriceHistoryEntry>,
}

impl CachedRange {
    /// The range of a pair that was never fetched.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.start_time == 0 && self.end_time == 0 && self.data.is_empty()
    }

    /// Structural validation used when loading a range from disk.
    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Ok(());
        }
        if self.start_time > self.end_time {
            return Err(format!(
                "start_time {} is after end_time {}",
                self.start_time, self.end_time
            ));
        }
        if let Some(pos) = self.data.windows(2).position(|w| w[0].time >= w[1].time) {
            return Err(format!(
                "entries not strictly increasing at index {} ({} >= {})",
                pos,
                self.data[pos].time,
                self.data[pos + 1].time
            ));
        }
        if let (Some(first), Some(last)) = (self.data.first(), self.data.last()) {
            if first.time < self.start_time || last.time > self.end_time {
                return Err(format!(
                    "entries [{}, {}] fall outside coverage [{}, {}]",
                    first.time, last.time, self.start_time, self.end_time
                ));
            }
        }
        if let Some(bad) = self.data.iter().find(|e| !e.is_valid()) {
            return Err(format!("negative value in entry at {}", bad.time));
        }
        Ok(())
    }

    /// Whether `[start, end]` lies completely inside the coverage.
    pub fn covers(&self, start: Timestamp, end: Timestamp) -> bool {
        !self.is_empty() && self.start_time <= start && end <= self.end_time
    }

    /// Inclusive sub-ranges of `[start, end]` not yet covered.
    ///
    /// At most two ranges come back: one before the current coverage and one
    /// after it. Each touches the existing coverage, so merging them keeps
    /// the coverage contiguous.
    pub fn missing_ranges(&self, start: Timestamp, end: Timestamp) -> Vec<(Timestamp, Timestamp)> {
        if self.is_empty() {
            return vec![(start, end)];
        }
        let mut ranges = Vec::new();
        if start < self.start_time {
            ranges.push((start, self.start_time - 1));
        }
        if end > self.end_time {
            ranges.push((self.end_time + 1, end));
        }
        ranges
    }

    /// Splice freshly fetched entries covering `[range_start, range_end]`.
    ///
    /// On a time collision the fetched entry wins. The coverage grows to the
    /// union even when `fetched` is empty, so a range the provider has no
    /// data for is not requested again. Merging the same fetch twice leaves
    /// the range unchanged.
    ///
    /// Coverage is also widened to the first and last entry times, since
    /// every entry must lie inside it. A request starting mid-bucket is
    /// stored from the start of that bucket, e.g. `[36100, 72100]` fetched
    /// with a 36000 entry is stored as `[36000, 72100]`. The stored range is
    /// then a superset of the request and still `covers` it.
    ///
    /// Fails with `InvalidRange` if the range is inverted or would leave an
    /// unchecked gap next to the current coverage.
    pub fn merge(
        &mut self,
        fetched: Vec<PriceHistoryEntry>,
        range_start: Timestamp,
        range_end: Timestamp,
    ) -> Result<(), MarketDataError> {
        if range_start > range_end {
            return Err(MarketDataError::InvalidRange {
                start: range_start,
                end: range_end,
            });
        }
        let was_empty = self.is_empty();
        if !was_empty
            && (range_start > self.end_time.saturating_add(1)
                || range_end < self.start_time.saturating_sub(1))
        {
            return Err(MarketDataError::InvalidRange {
                start: range_start,
                end: range_end,
            });
        }

        let mut by_time: BTreeMap<Timestamp, PriceHistoryEntry> = self
            .data
            .drain(..)
            .map(|entry| (entry.time, entry))
            .collect();
        for entry in fetched {
            by_time.insert(entry.time, entry);
        }
        self.data = by_time.into_values().collect();

        let (mut start, mut end) = if was_empty {
            (range_start, range_end)
        } else {
            (
                self.start_time.min(range_start),
                self.end_time.max(range_end),
            )
        };
        if let (Some(first), Some(last)) = (self.data.first(), self.data.last()) {
            start = start.min(first.time);
            end = end.max(last.time);
        }
        self.start_time = start;
        self.end_time = end;
        Ok(())
    }

    /// Copies of the entries with `start <= time <= end`.
    pub fn entries_between(&self, start: Timestamp, end: Timestamp) -> Vec<PriceHistoryEntry> {
        let from = self.data.partition_point(|e| e.time < start);
        let to = self.data.partition_point(|e| e.time <= end);
        if from >= to {
            return Vec::new();
        }
        self.data[from..to].to_vec()
    }

    /// The entry for `timestamp`.
    ///
    /// Returns the entry whose hourly bucket contains `timestamp` when there
    /// is one, otherwise the nearest entry by distance (earlier wins a tie).
    pub fn entry_at(&self, timestamp: Timestamp) -> Option<&PriceHistoryEntry> {
        let idx = self.data.partition_point(|e| e.time <= timestamp);
        let before = idx.checked_sub(1).and_then(|i| self.data.get(i));
        let after = self.data.get(idx);
        match (before, after) {
            (Some(b), _) if b.contains(timestamp) => Some(b),
            (Some(b), Some(a)) => {
                if a.time - timestamp < timestamp - b.time {
                    Some(a)
                } else {
                    Some(b)
                }
            }
            (Some(b), None) => Some(b),
            (None, a) => a,
        }
    }
}
