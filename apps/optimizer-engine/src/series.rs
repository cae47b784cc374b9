//! OHLCV bar series for strategy simulation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from bar series operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeriesError {
    /// Sub-series bounds are out of range.
    #[error("invalid sub-series range [{start}, {end}) for series of length {len}")]
    InvalidRange {
        /// Requested start index (inclusive).
        start: usize,
        /// Requested end index (exclusive).
        end: usize,
        /// Series length.
        len: usize,
    },

    /// Bar timestamps are not in ascending order.
    #[error("non-monotonic timestamp at index {index}: '{timestamp}'")]
    NonMonotonicTimestamp {
        /// Index of the offending bar.
        index: usize,
        /// Timestamp of the offending bar.
        timestamp: String,
    },
}

/// One OHLCV price observation over a fixed period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar timestamp (ISO 8601).
    pub timestamp: String,
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Traded volume.
    pub volume: Decimal,
}

impl Bar {
    /// Create a new bar.
    #[must_use]
    pub const fn new(
        timestamp: String,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// An ordered, immutable sequence of OHLCV bars.
///
/// Timestamps must be ascending; ISO 8601 strings compare lexicographically
/// in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Create a series from bars, validating timestamp order.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::NonMonotonicTimestamp`] if any bar's timestamp
    /// precedes its predecessor's.
    pub fn new(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(SeriesError::NonMonotonicTimestamp {
                    index: index + 1,
                    timestamp: pair[1].timestamp.clone(),
                });
            }
        }
        Ok(Self { bars })
    }

    /// Number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the series holds no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get a bar by index.
    #[must_use]
    pub fn bar(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// All bars in order.
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Close prices in order.
    #[must_use]
    pub fn closes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Extract the sub-series covering `[start, end)`.
    ///
    /// Bounds must satisfy `start < end <= len`.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::InvalidRange`] when the bounds are violated.
    pub fn sub_series(&self, start: usize, end: usize) -> Result<Self, SeriesError> {
        if start >= end || end > self.bars.len() {
            return Err(SeriesError::InvalidRange {
                start,
                end,
                len: self.bars.len(),
            });
        }
        Ok(Self {
            bars: self.bars[start..end].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn make_bar(ts: &str, close: i64) -> Bar {
        let price = Decimal::new(close, 2);
        Bar::new(
            ts.to_string(),
            price,
            price,
            price,
            price,
            dec!(100_000),
        )
    }

    fn make_series(n: usize) -> BarSeries {
        let bars: Vec<Bar> = (0..n)
            .map(|i| make_bar(&format!("2024-01-01T00:{:02}:00Z", i), 10_000 + i as i64))
            .collect();
        BarSeries::new(bars).unwrap()
    }

    #[test]
    fn test_series_creation() {
        let series = make_series(5);
        assert_eq!(series.len(), 5);
        assert!(!series.is_empty());
        assert_eq!(series.bar(0).unwrap().close, dec!(100.00));
    }

    #[test]
    fn test_non_monotonic_timestamps_rejected() {
        let bars = vec![
            make_bar("2024-01-02T00:00:00Z", 100),
            make_bar("2024-01-01T00:00:00Z", 101),
        ];
        let result = BarSeries::new(bars);
        assert!(matches!(
            result,
            Err(SeriesError::NonMonotonicTimestamp { index: 1, .. })
        ));
    }

    #[test]
    fn test_equal_timestamps_allowed() {
        let bars = vec![
            make_bar("2024-01-01T00:00:00Z", 100),
            make_bar("2024-01-01T00:00:00Z", 101),
        ];
        assert!(BarSeries::new(bars).is_ok());
    }

    #[test]
    fn test_sub_series() {
        let series = make_series(10);
        let sub = series.sub_series(2, 7).unwrap();
        assert_eq!(sub.len(), 5);
        assert_eq!(sub.bar(0).unwrap().close, series.bar(2).unwrap().close);
    }

    #[test]
    fn test_sub_series_full_range() {
        let series = make_series(4);
        let sub = series.sub_series(0, 4).unwrap();
        assert_eq!(sub, series);
    }

    #[test]
    fn test_sub_series_invalid_bounds() {
        let series = make_series(4);

        assert!(matches!(
            series.sub_series(2, 2),
            Err(SeriesError::InvalidRange { .. })
        ));
        assert!(matches!(
            series.sub_series(3, 1),
            Err(SeriesError::InvalidRange { .. })
        ));
        assert!(matches!(
            series.sub_series(0, 5),
            Err(SeriesError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_closes() {
        let series = make_series(3);
        let closes = series.closes();
        assert_eq!(closes, vec![dec!(100.00), dec!(100.01), dec!(100.02)]);
    }
}
