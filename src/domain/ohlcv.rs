//! OHLCV price series representation.
//!
//! A [`PricePoint`] is immutable once recorded for a date. `close` is
//! mandatory for a full record, but supplemental records may carry only a
//! date; they stay in the series for date continuity and indicator code
//! skips them. A [`TimeSeries`] holds strictly increasing unique dates.
//! Gaps (non-trading days) are permitted and never interpolated.

use crate::domain::error::{SkipReason, SkippedRecord};
use chrono::NaiveDate;
use serde::Serialize;

/// Recommended minimum lookback to support MA200 plus buffer. Advisory:
/// shorter series degrade to undefined indicator values, not errors.
pub const MIN_LOOKBACK: usize = 210;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl PricePoint {
    /// A record carrying only a close, the common case for test fixtures
    /// and vendor feeds that omit intraday fields.
    pub fn close_only(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: Some(close),
            volume: None,
        }
    }
}

/// Ordered, deduplicated OHLCV sequence for one symbol.
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    points: Vec<PricePoint>,
}

impl TimeSeries {
    /// Build a series from points already in ascending date order.
    ///
    /// Points that repeat a date or step backwards are dropped and reported,
    /// never silently reordered.
    pub fn from_points(points: Vec<PricePoint>) -> (Self, Vec<SkippedRecord>) {
        let mut kept: Vec<PricePoint> = Vec::with_capacity(points.len());
        let mut skipped = Vec::new();

        for point in points {
            match kept.last() {
                Some(prev) if point.date == prev.date => skipped.push(SkippedRecord {
                    line: None,
                    date: Some(point.date),
                    reason: SkipReason::DuplicateDate,
                }),
                Some(prev) if point.date < prev.date => skipped.push(SkippedRecord {
                    line: None,
                    date: Some(point.date),
                    reason: SkipReason::OutOfOrder,
                }),
                _ => kept.push(point),
            }
        }

        (Self { points: kept }, skipped)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}
