#![allow(dead_code)]

use chrono::NaiveDate;
use factorcast::domain::error::{FactorcastError, SkippedRecord};
use factorcast::domain::factor::ContextFlags;
pub use factorcast::domain::ohlcv::{PricePoint, TimeSeries};
use factorcast::ports::context_port::ContextPort;
use factorcast::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, code: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(code.to_string(), points);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        code: &str,
    ) -> Result<(TimeSeries, Vec<SkippedRecord>), FactorcastError> {
        if self.errors.contains_key(code) {
            return Err(FactorcastError::NoData {
                code: code.to_string(),
            });
        }
        let points = self.data.get(code).cloned().unwrap_or_default();
        Ok(TimeSeries::from_points(points))
    }

    fn list_codes(&self) -> Result<Vec<String>, FactorcastError> {
        let mut codes: Vec<String> = self.data.keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }

    fn data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FactorcastError> {
        match self.data.get(code) {
            Some(points) if !points.is_empty() => {
                let min = points.iter().map(|p| p.date).min().unwrap();
                let max = points.iter().map(|p| p.date).max().unwrap();
                Ok(Some((min, max, points.len())))
            }
            _ => Ok(None),
        }
    }
}

pub struct MockContextPort {
    pub flags: HashMap<String, HashMap<NaiveDate, ContextFlags>>,
}

impl MockContextPort {
    pub fn new() -> Self {
        Self {
            flags: HashMap::new(),
        }
    }

    pub fn with_flags(mut self, code: &str, flags: HashMap<NaiveDate, ContextFlags>) -> Self {
        self.flags.insert(code.to_string(), flags);
        self
    }
}

impl ContextPort for MockContextPort {
    fn flags_for(&self, code: &str) -> Result<HashMap<NaiveDate, ContextFlags>, FactorcastError> {
        Ok(self.flags.get(code).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_point(date_str: &str, close: f64) -> PricePoint {
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap();
    PricePoint {
        date,
        open: Some(close),
        high: Some(close * 1.02),
        low: Some(close * 0.98),
        close: Some(close),
        volume: Some(1000.0),
    }
}

/// Generates `count` consecutive calendar days with a gentle uptrend and a
/// small repeating wobble, starting at `base` on `start`.
pub fn generate_points(start: &str, count: usize, base: f64) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = base + (i as f64 * 0.3) + ((i % 5) as f64 - 2.0) * 0.5;
            PricePoint {
                date: start + chrono::Days::new(i as u64),
                open: Some(close - 0.2),
                high: Some(close + 1.0),
                low: Some(close - 1.0),
                close: Some(close),
                volume: Some(1000.0 + (i % 7) as f64 * 150.0),
            }
        })
        .collect()
}
