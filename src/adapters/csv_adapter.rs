//! CSV file data adapter.
//!
//! One `{CODE}.csv` per symbol with columns `date,open,high,low,close,volume`.
//! Records with an unparseable date or price are skipped and reported, never
//! fatal; empty price fields mean the value is absent.

use crate::domain::error::{FactorcastError, SkipReason, SkippedRecord};
use crate::domain::ohlcv::{PricePoint, TimeSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use log::warn;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{code}.csv"))
    }

    fn parse_records(content: &str) -> (Vec<PricePoint>, Vec<SkippedRecord>) {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();
        let mut skipped = Vec::new();

        for (idx, result) in rdr.records().enumerate() {
            // Header occupies line 1.
            let line = idx + 2;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    skipped.push(SkippedRecord {
                        line: Some(line),
                        date: None,
                        reason: SkipReason::UnparseableDate(e.to_string()),
                    });
                    continue;
                }
            };

            let date_str = record.get(0).unwrap_or("").trim();
            let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") else {
                skipped.push(SkippedRecord {
                    line: Some(line),
                    date: None,
                    reason: SkipReason::UnparseableDate(date_str.to_string()),
                });
                continue;
            };

            let mut bad_field = None;
            let mut field = |pos: usize, name: &'static str| -> Option<f64> {
                let raw = record.get(pos).unwrap_or("").trim();
                if raw.is_empty() {
                    return None;
                }
                match raw.parse::<f64>() {
                    Ok(v) => Some(v),
                    Err(_) => {
                        bad_field.get_or_insert((name, raw.to_string()));
                        None
                    }
                }
            };

            let open = field(1, "open");
            let high = field(2, "high");
            let low = field(3, "low");
            let close = field(4, "close");
            let volume = field(5, "volume");

            if let Some((name, value)) = bad_field {
                skipped.push(SkippedRecord {
                    line: Some(line),
                    date: Some(date),
                    reason: SkipReason::UnparseablePrice { field: name, value },
                });
                continue;
            }

            points.push(PricePoint {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        (points, skipped)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        code: &str,
    ) -> Result<(TimeSeries, Vec<SkippedRecord>), FactorcastError> {
        let path = self.csv_path(code);
        let content = fs::read_to_string(&path).map_err(|_| FactorcastError::NoData {
            code: code.to_string(),
        })?;

        let (points, mut skipped) = Self::parse_records(&content);
        let (series, order_skips) = TimeSeries::from_points(points);
        skipped.extend(order_skips);

        for record in &skipped {
            warn!(
                "{code}: skipping record (line {:?}): {}",
                record.line, record.reason
            );
        }

        Ok((series, skipped))
    }

    fn list_codes(&self) -> Result<Vec<String>, FactorcastError> {
        let mut codes = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if !stem.ends_with("_context") {
                        codes.push(stem.to_string());
                    }
                }
            }
        }
        codes.sort();
        Ok(codes)
    }

    fn data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FactorcastError> {
        let (series, _) = self.fetch_series(code)?;
        Ok(series
            .date_range()
            .map(|(first, last)| (first, last, series.len())))
    }
}
