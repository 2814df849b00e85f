//! CSV contextual-flags adapter.
//!
//! Reads `{CODE}_context.csv` with columns
//! `date,market_up,sector_up,earnings_window,short_covering,macro_tailwind,news_positive`.
//! A missing file means no context was supplied: every flag false.

use crate::domain::error::FactorcastError;
use crate::domain::factor::ContextFlags;
use crate::ports::context_port::ContextPort;
use chrono::NaiveDate;
use log::warn;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub struct ContextCsvAdapter {
    base_path: PathBuf,
}

impl ContextCsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn parse_flag(raw: Option<&str>) -> bool {
        matches!(
            raw.map(str::trim).map(str::to_lowercase).as_deref(),
            Some("true") | Some("yes") | Some("1")
        )
    }
}

impl ContextPort for ContextCsvAdapter {
    fn flags_for(&self, code: &str) -> Result<HashMap<NaiveDate, ContextFlags>, FactorcastError> {
        let path = self.base_path.join(format!("{code}_context.csv"));
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Ok(HashMap::new()),
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut flags = HashMap::new();

        for (idx, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("{code}: bad context row at line {}: {e}", idx + 2);
                    continue;
                }
            };
            let date_str = record.get(0).unwrap_or("").trim();
            let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") else {
                warn!(
                    "{code}: unparseable context date at line {}: {date_str:?}",
                    idx + 2
                );
                continue;
            };

            flags.insert(
                date,
                ContextFlags {
                    market_up: Self::parse_flag(record.get(1)),
                    sector_up: Self::parse_flag(record.get(2)),
                    earnings_window: Self::parse_flag(record.get(3)),
                    short_covering: Self::parse_flag(record.get(4)),
                    macro_tailwind: Self::parse_flag(record.get(5)),
                    news_positive: Self::parse_flag(record.get(6)),
                },
            );
        }

        Ok(flags)
    }
}
