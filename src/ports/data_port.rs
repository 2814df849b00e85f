//! Time-series access port trait.

use crate::domain::error::{FactorcastError, SkippedRecord};
use crate::domain::ohlcv::TimeSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Fetch the full ordered series for a symbol, together with any
    /// records that had to be skipped while loading it.
    fn fetch_series(&self, code: &str)
        -> Result<(TimeSeries, Vec<SkippedRecord>), FactorcastError>;

    fn list_codes(&self) -> Result<Vec<String>, FactorcastError>;

    fn data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FactorcastError>;
}
