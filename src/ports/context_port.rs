//! Contextual flags port trait.
//!
//! Market/sector direction, earnings windows, and macro/news sentiment are
//! computed outside this engine and injected per date.

use crate::domain::error::FactorcastError;
use crate::domain::factor::ContextFlags;
use chrono::NaiveDate;
use std::collections::HashMap;

pub trait ContextPort {
    /// Per-date flags for a symbol. Dates missing from the map mean all
    /// flags false, never an error.
    fn flags_for(&self, code: &str) -> Result<HashMap<NaiveDate, ContextFlags>, FactorcastError>;
}
