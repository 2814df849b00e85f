//! Domain error types.
//!
//! Per-record problems (a bad date, an unparseable price) are not errors at
//! all: they become [`SkippedRecord`] entries returned alongside partial
//! results. Only configuration and data-boundary failures abort a run.

use chrono::NaiveDate;

/// Top-level error type for factorcast.
#[derive(Debug, thiserror::Error)]
pub enum FactorcastError {
    #[error("invalid record at line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("insufficient history for {code}: have {points} points, need {minimum}")]
    InsufficientHistory {
        code: String,
        points: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FactorcastError> for std::process::ExitCode {
    fn from(err: &FactorcastError) -> Self {
        let code: u8 = match err {
            FactorcastError::Io(_) => 1,
            FactorcastError::ConfigParse { .. }
            | FactorcastError::ConfigMissing { .. }
            | FactorcastError::ConfigInvalid { .. } => 2,
            FactorcastError::InvalidRecord { .. } => 3,
            FactorcastError::NoData { .. } | FactorcastError::InsufficientHistory { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

/// An input record that could not be used, reported alongside partial results.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// 1-based line number in the source file, when known.
    pub line: Option<usize>,
    /// Date of the record, when it could at least be parsed.
    pub date: Option<NaiveDate>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    UnparseableDate(String),
    UnparseablePrice { field: &'static str, value: String },
    DuplicateDate,
    OutOfOrder,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnparseableDate(s) => write!(f, "unparseable date: {s:?}"),
            SkipReason::UnparseablePrice { field, value } => {
                write!(f, "unparseable {field}: {value:?}")
            }
            SkipReason::DuplicateDate => write!(f, "duplicate date"),
            SkipReason::OutOfOrder => write!(f, "date out of order"),
        }
    }
}
