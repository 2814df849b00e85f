//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod factor;
pub mod score;
pub mod signal;
pub mod pattern;
pub mod estimator;
pub mod simulate;
pub mod analysis;
pub mod config_validation;
pub mod error;
