//! factorcast analyses daily OHLCV series: moving averages and RSI,
//! boolean market factors, a weighted probability score, technical
//! signals, historical pattern matches, and forward price estimates
//! with simulated multi-day paths.
//!
//! The crate follows a hexagonal layout. `domain` holds the engine,
//! `ports` the trait seams, `adapters` the CSV, INI, and report
//! implementations, and `cli` the command surface.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
