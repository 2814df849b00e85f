//! Technical indicator engine.
//!
//! Produces one [`IndicatorRow`] per input date. A value is `None` until the
//! required lookback exists; it is never coerced to zero. Rows with a missing
//! close keep their date (the series is never reordered or shortened) but
//! carry no indicator values.

pub mod rsi;
pub mod sma;

use crate::domain::ohlcv::TimeSeries;
use chrono::NaiveDate;
use serde::Serialize;

pub const MA_SHORT: usize = 20;
pub const MA_MID: usize = 50;
pub const MA_LONG: usize = 200;
pub const RSI_PERIOD: usize = 14;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    /// Day-over-day percent change of close, in percent (4.0 == +4%).
    pub pct_change: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,
    pub rsi: Option<f64>,
}

/// Compute all per-day indicators for a series in forward passes with
/// rolling windows. One output row per input point, dates preserved.
pub fn compute_indicators(series: &TimeSeries) -> Vec<IndicatorRow> {
    let points = series.points();
    let ma20 = sma::calculate_sma(points, MA_SHORT);
    let ma50 = sma::calculate_sma(points, MA_MID);
    let ma200 = sma::calculate_sma(points, MA_LONG);
    let rsi = rsi::calculate_rsi(points, RSI_PERIOD);

    points
        .iter()
        .enumerate()
        .map(|(i, point)| IndicatorRow {
            date: point.date,
            pct_change: pct_change_at(series, i),
            ma20: ma20[i],
            ma50: ma50[i],
            ma200: ma200[i],
            rsi: rsi[i],
        })
        .collect()
}

/// `(close[i] - close[i-1]) / close[i-1] * 100`. Undefined on the first row
/// or whenever either close is absent, or the previous close is zero.
fn pct_change_at(series: &TimeSeries, index: usize) -> Option<f64> {
    if index == 0 {
        return None;
    }
    let close = series.points()[index].close?;
    let prev = series.points()[index - 1].close?;
    if prev == 0.0 {
        return None;
    }
    Some((close - prev) / prev * 100.0)
}
