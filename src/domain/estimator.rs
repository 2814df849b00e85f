//! Next-day price estimation.
//!
//! Calibrates an expected-return-per-score-point figure from the trailing
//! window of realized (score, percent change) pairs, then derives a bounded
//! OHLC estimate for the next day. Estimated lows never undercut the
//! computed support level and highs never exceed resistance.

use crate::domain::score::DailyScore;
use crate::domain::signal::{TechnicalSignals, TrendDirection};
use serde::Serialize;

/// Trailing days of (score, pct_change) pairs used for calibration.
pub const CALIBRATION_WINDOW: usize = 60;
/// Fallback when no usable pairs exist: percent return per score point.
pub const DEFAULT_RETURN_PER_POINT: f64 = 2.0;
/// Fallback daily volatility, in percent.
pub const DEFAULT_VOLATILITY: f64 = 1.5;
/// Hard bound on a single day's expected move, in percent.
pub const MAX_DAILY_MOVE_PCT: f64 = 10.0;

/// Score-to-return calibration over the trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Calibration {
    /// Expected percent return per unit of score.
    pub avg_return_per_score_point: f64,
    /// Standard deviation of |pct_change| over the window, in percent.
    pub volatility: f64,
    /// Usable pairs the figures were derived from; 0 means defaults.
    pub samples: usize,
}

impl Calibration {
    /// Calibrate from realized (score, pct_change) pairs; only the trailing
    /// [`CALIBRATION_WINDOW`] pairs are considered. An empty window or a
    /// zero mean score falls back to the documented defaults rather than
    /// dividing by zero.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        let start = pairs.len().saturating_sub(CALIBRATION_WINDOW);
        let window = &pairs[start..];
        if window.is_empty() {
            return Self::default_calibration();
        }

        let n = window.len() as f64;
        let mean_abs_pct = window.iter().map(|(_, pct)| pct.abs()).sum::<f64>() / n;
        let mean_score = window.iter().map(|(score, _)| score).sum::<f64>() / n;
        if mean_score <= 0.0 {
            return Self::default_calibration();
        }

        let variance = window
            .iter()
            .map(|(_, pct)| {
                let d = pct.abs() - mean_abs_pct;
                d * d
            })
            .sum::<f64>()
            / n;

        Self {
            avg_return_per_score_point: mean_abs_pct / mean_score,
            volatility: variance.sqrt(),
            samples: window.len(),
        }
    }

    pub fn default_calibration() -> Self {
        Self {
            avg_return_per_score_point: DEFAULT_RETURN_PER_POINT,
            volatility: DEFAULT_VOLATILITY,
            samples: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceEstimate {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Signed expected close-to-close move, in percent.
    pub expected_change_pct: f64,
}

/// Estimate the next day's OHLC from a baseline price.
///
/// Expected change is `score * avg_return_per_score_point`, halved when the
/// score sits below threshold, signed by trend direction, and clamped to
/// ±[`MAX_DAILY_MOVE_PCT`]. The intraday range scales with calibrated
/// volatility; support/resistance levels, when defined, bound the candle
/// with close pulled back inside the clamped range.
pub fn estimate_future_price(
    baseline: f64,
    score: &DailyScore,
    signals: &TechnicalSignals,
    calibration: &Calibration,
) -> PriceEstimate {
    let mut expected = score.score * calibration.avg_return_per_score_point;
    if !score.above_threshold {
        expected *= 0.5;
    }
    let bearish = signals
        .trend
        .is_some_and(|t| t.direction == TrendDirection::Bearish);
    if bearish {
        expected = -expected;
    }
    let expected = expected.clamp(-MAX_DAILY_MOVE_PCT, MAX_DAILY_MOVE_PCT);

    let open = baseline;
    let close = baseline * (1.0 + expected / 100.0);
    let half_range = baseline * calibration.volatility / 100.0 * 0.5;
    let mut high = open.max(close) + half_range;
    let mut low = open.min(close) - half_range;
    let mut open = open;
    let mut close = close;

    if let Some(sr) = &signals.support_resistance {
        if low < sr.support {
            low = sr.support;
            open = open.max(low);
            close = close.max(low);
            high = high.max(open.max(close));
        }
        if high > sr.resistance {
            high = sr.resistance;
            open = open.min(high);
            close = close.min(high);
            low = low.min(open.min(close));
        }
    }

    PriceEstimate {
        open,
        high,
        low,
        close,
        expected_change_pct: expected,
    }
}
