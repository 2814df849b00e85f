//! Descriptive technical signal bundle for one day.
//!
//! Every sub-signal degrades to `None` when the history it needs is not
//! there; no signal failure aborts the bundle.

use crate::domain::indicator::IndicatorRow;
use crate::domain::ohlcv::TimeSeries;
use chrono::NaiveDate;
use serde::Serialize;

/// Trailing window for support/resistance and the volume baseline,
/// inclusive of the current day for support/resistance.
pub const SIGNAL_WINDOW: usize = 20;

/// Deadband around a moving average before a close counts as above/below.
const MA_DEADBAND_PCT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendSignal {
    pub direction: TrendDirection,
    pub strength: TrendStrength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumSignal {
    Overbought,
    /// RSI above 60 but not yet past the overbought line.
    OverboughtLeaning,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Momentum {
    pub rsi: f64,
    pub signal: MomentumSignal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaPosition {
    Above,
    Below,
    At,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaAlignment {
    Bullish,
    Bearish,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MovingAverageSignals {
    pub vs_ma20: Option<MaPosition>,
    pub vs_ma50: Option<MaPosition>,
    pub vs_ma200: Option<MaPosition>,
    /// Overall tag; defined only when all three positions are.
    pub alignment: Option<MaAlignment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SupportResistance {
    /// Minimum low over the trailing window, current day inclusive.
    pub support: f64,
    /// Maximum high over the trailing window, current day inclusive.
    pub resistance: f64,
    /// Percent of close separating it from support (>= 0).
    pub support_distance_pct: f64,
    /// Percent of close separating it from resistance (>= 0).
    pub resistance_distance_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeLevel {
    High,
    Low,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeSignal {
    /// Current volume over the trailing 20-day average.
    pub ratio: f64,
    pub level: VolumeLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalSignals {
    pub date: NaiveDate,
    pub trend: Option<TrendSignal>,
    pub momentum: Option<Momentum>,
    pub moving_averages: MovingAverageSignals,
    pub support_resistance: Option<SupportResistance>,
    pub volume: Option<VolumeSignal>,
}

/// Analyze the day at `index` with its trailing window. Returns `None` only
/// when `index` is out of range; missing history inside the window degrades
/// the individual sub-signals instead.
pub fn analyze_signals(
    series: &TimeSeries,
    indicators: &[IndicatorRow],
    index: usize,
) -> Option<TechnicalSignals> {
    let point = series.points().get(index)?;
    let row = indicators.get(index)?;

    Some(TechnicalSignals {
        date: point.date,
        trend: trend_signal(point.close, row),
        momentum: row.rsi.map(momentum_signal),
        moving_averages: ma_signals(point.close, row),
        support_resistance: support_resistance(series, index),
        volume: volume_signal(series, index),
    })
}

/// Full bullish alignment is close > MA20 > MA50 > MA200; symmetric for
/// bearish; anything else is neutral. Strength for an aligned trend comes
/// from how far close sits from MA200 (>5% strong, >2% moderate); a neutral
/// day is moderate when most orderings agree, weak otherwise.
fn trend_signal(close: Option<f64>, row: &IndicatorRow) -> Option<TrendSignal> {
    let close = close?;
    let (ma20, ma50, ma200) = (row.ma20?, row.ma50?, row.ma200?);

    let bullish = close > ma20 && ma20 > ma50 && ma50 > ma200 && close > ma50 && close > ma200;
    let bearish = close < ma20 && ma20 < ma50 && ma50 < ma200 && close < ma50 && close < ma200;

    let direction = if bullish {
        TrendDirection::Bullish
    } else if bearish {
        TrendDirection::Bearish
    } else {
        TrendDirection::Neutral
    };

    let strength = match direction {
        TrendDirection::Neutral => {
            let bull_checks = [close > ma20, close > ma50, close > ma200, ma20 > ma50, ma50 > ma200];
            let agreeing = bull_checks.iter().filter(|&&b| b).count();
            if agreeing <= 1 || agreeing >= 4 {
                TrendStrength::Moderate
            } else {
                TrendStrength::Weak
            }
        }
        _ => {
            let spread_pct = ((close - ma200) / ma200 * 100.0).abs();
            if spread_pct > 5.0 {
                TrendStrength::Strong
            } else if spread_pct > 2.0 {
                TrendStrength::Moderate
            } else {
                TrendStrength::Weak
            }
        }
    };

    Some(TrendSignal {
        direction,
        strength,
    })
}

fn momentum_signal(rsi: f64) -> Momentum {
    let signal = if rsi > 70.0 {
        MomentumSignal::Overbought
    } else if rsi > 60.0 {
        MomentumSignal::OverboughtLeaning
    } else if rsi < 30.0 {
        MomentumSignal::Oversold
    } else {
        MomentumSignal::Neutral
    };
    Momentum { rsi, signal }
}

fn ma_signals(close: Option<f64>, row: &IndicatorRow) -> MovingAverageSignals {
    let position = |ma: Option<f64>| -> Option<MaPosition> {
        let close = close?;
        let ma = ma?;
        let deadband = ma * MA_DEADBAND_PCT / 100.0;
        Some(if close > ma + deadband {
            MaPosition::Above
        } else if close < ma - deadband {
            MaPosition::Below
        } else {
            MaPosition::At
        })
    };

    let vs_ma20 = position(row.ma20);
    let vs_ma50 = position(row.ma50);
    let vs_ma200 = position(row.ma200);

    let alignment = match (vs_ma20, vs_ma50, vs_ma200) {
        (Some(MaPosition::Above), Some(MaPosition::Above), Some(MaPosition::Above)) => {
            Some(MaAlignment::Bullish)
        }
        (Some(MaPosition::Below), Some(MaPosition::Below), Some(MaPosition::Below)) => {
            Some(MaAlignment::Bearish)
        }
        (Some(_), Some(_), Some(_)) => Some(MaAlignment::Mixed),
        _ => None,
    };

    MovingAverageSignals {
        vs_ma20,
        vs_ma50,
        vs_ma200,
        alignment,
    }
}

fn support_resistance(series: &TimeSeries, index: usize) -> Option<SupportResistance> {
    if index + 1 < SIGNAL_WINDOW {
        return None;
    }
    let window = &series.points()[index + 1 - SIGNAL_WINDOW..=index];
    let close = series.points()[index].close?;

    // Close stands in for a missing low/high on partial records.
    let mut support = f64::INFINITY;
    let mut resistance = f64::NEG_INFINITY;
    for point in window {
        if let Some(low) = point.low.or(point.close) {
            support = support.min(low);
        }
        if let Some(high) = point.high.or(point.close) {
            resistance = resistance.max(high);
        }
    }
    if !support.is_finite() || !resistance.is_finite() || close <= 0.0 {
        return None;
    }

    Some(SupportResistance {
        support,
        resistance,
        support_distance_pct: (close - support) / close * 100.0,
        resistance_distance_pct: (resistance - close) / close * 100.0,
    })
}

fn volume_signal(series: &TimeSeries, index: usize) -> Option<VolumeSignal> {
    if index < SIGNAL_WINDOW {
        return None;
    }
    let current = series.points()[index].volume?;
    let trailing: Vec<f64> = series.points()[index - SIGNAL_WINDOW..index]
        .iter()
        .filter_map(|p| p.volume)
        .collect();
    if trailing.len() < SIGNAL_WINDOW {
        return None;
    }
    let avg = trailing.iter().sum::<f64>() / trailing.len() as f64;
    if avg <= 0.0 {
        return None;
    }

    let ratio = current / avg;
    let level = if ratio > 1.5 {
        VolumeLevel::High
    } else if ratio < 0.7 {
        VolumeLevel::Low
    } else {
        VolumeLevel::Normal
    };
    Some(VolumeSignal { ratio, level })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::compute_indicators;
    use crate::domain::ohlcv::PricePoint;
    use approx::assert_relative_eq;

    fn date(i: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Days::new(i)
    }

    fn full_point(i: u64, close: f64, volume: f64) -> PricePoint {
        PricePoint {
            date: date(i),
            open: Some(close),
            high: Some(close * 1.01),
            low: Some(close * 0.99),
            close: Some(close),
            volume: Some(volume),
        }
    }

    fn rising_series(len: usize) -> TimeSeries {
        let points = (0..len)
            .map(|i| full_point(i as u64, 100.0 + i as f64 * 0.8, 1000.0))
            .collect();
        TimeSeries::from_points(points).0
    }

    #[test]
    fn bullish_trend_on_steady_rise() {
        let series = rising_series(260);
        let indicators = compute_indicators(&series);
        let signals = analyze_signals(&series, &indicators, 259).unwrap();
        let trend = signals.trend.unwrap();
        assert_eq!(trend.direction, TrendDirection::Bullish);
        assert_eq!(trend.strength, TrendStrength::Strong);
        assert_eq!(signals.moving_averages.alignment, Some(MaAlignment::Bullish));
    }

    #[test]
    fn trend_unavailable_without_ma200() {
        let series = rising_series(60);
        let indicators = compute_indicators(&series);
        let signals = analyze_signals(&series, &indicators, 59).unwrap();
        assert_eq!(signals.trend, None);
        assert_eq!(signals.moving_averages.alignment, None);
        assert!(signals.moving_averages.vs_ma20.is_some());
    }

    #[test]
    fn momentum_categories() {
        assert_eq!(momentum_signal(75.0).signal, MomentumSignal::Overbought);
        assert_eq!(
            momentum_signal(65.0).signal,
            MomentumSignal::OverboughtLeaning
        );
        assert_eq!(momentum_signal(25.0).signal, MomentumSignal::Oversold);
        assert_eq!(momentum_signal(50.0).signal, MomentumSignal::Neutral);
    }

    #[test]
    fn deadband_reports_at_near_ma() {
        let points = (0..30)
            .map(|i| full_point(i as u64, 100.0, 1000.0))
            .collect();
        let series = TimeSeries::from_points(points).0;
        let indicators = compute_indicators(&series);
        let signals = analyze_signals(&series, &indicators, 29).unwrap();
        assert_eq!(signals.moving_averages.vs_ma20, Some(MaPosition::At));
    }

    #[test]
    fn support_resistance_over_trailing_window() {
        let series = rising_series(40);
        let indicators = compute_indicators(&series);
        let signals = analyze_signals(&series, &indicators, 39).unwrap();
        let sr = signals.support_resistance.unwrap();
        // Window is days 20..=39; lows are close * 0.99.
        let expected_support = (100.0 + 20.0 * 0.8) * 0.99;
        let expected_resistance = (100.0 + 39.0 * 0.8) * 1.01;
        assert_relative_eq!(sr.support, expected_support, epsilon = 1e-9);
        assert_relative_eq!(sr.resistance, expected_resistance, epsilon = 1e-9);
        assert!(sr.support_distance_pct > 0.0);
        assert!(sr.resistance_distance_pct > 0.0);
    }

    #[test]
    fn support_resistance_needs_full_window() {
        let series = rising_series(10);
        let indicators = compute_indicators(&series);
        let signals = analyze_signals(&series, &indicators, 9).unwrap();
        assert_eq!(signals.support_resistance, None);
    }

    #[test]
    fn volume_levels_classified() {
        let mut points: Vec<PricePoint> = (0..SIGNAL_WINDOW)
            .map(|i| full_point(i as u64, 100.0, 1000.0))
            .collect();
        points.push(full_point(SIGNAL_WINDOW as u64, 100.0, 2000.0));
        points.push(full_point(SIGNAL_WINDOW as u64 + 1, 100.0, 500.0));
        let series = TimeSeries::from_points(points).0;
        let indicators = compute_indicators(&series);

        let high = analyze_signals(&series, &indicators, SIGNAL_WINDOW).unwrap();
        assert_eq!(high.volume.unwrap().level, VolumeLevel::High);

        let low = analyze_signals(&series, &indicators, SIGNAL_WINDOW + 1).unwrap();
        assert_eq!(low.volume.unwrap().level, VolumeLevel::Low);
    }

    #[test]
    fn out_of_range_index_yields_none() {
        let series = rising_series(5);
        let indicators = compute_indicators(&series);
        assert!(analyze_signals(&series, &indicators, 5).is_none());
    }
}
