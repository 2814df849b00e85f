//! Boolean factor extraction.
//!
//! A [`FactorSet`] maps a fixed enum of factor names to booleans for one
//! date. Unset factors are `false`, never missing-data errors. Contextual
//! factors (market/sector direction, earnings window, macro/news sentiment,
//! short covering) are injected, not computed here.

use crate::domain::indicator::IndicatorRow;
use crate::domain::ohlcv::TimeSeries;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// Trailing window used for the average-volume baseline.
pub const VOLUME_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    VolumeSpike,
    BreakMa50,
    BreakMa200,
    RsiOver60,
    ShortCovering,
    EarningsWindow,
    MarketUp,
    SectorUp,
    MacroTailwind,
    NewsPositive,
    StrongMove,
}

impl Factor {
    pub const COUNT: usize = 11;

    pub const ALL: [Factor; Factor::COUNT] = [
        Factor::VolumeSpike,
        Factor::BreakMa50,
        Factor::BreakMa200,
        Factor::RsiOver60,
        Factor::ShortCovering,
        Factor::EarningsWindow,
        Factor::MarketUp,
        Factor::SectorUp,
        Factor::MacroTailwind,
        Factor::NewsPositive,
        Factor::StrongMove,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Factor::VolumeSpike => "volume_spike",
            Factor::BreakMa50 => "break_ma50",
            Factor::BreakMa200 => "break_ma200",
            Factor::RsiOver60 => "rsi_over_60",
            Factor::ShortCovering => "short_covering",
            Factor::EarningsWindow => "earnings_window",
            Factor::MarketUp => "market_up",
            Factor::SectorUp => "sector_up",
            Factor::MacroTailwind => "macro_tailwind",
            Factor::NewsPositive => "news_positive",
            Factor::StrongMove => "strong_move",
        }
    }

    /// Parse a factor name, rejecting unknown keys.
    pub fn parse(name: &str) -> Option<Factor> {
        Factor::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    fn index(self) -> usize {
        Factor::ALL.iter().position(|&f| f == self).unwrap_or(0)
    }

    /// StrongMove records a realized outcome, not a predictive input; it is
    /// excluded from scoring and pattern similarity to avoid leakage.
    pub fn is_predictive(self) -> bool {
        !matches!(self, Factor::StrongMove)
    }
}

/// Per-date factor flags for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorSet {
    pub date: NaiveDate,
    flags: [bool; Factor::COUNT],
}

impl FactorSet {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            flags: [false; Factor::COUNT],
        }
    }

    pub fn set(&mut self, factor: Factor, value: bool) {
        self.flags[factor.index()] = value;
    }

    pub fn with(mut self, factor: Factor) -> Self {
        self.set(factor, true);
        self
    }

    pub fn is_active(&self, factor: Factor) -> bool {
        self.flags[factor.index()]
    }

    pub fn active(&self) -> impl Iterator<Item = Factor> + '_ {
        Factor::ALL.iter().copied().filter(|&f| self.is_active(f))
    }

    /// Active factors excluding result factors, i.e. the scoring input.
    pub fn active_predictive(&self) -> impl Iterator<Item = Factor> + '_ {
        self.active().filter(|f| f.is_predictive())
    }

    pub fn active_predictive_count(&self) -> usize {
        self.active_predictive().count()
    }
}

impl Serialize for FactorSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("FactorSet", 2)?;
        state.serialize_field("date", &self.date)?;
        let active: Vec<&'static str> = self.active().map(Factor::as_str).collect();
        state.serialize_field("active", &active)?;
        state.end()
    }
}

/// Externally supplied per-date context. Absent dates mean all false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextFlags {
    pub market_up: bool,
    pub sector_up: bool,
    pub earnings_window: bool,
    pub short_covering: bool,
    pub macro_tailwind: bool,
    pub news_positive: bool,
}

/// Tunable extraction thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorConfig {
    /// Volume must exceed this multiple of the trailing 20-day average.
    pub volume_spike_multiplier: f64,
    /// Minimum day gain (percent) for an MA break to count.
    pub min_break_pct: f64,
    /// Absolute percent move that marks a realized strong move.
    pub strong_move_pct: f64,
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            volume_spike_multiplier: 1.5,
            min_break_pct: 2.0,
            strong_move_pct: 5.0,
        }
    }
}

/// Derive one [`FactorSet`] per date from indicators, raw prices, and
/// injected context flags. `indicators` must be aligned with the series.
pub fn extract_factors(
    series: &TimeSeries,
    indicators: &[IndicatorRow],
    context: &HashMap<NaiveDate, ContextFlags>,
    config: &FactorConfig,
) -> Vec<FactorSet> {
    let points = series.points();
    let mut out = Vec::with_capacity(points.len());

    // Trailing window of *prior* days' volumes, capped at VOLUME_WINDOW.
    let mut volumes: VecDeque<f64> = VecDeque::with_capacity(VOLUME_WINDOW);
    let mut volume_sum = 0.0;

    for (i, point) in points.iter().enumerate() {
        let row = indicators.get(i);
        let mut set = FactorSet::new(point.date);

        if let (Some(volume), true) = (point.volume, volumes.len() == VOLUME_WINDOW) {
            let avg = volume_sum / VOLUME_WINDOW as f64;
            set.set(
                Factor::VolumeSpike,
                avg > 0.0 && volume > config.volume_spike_multiplier * avg,
            );
        }

        if let Some(row) = row {
            if let (Some(close), Some(pct)) = (point.close, row.pct_change) {
                if pct >= config.min_break_pct {
                    if row.ma50.is_some_and(|ma| close > ma) {
                        set.set(Factor::BreakMa50, true);
                    }
                    if row.ma200.is_some_and(|ma| close > ma) {
                        set.set(Factor::BreakMa200, true);
                    }
                }
                set.set(Factor::StrongMove, pct.abs() >= config.strong_move_pct);
            }
            set.set(Factor::RsiOver60, row.rsi.is_some_and(|rsi| rsi > 60.0));
        }

        let flags = context.get(&point.date).copied().unwrap_or_default();
        set.set(Factor::ShortCovering, flags.short_covering);
        set.set(Factor::EarningsWindow, flags.earnings_window);
        set.set(Factor::MarketUp, flags.market_up);
        set.set(Factor::SectorUp, flags.sector_up);
        set.set(Factor::MacroTailwind, flags.macro_tailwind);
        set.set(Factor::NewsPositive, flags.news_positive);

        out.push(set);

        if let Some(volume) = point.volume {
            volumes.push_back(volume);
            volume_sum += volume;
            if volumes.len() > VOLUME_WINDOW {
                volume_sum -= volumes.pop_front().unwrap_or(0.0);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::compute_indicators;
    use crate::domain::ohlcv::PricePoint;

    fn date(i: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Days::new(i)
    }

    fn point(i: u64, close: f64, volume: f64) -> PricePoint {
        PricePoint {
            date: date(i),
            open: Some(close),
            high: Some(close),
            low: Some(close),
            close: Some(close),
            volume: Some(volume),
        }
    }

    fn run(points: Vec<PricePoint>, context: HashMap<NaiveDate, ContextFlags>) -> Vec<FactorSet> {
        let series = TimeSeries::from_points(points).0;
        let indicators = compute_indicators(&series);
        extract_factors(&series, &indicators, &context, &FactorConfig::default())
    }

    #[test]
    fn factor_names_round_trip() {
        for factor in Factor::ALL {
            assert_eq!(Factor::parse(factor.as_str()), Some(factor));
        }
        assert_eq!(Factor::parse("unknown_key"), None);
    }

    #[test]
    fn strong_move_is_not_predictive() {
        let set = FactorSet::new(date(0))
            .with(Factor::StrongMove)
            .with(Factor::VolumeSpike);
        assert_eq!(set.active().count(), 2);
        assert_eq!(set.active_predictive_count(), 1);
    }

    #[test]
    fn volume_spike_requires_full_trailing_window() {
        // 10 prior days is not enough: spike stays false, not an error.
        let mut points: Vec<PricePoint> = (0..10).map(|i| point(i, 100.0, 1000.0)).collect();
        points.push(point(10, 100.0, 100_000.0));
        let factors = run(points, HashMap::new());
        assert!(!factors[10].is_active(Factor::VolumeSpike));
    }

    #[test]
    fn volume_spike_fires_above_multiplier() {
        let mut points: Vec<PricePoint> = (0..VOLUME_WINDOW as u64)
            .map(|i| point(i, 100.0, 1000.0))
            .collect();
        points.push(point(VOLUME_WINDOW as u64, 100.0, 1600.0));
        points.push(point(VOLUME_WINDOW as u64 + 1, 100.0, 1400.0));
        let factors = run(points, HashMap::new());
        assert!(factors[VOLUME_WINDOW].is_active(Factor::VolumeSpike));
        assert!(!factors[VOLUME_WINDOW + 1].is_active(Factor::VolumeSpike));
    }

    #[test]
    fn break_ma50_needs_close_above_ma_and_min_gain() {
        // Flat at 100 for 50 days, then a 3% pop above the MA.
        let mut points: Vec<PricePoint> = (0..50).map(|i| point(i, 100.0, 1000.0)).collect();
        points.push(point(50, 103.0, 1000.0));
        let factors = run(points, HashMap::new());
        assert!(factors[50].is_active(Factor::BreakMa50));
        assert!(!factors[50].is_active(Factor::BreakMa200));

        // Same pop but below the minimum gain threshold.
        let mut points: Vec<PricePoint> = (0..50).map(|i| point(i, 100.0, 1000.0)).collect();
        points.push(point(50, 101.0, 1000.0));
        let factors = run(points, HashMap::new());
        assert!(!factors[50].is_active(Factor::BreakMa50));
    }

    #[test]
    fn strong_move_fires_on_large_decline_too() {
        let points = vec![point(0, 100.0, 1000.0), point(1, 94.0, 1000.0)];
        let factors = run(points, HashMap::new());
        assert!(factors[1].is_active(Factor::StrongMove));
    }

    #[test]
    fn context_flags_pass_through_per_date() {
        let mut context = HashMap::new();
        context.insert(
            date(1),
            ContextFlags {
                market_up: true,
                news_positive: true,
                ..ContextFlags::default()
            },
        );
        let points = vec![point(0, 100.0, 1000.0), point(1, 100.5, 1000.0)];
        let factors = run(points, context);
        assert!(!factors[0].is_active(Factor::MarketUp));
        assert!(factors[1].is_active(Factor::MarketUp));
        assert!(factors[1].is_active(Factor::NewsPositive));
        assert!(!factors[1].is_active(Factor::SectorUp));
    }
}
