//! Full analysis pipeline for one symbol.
//!
//! Wires the engine components in dependency order and carries per-record
//! skip reports alongside the best-effort output, so a handful of bad input
//! rows never sinks a run.

use crate::domain::error::SkippedRecord;
use crate::domain::estimator::{estimate_future_price, Calibration, PriceEstimate};
use crate::domain::factor::{extract_factors, ContextFlags, FactorConfig, FactorSet};
use crate::domain::indicator::{compute_indicators, IndicatorRow};
use crate::domain::ohlcv::TimeSeries;
use crate::domain::pattern::{match_patterns, HistoricalDay, PatternRecognition};
use crate::domain::score::{score_day, DailyScore, ScoreConfig};
use crate::domain::signal::{analyze_signals, TechnicalSignals};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Configuration for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub factor: FactorConfig,
    pub score: ScoreConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            factor: FactorConfig::default(),
            score: ScoreConfig::default_config(),
        }
    }
}

/// Everything the pipeline derives from one series snapshot.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub code: String,
    pub skipped: Vec<SkippedRecord>,
    pub indicators: Vec<IndicatorRow>,
    pub factors: Vec<FactorSet>,
    pub scores: Vec<DailyScore>,
    /// Signal bundle for the latest day; `None` on an empty series.
    pub signals: Option<TechnicalSignals>,
    /// Pattern search for the latest day against its prior history.
    pub patterns: Option<PatternRecognition>,
    /// Calibration backing the estimate.
    pub calibration: Calibration,
    /// Next-day estimate from the latest close; `None` without one.
    pub estimate: Option<PriceEstimate>,
}

/// Run the whole pipeline over a series snapshot. Pure: recomputes
/// everything from the inputs, holds no state between calls.
pub fn run_analysis(
    code: &str,
    series: &TimeSeries,
    skipped: Vec<SkippedRecord>,
    context: &HashMap<NaiveDate, ContextFlags>,
    config: &AnalysisConfig,
) -> AnalysisReport {
    let indicators = compute_indicators(series);
    let factors = extract_factors(series, &indicators, context, &config.factor);
    let scores: Vec<DailyScore> = factors
        .iter()
        .map(|set| score_day(set, &config.score))
        .collect();

    let last = series.len().checked_sub(1);
    let signals = last.and_then(|i| analyze_signals(series, &indicators, i));

    let patterns = last.map(|i| {
        let history: Vec<HistoricalDay> = (0..i)
            .map(|j| HistoricalDay {
                date: factors[j].date,
                factors: factors[j].clone(),
                score: scores[j].score,
                pct_change: indicators[j].pct_change,
            })
            .collect();
        match_patterns(&factors[i], indicators[i].pct_change, &history)
    });

    let pairs: Vec<(f64, f64)> = indicators
        .iter()
        .zip(&scores)
        .filter_map(|(row, score)| row.pct_change.map(|pct| (score.score, pct)))
        .collect();
    let calibration = Calibration::from_pairs(&pairs);

    let estimate = last.and_then(|i| {
        let baseline = series.points()[i].close?;
        let signals = signals.as_ref()?;
        Some(estimate_future_price(
            baseline,
            &scores[i],
            signals,
            &calibration,
        ))
    });

    AnalysisReport {
        code: code.to_string(),
        skipped,
        indicators,
        factors,
        scores,
        signals,
        patterns,
        calibration,
        estimate,
    }
}
