//! Historical pattern similarity search.
//!
//! Compares the target day's active predictive factors against up to three
//! years of prior days, ranks the overlap, and derives a historical-accuracy
//! statistic from the realized moves of the retained matches.

use crate::domain::factor::{Factor, FactorSet};
use chrono::NaiveDate;
use serde::Serialize;

/// Maximum history scanned, in trading days (~3 years).
pub const PATTERN_LOOKBACK: usize = 756;
/// Minimum factor-overlap similarity for a match to be retained.
pub const MIN_SIMILARITY: f64 = 0.5;
/// Matches kept after ranking.
pub const MAX_MATCHES: usize = 5;

/// One prior day's worth of inputs for the search.
#[derive(Debug, Clone)]
pub struct HistoricalDay {
    pub date: NaiveDate,
    pub factors: FactorSet,
    pub score: f64,
    /// Realized day-over-day percent change; days without one cannot be
    /// judged and are skipped.
    pub pct_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatch {
    pub date: NaiveDate,
    pub score: f64,
    pub price_change: f64,
    pub factors: Vec<Factor>,
    pub similarity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Breakout,
    Continuation,
    Reversal,
    Consolidation,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternRecognition {
    /// Best matches, descending by similarity, at most [`MAX_MATCHES`].
    pub matches: Vec<PatternMatch>,
    /// Share (0-100) of retained matches with a positive realized change.
    /// Undefined when no matches are retained.
    pub historical_accuracy: Option<f64>,
    pub pattern: PatternType,
}

/// `|intersection| / max(|target|, |hist|, 1)` over active predictive factors.
pub fn similarity(target: &FactorSet, other: &FactorSet) -> f64 {
    let target_active: Vec<Factor> = target.active_predictive().collect();
    let other_count = other.active_predictive_count();
    let intersection = target_active
        .iter()
        .filter(|&&f| other.is_active(f))
        .count();
    intersection as f64 / target_active.len().max(other_count).max(1) as f64
}

/// Search `history` (only its trailing [`PATTERN_LOOKBACK`] days) for days
/// similar to the target, and classify the target day's pattern from its
/// factors and percent change.
pub fn match_patterns(
    target: &FactorSet,
    target_pct_change: Option<f64>,
    history: &[HistoricalDay],
) -> PatternRecognition {
    let window_start = history.len().saturating_sub(PATTERN_LOOKBACK);

    let mut candidates: Vec<PatternMatch> = history[window_start..]
        .iter()
        .filter_map(|day| {
            let pct = day.pct_change?;
            let sim = similarity(target, &day.factors);
            if sim < MIN_SIMILARITY {
                return None;
            }
            Some(PatternMatch {
                date: day.date,
                score: day.score,
                price_change: pct,
                factors: day.factors.active().collect(),
                similarity: sim,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.date.cmp(&a.date))
    });
    candidates.truncate(MAX_MATCHES);

    let historical_accuracy = if candidates.is_empty() {
        None
    } else {
        let positive = candidates.iter().filter(|m| m.price_change > 0.0).count();
        Some(positive as f64 / candidates.len() as f64 * 100.0)
    };

    PatternRecognition {
        matches: candidates,
        historical_accuracy,
        pattern: classify_pattern(target, target_pct_change),
    }
}

/// Deterministic rule over MA-break factors, the volume spike, and the sign
/// and magnitude of the day's percent change.
pub fn classify_pattern(factors: &FactorSet, pct_change: Option<f64>) -> PatternType {
    let Some(pct) = pct_change else {
        return PatternType::Unknown;
    };
    let ma_break = factors.is_active(Factor::BreakMa50) || factors.is_active(Factor::BreakMa200);
    let volume_spike = factors.is_active(Factor::VolumeSpike);

    if ma_break && pct > 0.0 {
        PatternType::Breakout
    } else if pct < -2.0 && volume_spike {
        PatternType::Reversal
    } else if pct.abs() < 1.0 && !volume_spike {
        PatternType::Consolidation
    } else if factors.active().next().is_some() {
        PatternType::Continuation
    } else {
        PatternType::Unknown
    }
}
