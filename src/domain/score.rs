//! Weighted factor scoring and probability classification.
//!
//! `score = Σ weight[f] for active predictive f`, normalized against the
//! maximum attainable weighted sum (floored at 1.0, so weight tables summing
//! to less than one are read as absolute contributions). For a fixed
//! [`FactorSet`] and [`ScoreConfig`] the output is pure and reproducible.

use crate::domain::error::FactorcastError;
use crate::domain::factor::{Factor, FactorSet};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Prediction {
    HighProbability,
    Moderate,
    LowProbability,
}

impl Prediction {
    pub fn label(self) -> &'static str {
        match self {
            Prediction::HighProbability => "HIGH_PROBABILITY",
            Prediction::Moderate => "MODERATE",
            Prediction::LowProbability => "LOW_PROBABILITY",
        }
    }
}

/// Weight/threshold policy for one scoring run. Construct via [`ScoreConfig::new`];
/// invalid weights or thresholds are rejected up front, fatal to that run only.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreConfig {
    weights: BTreeMap<Factor, f64>,
    threshold: f64,
}

impl ScoreConfig {
    pub fn new(weights: BTreeMap<Factor, f64>, threshold: f64) -> Result<Self, FactorcastError> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(FactorcastError::ConfigInvalid {
                section: "scoring".to_string(),
                key: "threshold".to_string(),
                reason: "threshold must be strictly between 0 and 1".to_string(),
            });
        }
        for (&factor, &weight) in &weights {
            if !factor.is_predictive() {
                return Err(FactorcastError::ConfigInvalid {
                    section: "scoring".to_string(),
                    key: factor.as_str().to_string(),
                    reason: "result factors cannot carry a scoring weight".to_string(),
                });
            }
            if !(weight > 0.0) || !weight.is_finite() {
                return Err(FactorcastError::ConfigInvalid {
                    section: "scoring".to_string(),
                    key: factor.as_str().to_string(),
                    reason: "weights must be positive and finite".to_string(),
                });
            }
        }
        Ok(Self { weights, threshold })
    }

    /// Documented default policy: context and trend-break factors dominate,
    /// weights sum to 1.0, threshold 0.6.
    pub fn default_config() -> Self {
        let weights = BTreeMap::from([
            (Factor::VolumeSpike, 0.15),
            (Factor::BreakMa50, 0.15),
            (Factor::BreakMa200, 0.15),
            (Factor::RsiOver60, 0.10),
            (Factor::ShortCovering, 0.05),
            (Factor::EarningsWindow, 0.05),
            (Factor::MarketUp, 0.10),
            (Factor::SectorUp, 0.10),
            (Factor::MacroTailwind, 0.10),
            (Factor::NewsPositive, 0.05),
        ]);
        Self {
            weights,
            threshold: 0.6,
        }
    }

    /// Rebuild the policy with caller-supplied overrides, revalidating.
    pub fn with_overrides(
        &self,
        weights: Option<BTreeMap<Factor, f64>>,
        threshold: Option<f64>,
    ) -> Result<Self, FactorcastError> {
        Self::new(
            weights.unwrap_or_else(|| self.weights.clone()),
            threshold.unwrap_or(self.threshold),
        )
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn weight(&self, factor: Factor) -> f64 {
        self.weights.get(&factor).copied().unwrap_or(0.0)
    }

    /// Maximum attainable weighted sum, floored at 1.0.
    fn max_attainable(&self) -> f64 {
        self.weights.values().sum::<f64>().max(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyScore {
    pub date: NaiveDate,
    /// Normalized weighted factor sum in [0, 1].
    pub score: f64,
    pub prediction: Prediction,
    /// 0-100 scale, independent of `score`.
    pub confidence: f64,
    pub above_threshold: bool,
}

/// Score one day's factors under a policy. Deterministic: no randomness,
/// identical inputs produce identical output.
pub fn score_day(factors: &FactorSet, config: &ScoreConfig) -> DailyScore {
    let raw: f64 = factors
        .active_predictive()
        .map(|f| config.weight(f))
        .sum();
    let score = (raw / config.max_attainable()).clamp(0.0, 1.0);

    let threshold = config.threshold();
    let (prediction, above_threshold) = if score >= threshold {
        (Prediction::HighProbability, true)
    } else if score >= threshold * 0.5 {
        (Prediction::Moderate, false)
    } else {
        (Prediction::LowProbability, false)
    };

    DailyScore {
        date: factors.date,
        score,
        prediction,
        confidence: confidence_for(score, factors.active_predictive_count()),
        above_threshold,
    }
}

/// Confidence on a 0-100 scale: `50 + 40*score + 2*min(count, 5)`, clamped.
///
/// Monotonic in both the score and the number of corroborating predictive
/// factors; the top of the scale is only reachable when several factors
/// agree. The exact curve is tunable and covered by tests.
pub fn confidence_for(score: f64, active_predictive: usize) -> f64 {
    let base = 50.0 + 40.0 * score + 2.0 * active_predictive.min(5) as f64;
    base.clamp(0.0, 100.0)
}
