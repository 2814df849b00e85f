//! Multi-day price path simulation.
//!
//! Repeatedly applies the single-day estimation model across a requested
//! horizon under caller-supplied factor/weight/threshold overrides. Two
//! path-aggregation strategies: the default deterministic extrapolation
//! with volatility-widened bands, and a seeded Monte-Carlo ensemble.

use crate::domain::error::FactorcastError;
use crate::domain::estimator::{estimate_future_price, Calibration, MAX_DAILY_MOVE_PCT};
use crate::domain::factor::{Factor, FactorSet};
use crate::domain::score::{score_day, DailyScore, ScoreConfig};
use crate::domain::signal::TechnicalSignals;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeMap;

/// z-value for the ~80% band used by the deterministic strategy.
const BAND_Z: f64 = 1.28;

/// Caller-facing scenario parameters.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub symbol: String,
    pub initial_price: f64,
    pub horizon_days: usize,
    /// Overrides for the scoring weight table; `None` keeps the base config.
    pub factor_weights: Option<BTreeMap<Factor, f64>>,
    pub threshold: Option<f64>,
    /// Pins the factor set for the whole horizon; `None` carries the last
    /// observed factors forward.
    pub factor_states: Option<Vec<Factor>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathStrategy {
    /// Repeated deterministic single-day extrapolation (the default).
    Deterministic,
    /// Ensemble of noisy paths from a seeded generator.
    MonteCarlo { runs: usize, seed: u64 },
}

impl Default for PathStrategy {
    fn default() -> Self {
        PathStrategy::Deterministic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedDay {
    /// 1-based day offset from the baseline.
    pub day: usize,
    pub mean: f64,
    pub median: f64,
    /// Lower confidence bound (10th percentile for Monte-Carlo).
    pub lower: f64,
    /// Upper confidence bound (90th percentile for Monte-Carlo).
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub symbol: String,
    pub initial_price: f64,
    pub horizon_days: usize,
    /// Scenario score the path was driven by.
    pub score: DailyScore,
    pub days: Vec<ProjectedDay>,
}

/// Run a scenario. Configuration problems (bad overrides, non-positive
/// price, zero horizon) abort the run; everything else is deterministic
/// for a fixed strategy and seed.
pub fn simulate(
    params: &SimulationParams,
    base_config: &ScoreConfig,
    last_factors: &FactorSet,
    signals: &TechnicalSignals,
    calibration: &Calibration,
    strategy: &PathStrategy,
) -> Result<SimulationResult, FactorcastError> {
    if !(params.initial_price > 0.0) {
        return Err(FactorcastError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "initial_price".to_string(),
            reason: "initial price must be positive".to_string(),
        });
    }
    if params.horizon_days == 0 {
        return Err(FactorcastError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "horizon_days".to_string(),
            reason: "horizon must be at least one day".to_string(),
        });
    }
    if let PathStrategy::MonteCarlo { runs: 0, .. } = strategy {
        return Err(FactorcastError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "runs".to_string(),
            reason: "ensemble needs at least one run".to_string(),
        });
    }

    let config = base_config.with_overrides(params.factor_weights.clone(), params.threshold)?;
    let factors = match &params.factor_states {
        Some(states) => {
            let mut pinned = FactorSet::new(last_factors.date);
            for &factor in states {
                pinned.set(factor, true);
            }
            pinned
        }
        None => last_factors.clone(),
    };
    let score = score_day(&factors, &config);

    let days = match strategy {
        PathStrategy::Deterministic => {
            deterministic_path(params, &score, signals, calibration)
        }
        PathStrategy::MonteCarlo { runs, seed } => {
            monte_carlo_path(params, &score, signals, calibration, *runs, *seed)
        }
    };

    Ok(SimulationResult {
        symbol: params.symbol.clone(),
        initial_price: params.initial_price,
        horizon_days: params.horizon_days,
        score,
        days,
    })
}

fn deterministic_path(
    params: &SimulationParams,
    score: &DailyScore,
    signals: &TechnicalSignals,
    calibration: &Calibration,
) -> Vec<ProjectedDay> {
    let mut days = Vec::with_capacity(params.horizon_days);
    let mut price = params.initial_price;

    for day in 1..=params.horizon_days {
        let estimate = estimate_future_price(price, score, signals, calibration);
        price = estimate.close;
        // Band widens with the square root of elapsed days.
        let half_width = price * calibration.volatility / 100.0 * BAND_Z * (day as f64).sqrt();
        days.push(ProjectedDay {
            day,
            mean: price,
            median: price,
            lower: (price - half_width).max(0.0),
            upper: price + half_width,
        });
    }

    days
}

fn monte_carlo_path(
    params: &SimulationParams,
    score: &DailyScore,
    signals: &TechnicalSignals,
    calibration: &Calibration,
    runs: usize,
    seed: u64,
) -> Vec<ProjectedDay> {
    // The expected per-day move is price-independent; derive it once.
    let expected = estimate_future_price(params.initial_price, score, signals, calibration)
        .expected_change_pct;

    let mut rng = StdRng::seed_from_u64(seed);
    // per_day[d] collects every run's price at day d+1.
    let mut per_day: Vec<Vec<f64>> = vec![Vec::with_capacity(runs); params.horizon_days];

    for _ in 0..runs {
        let mut price = params.initial_price;
        for day_prices in per_day.iter_mut() {
            let change = (expected + calibration.volatility * gaussian(&mut rng))
                .clamp(-MAX_DAILY_MOVE_PCT, MAX_DAILY_MOVE_PCT);
            price = (price * (1.0 + change / 100.0)).max(0.01);
            day_prices.push(price);
        }
    }

    per_day
        .into_iter()
        .enumerate()
        .map(|(i, mut prices)| {
            prices.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let mean = prices.iter().sum::<f64>() / prices.len() as f64;
            ProjectedDay {
                day: i + 1,
                mean,
                median: percentile(&prices, 0.5),
                lower: percentile(&prices, 0.1),
                upper: percentile(&prices, 0.9),
            }
        })
        .collect()
}

/// Approximate standard normal via the sum of 12 uniforms.
fn gaussian(rng: &mut StdRng) -> f64 {
    (0..12).map(|_| rng.gen_range(0.0..1.0)).sum::<f64>() - 6.0
}

/// Nearest-rank percentile over an ascending-sorted slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let idx = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted[idx]
}
