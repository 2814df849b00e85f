//! Configuration validation and builders.
//!
//! Turns the untyped [`ConfigPort`] view of an INI file into validated
//! domain configuration. All violations surface as `ConfigInvalid` or
//! `ConfigMissing` before any computation starts; a bad config is fatal to
//! that run only.

use crate::domain::error::FactorcastError;
use crate::domain::factor::{Factor, FactorConfig};
use crate::domain::score::ScoreConfig;
use crate::ports::config_port::ConfigPort;
use std::collections::BTreeMap;

/// Build and validate factor-extraction thresholds from `[factors]`.
pub fn factor_config_from(config: &dyn ConfigPort) -> Result<FactorConfig, FactorcastError> {
    let defaults = FactorConfig::default();
    let built = FactorConfig {
        volume_spike_multiplier: positive_double(
            config,
            "factors",
            "volume_spike_multiplier",
            defaults.volume_spike_multiplier,
        )?,
        min_break_pct: positive_double(config, "factors", "min_break_pct", defaults.min_break_pct)?,
        strong_move_pct: positive_double(
            config,
            "factors",
            "strong_move_pct",
            defaults.strong_move_pct,
        )?,
    };
    Ok(built)
}

/// Build and validate the scoring policy from `[scoring]`.
///
/// `threshold` plus one key per factor name; factors without a key keep the
/// default weight table only when *no* weight keys are present, otherwise
/// the table is exactly the keys given. Unknown or result-factor keys are
/// rejected rather than ignored.
pub fn score_config_from(config: &dyn ConfigPort) -> Result<ScoreConfig, FactorcastError> {
    if config
        .get_string("scoring", Factor::StrongMove.as_str())
        .is_some()
    {
        return Err(FactorcastError::ConfigInvalid {
            section: "scoring".to_string(),
            key: Factor::StrongMove.as_str().to_string(),
            reason: "result factors cannot carry a scoring weight".to_string(),
        });
    }

    let mut weights = BTreeMap::new();
    for factor in Factor::ALL.into_iter().filter(|f| f.is_predictive()) {
        if let Some(raw) = config.get_string("scoring", factor.as_str()) {
            let weight: f64 =
                raw.trim()
                    .parse()
                    .map_err(|_| FactorcastError::ConfigInvalid {
                        section: "scoring".to_string(),
                        key: factor.as_str().to_string(),
                        reason: format!("not a number: {raw:?}"),
                    })?;
            weights.insert(factor, weight);
        }
    }

    let default = ScoreConfig::default_config();
    let threshold = match config.get_string("scoring", "threshold") {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| FactorcastError::ConfigInvalid {
                section: "scoring".to_string(),
                key: "threshold".to_string(),
                reason: format!("not a number: {raw:?}"),
            })?,
        None => default.threshold(),
    };

    if weights.is_empty() {
        default.with_overrides(None, Some(threshold))
    } else {
        ScoreConfig::new(weights, threshold)
    }
}

/// Validate `[data]`: the CSV directory is required for any CLI run.
pub fn validate_data_config(config: &dyn ConfigPort) -> Result<String, FactorcastError> {
    match config.get_string("data", "csv_dir") {
        Some(dir) if !dir.trim().is_empty() => Ok(dir),
        _ => Err(FactorcastError::ConfigMissing {
            section: "data".to_string(),
            key: "csv_dir".to_string(),
        }),
    }
}

/// Validate `[simulation]` and return (horizon_days, runs, seed).
pub fn simulation_config_from(
    config: &dyn ConfigPort,
) -> Result<(usize, usize, u64), FactorcastError> {
    let horizon = config.get_int("simulation", "horizon_days", 5);
    if horizon < 1 {
        return Err(FactorcastError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "horizon_days".to_string(),
            reason: "horizon must be at least one day".to_string(),
        });
    }
    let runs = config.get_int("simulation", "runs", 500);
    if runs < 1 {
        return Err(FactorcastError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "runs".to_string(),
            reason: "runs must be at least 1".to_string(),
        });
    }
    let seed = config.get_int("simulation", "seed", 0);
    if seed < 0 {
        return Err(FactorcastError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "seed".to_string(),
            reason: "seed must be non-negative".to_string(),
        });
    }
    Ok((horizon as usize, runs as usize, seed as u64))
}

fn positive_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, FactorcastError> {
    let value = config.get_double(section, key, default);
    if value <= 0.0 || !value.is_finite() {
        return Err(FactorcastError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be positive"),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn factor_defaults_apply_when_section_absent() {
        let config = make_config("[data]\ncsv_dir = /tmp\n");
        let built = factor_config_from(&config).unwrap();
        assert_eq!(built, FactorConfig::default());
    }

    #[test]
    fn factor_overrides_are_read() {
        let config = make_config("[factors]\nvolume_spike_multiplier = 2.0\n");
        let built = factor_config_from(&config).unwrap();
        assert_eq!(built.volume_spike_multiplier, 2.0);
        assert_eq!(built.min_break_pct, FactorConfig::default().min_break_pct);
    }

    #[test]
    fn non_positive_multiplier_rejected() {
        let config = make_config("[factors]\nvolume_spike_multiplier = 0\n");
        let err = factor_config_from(&config).unwrap_err();
        assert!(matches!(
            err,
            FactorcastError::ConfigInvalid { key, .. } if key == "volume_spike_multiplier"
        ));
    }

    #[test]
    fn scoring_defaults_when_no_weights_given() {
        let config = make_config("[scoring]\nthreshold = 0.45\n");
        let built = score_config_from(&config).unwrap();
        assert_eq!(built.threshold(), 0.45);
        assert_eq!(
            built.weight(Factor::VolumeSpike),
            ScoreConfig::default_config().weight(Factor::VolumeSpike)
        );
    }

    #[test]
    fn explicit_weights_replace_the_table() {
        let config = make_config("[scoring]\nthreshold = 0.45\nvolume_spike = 0.5\n");
        let built = score_config_from(&config).unwrap();
        assert_eq!(built.weight(Factor::VolumeSpike), 0.5);
        assert_eq!(built.weight(Factor::MarketUp), 0.0);
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        let config = make_config("[scoring]\nthreshold = 1.2\n");
        assert!(score_config_from(&config).is_err());
    }

    #[test]
    fn non_numeric_weight_rejected() {
        let config = make_config("[scoring]\nvolume_spike = lots\n");
        let err = score_config_from(&config).unwrap_err();
        assert!(matches!(
            err,
            FactorcastError::ConfigInvalid { key, .. } if key == "volume_spike"
        ));
    }

    #[test]
    fn strong_move_weight_rejected() {
        let config = make_config("[scoring]\nstrong_move = 0.2\n");
        let err = score_config_from(&config).unwrap_err();
        assert!(matches!(
            err,
            FactorcastError::ConfigInvalid { key, .. } if key == "strong_move"
        ));
    }

    #[test]
    fn missing_csv_dir_is_config_missing() {
        let config = make_config("[scoring]\nthreshold = 0.5\n");
        let err = validate_data_config(&config).unwrap_err();
        assert!(matches!(
            err,
            FactorcastError::ConfigMissing { key, .. } if key == "csv_dir"
        ));
    }

    #[test]
    fn simulation_defaults_and_bounds() {
        let config = make_config("[simulation]\nhorizon_days = 10\n");
        assert_eq!(simulation_config_from(&config).unwrap(), (10, 500, 0));

        let config = make_config("[simulation]\nhorizon_days = 0\n");
        assert!(simulation_config_from(&config).is_err());

        let config = make_config("[simulation]\nruns = -5\n");
        assert!(simulation_config_from(&config).is_err());
    }
}
