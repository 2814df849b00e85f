//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::context_csv_adapter::ContextCsvAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::analysis::{run_analysis, AnalysisConfig, AnalysisReport};
use crate::domain::config_validation::{
    factor_config_from, score_config_from, simulation_config_from, validate_data_config,
};
use crate::domain::error::FactorcastError;
use crate::domain::ohlcv::MIN_LOOKBACK;
use crate::domain::simulate::{simulate, PathStrategy, SimulationParams};
use log::warn;
use crate::ports::context_port::ContextPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "factorcast", about = "Factor-based probability scoring and price estimation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Full analysis: indicators, factors, scores, signals, patterns, estimate
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        /// Output path; "-" for stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit JSON instead of a text summary
        #[arg(long)]
        json: bool,
        /// Fail on the first skipped input record instead of reporting it
        #[arg(long)]
        strict: bool,
    },
    /// Per-day score table for the trailing days
    Score {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        /// How many trailing days to print
        #[arg(long, default_value_t = 10)]
        last: usize,
    },
    /// Project a multi-day price path
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        #[arg(long)]
        horizon: Option<usize>,
        /// Use the Monte-Carlo ensemble instead of the deterministic path
        #[arg(long)]
        monte_carlo: bool,
        /// Override the baseline price (defaults to the latest close)
        #[arg(long)]
        price: Option<f64>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show available symbols or a symbol's data range
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Analyze {
            config,
            code,
            output,
            json,
            strict,
        } => run_analyze(&config, &code, output.as_ref(), json, strict),
        Command::Score { config, code, last } => run_score(&config, &code, last),
        Command::Simulate {
            config,
            code,
            horizon,
            monte_carlo,
            price,
        } => run_simulate(&config, &code, horizon, monte_carlo, price),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, code } => run_info(&config, code.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, FactorcastError> {
    FileConfigAdapter::from_file(path).map_err(|e| FactorcastError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn build_report(path: &PathBuf, code: &str) -> Result<AnalysisReport, FactorcastError> {
    let config = load_config(path)?;
    let csv_dir = validate_data_config(&config)?;
    let analysis_config = AnalysisConfig {
        factor: factor_config_from(&config)?,
        score: score_config_from(&config)?,
    };

    let data = CsvAdapter::new(PathBuf::from(&csv_dir));
    let context = ContextCsvAdapter::new(PathBuf::from(&csv_dir));

    let (series, skipped) = data.fetch_series(code)?;
    if series.is_empty() {
        return Err(FactorcastError::NoData {
            code: code.to_string(),
        });
    }
    if series.len() < MIN_LOOKBACK {
        warn!(
            "{code}: {} points, below the recommended lookback of {MIN_LOOKBACK}",
            series.len()
        );
    }
    let flags = context.flags_for(code)?;
    Ok(run_analysis(code, &series, skipped, &flags, &analysis_config))
}

fn run_analyze(
    path: &PathBuf,
    code: &str,
    output: Option<&PathBuf>,
    json: bool,
    strict: bool,
) -> Result<(), FactorcastError> {
    let report = build_report(path, code)?;
    if strict {
        if let Some(bad) = report.skipped.first() {
            return Err(FactorcastError::InvalidRecord {
                line: bad.line.unwrap_or(0),
                reason: bad.reason.to_string(),
            });
        }
    }
    let target = output
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    if json {
        JsonReportAdapter.write(&report, &target)
    } else {
        TextReportAdapter.write(&report, &target)
    }
}

fn run_score(path: &PathBuf, code: &str, last: usize) -> Result<(), FactorcastError> {
    let report = build_report(path, code)?;
    let start = report.scores.len().saturating_sub(last);
    println!("{:<12} {:>7} {:>18} {:>11}", "date", "score", "prediction", "confidence");
    for score in &report.scores[start..] {
        println!(
            "{:<12} {:>7.3} {:>18} {:>11.0}",
            score.date.to_string(),
            score.score,
            score.prediction.label(),
            score.confidence
        );
    }
    Ok(())
}

fn run_simulate(
    path: &PathBuf,
    code: &str,
    horizon: Option<usize>,
    monte_carlo: bool,
    price: Option<f64>,
) -> Result<(), FactorcastError> {
    let config = load_config(path)?;
    let (default_horizon, runs, seed) = simulation_config_from(&config)?;
    let csv_dir = validate_data_config(&config)?;
    let analysis_config = AnalysisConfig {
        factor: factor_config_from(&config)?,
        score: score_config_from(&config)?,
    };

    let data = CsvAdapter::new(PathBuf::from(&csv_dir));
    let context = ContextCsvAdapter::new(PathBuf::from(&csv_dir));
    let (series, skipped) = data.fetch_series(code)?;
    // The recommended lookback is a hard floor for forward projection.
    if series.len() < MIN_LOOKBACK {
        return Err(FactorcastError::InsufficientHistory {
            code: code.to_string(),
            points: series.len(),
            minimum: MIN_LOOKBACK,
        });
    }
    let flags = context.flags_for(code)?;
    let report = run_analysis(code, &series, skipped, &flags, &analysis_config);

    let baseline = match price.or_else(|| series.last().and_then(|p| p.close)) {
        Some(p) => p,
        None => {
            return Err(FactorcastError::NoData {
                code: code.to_string(),
            })
        }
    };

    let last_factors = report
        .factors
        .last()
        .cloned()
        .ok_or_else(|| FactorcastError::NoData {
            code: code.to_string(),
        })?;
    let signals = report
        .signals
        .clone()
        .ok_or_else(|| FactorcastError::NoData {
            code: code.to_string(),
        })?;

    let params = SimulationParams {
        symbol: code.to_string(),
        initial_price: baseline,
        horizon_days: horizon.unwrap_or(default_horizon),
        factor_weights: None,
        threshold: None,
        factor_states: None,
    };
    let strategy = if monte_carlo {
        PathStrategy::MonteCarlo { runs, seed }
    } else {
        PathStrategy::Deterministic
    };

    let result = simulate(
        &params,
        &analysis_config.score,
        &last_factors,
        &signals,
        &report.calibration,
        &strategy,
    )?;

    println!(
        "{} from {:.2} over {} days (score {:.3})",
        result.symbol, result.initial_price, result.horizon_days, result.score.score
    );
    println!("{:>4} {:>10} {:>10} {:>10}", "day", "low", "median", "high");
    for day in &result.days {
        println!(
            "{:>4} {:>10.2} {:>10.2} {:>10.2}",
            day.day, day.lower, day.median, day.upper
        );
    }
    Ok(())
}

fn run_validate(path: &PathBuf) -> Result<(), FactorcastError> {
    let config = load_config(path)?;
    validate_data_config(&config)?;
    factor_config_from(&config)?;
    score_config_from(&config)?;
    simulation_config_from(&config)?;
    println!("configuration OK");
    Ok(())
}

fn run_info(path: &PathBuf, code: Option<&str>) -> Result<(), FactorcastError> {
    let config = load_config(path)?;
    let csv_dir = validate_data_config(&config)?;
    let data = CsvAdapter::new(PathBuf::from(csv_dir));

    match code {
        Some(code) => match data.data_range(code)? {
            Some((first, last, count)) => {
                println!("{code}: {count} points from {first} to {last}");
            }
            None => println!("{code}: no data"),
        },
        None => {
            for code in data.list_codes()? {
                println!("{code}");
            }
        }
    }
    Ok(())
}
