//! Plain-text report adapter for terminal output.

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::FactorcastError;
use crate::domain::signal::{TrendDirection, TrendStrength};
use crate::ports::report_port::ReportPort;
use std::fmt::Write as _;
use std::fs;

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn render(report: &AnalysisReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== {} ===", report.code);
        let _ = writeln!(out, "days analyzed: {}", report.scores.len());

        if let Some(score) = report.scores.last() {
            let _ = writeln!(
                out,
                "latest: {} score {:.3} ({}) confidence {:.0}",
                score.date,
                score.score,
                score.prediction.label(),
                score.confidence
            );
        }

        if let Some(signals) = &report.signals {
            if let Some(trend) = &signals.trend {
                let _ = writeln!(
                    out,
                    "trend: {} ({})",
                    direction_label(trend.direction),
                    strength_label(trend.strength)
                );
            }
            if let Some(momentum) = &signals.momentum {
                let _ = writeln!(out, "rsi: {:.1}", momentum.rsi);
            }
            if let Some(sr) = &signals.support_resistance {
                let _ = writeln!(
                    out,
                    "support {:.2} ({:.1}% below) / resistance {:.2} ({:.1}% above)",
                    sr.support,
                    sr.support_distance_pct,
                    sr.resistance,
                    sr.resistance_distance_pct
                );
            }
        }

        if let Some(patterns) = &report.patterns {
            let _ = writeln!(out, "pattern: {:?}", patterns.pattern);
            match patterns.historical_accuracy {
                Some(acc) => {
                    let _ = writeln!(
                        out,
                        "historical matches: {} (accuracy {:.0}%)",
                        patterns.matches.len(),
                        acc
                    );
                }
                None => {
                    let _ = writeln!(out, "historical matches: none");
                }
            }
        }

        if let Some(estimate) = &report.estimate {
            let _ = writeln!(
                out,
                "next-day estimate: O {:.2} H {:.2} L {:.2} C {:.2} ({:+.2}%)",
                estimate.open,
                estimate.high,
                estimate.low,
                estimate.close,
                estimate.expected_change_pct
            );
        }

        if !report.skipped.is_empty() {
            let _ = writeln!(out, "skipped records: {}", report.skipped.len());
            for record in &report.skipped {
                match record.line {
                    Some(line) => {
                        let _ = writeln!(out, "  line {line}: {}", record.reason);
                    }
                    None => {
                        let _ = writeln!(out, "  {}", record.reason);
                    }
                }
            }
        }

        out
    }
}

fn direction_label(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Bullish => "bullish",
        TrendDirection::Bearish => "bearish",
        TrendDirection::Neutral => "neutral",
    }
}

fn strength_label(strength: TrendStrength) -> &'static str {
    match strength {
        TrendStrength::Strong => "strong",
        TrendStrength::Moderate => "moderate",
        TrendStrength::Weak => "weak",
    }
}

impl ReportPort for TextReportAdapter {
    fn write(&self, report: &AnalysisReport, output_path: &str) -> Result<(), FactorcastError> {
        let rendered = Self::render(report);
        if output_path == "-" {
            print!("{rendered}");
        } else {
            fs::write(output_path, rendered)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{run_analysis, AnalysisConfig};
    use crate::domain::error::{SkipReason, SkippedRecord};
    use crate::domain::ohlcv::{PricePoint, TimeSeries};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    #[test]
    fn renders_summary_with_skips() {
        let points = (0..30)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Days::new(i);
                PricePoint::close_only(date, 100.0 + i as f64 * 0.2)
            })
            .collect();
        let series = TimeSeries::from_points(points).0;
        let skipped = vec![SkippedRecord {
            line: Some(7),
            date: None,
            reason: SkipReason::UnparseableDate("bogus".to_string()),
        }];
        let report = run_analysis(
            "ACME",
            &series,
            skipped,
            &HashMap::new(),
            &AnalysisConfig::default(),
        );
        let text = TextReportAdapter::render(&report);
        assert!(text.contains("=== ACME ==="));
        assert!(text.contains("days analyzed: 30"));
        assert!(text.contains("skipped records: 1"));
        assert!(text.contains("line 7"));
    }
}
