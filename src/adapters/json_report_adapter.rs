//! JSON report adapter.

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::FactorcastError;
use crate::ports::report_port::ReportPort;
use serde_json::json;
use std::fs;

pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn render(report: &AnalysisReport) -> serde_json::Value {
        let skipped: Vec<String> = report
            .skipped
            .iter()
            .map(|r| match r.line {
                Some(line) => format!("line {line}: {}", r.reason),
                None => r.reason.to_string(),
            })
            .collect();

        json!({
            "code": report.code,
            "skipped": skipped,
            "indicators": report.indicators,
            "factors": report.factors,
            "scores": report.scores,
            "signals": report.signals,
            "patterns": report.patterns,
            "calibration": report.calibration,
            "estimate": report.estimate,
        })
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, report: &AnalysisReport, output_path: &str) -> Result<(), FactorcastError> {
        let value = Self::render(report);
        let rendered = serde_json::to_string_pretty(&value)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        if output_path == "-" {
            println!("{rendered}");
        } else {
            fs::write(output_path, rendered)?;
        }
        Ok(())
    }
}
