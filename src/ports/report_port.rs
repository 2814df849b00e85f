//! Report generation port trait.

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::FactorcastError;

/// Port for rendering an analysis report.
pub trait ReportPort {
    fn write(&self, report: &AnalysisReport, output_path: &str) -> Result<(), FactorcastError>;
}
