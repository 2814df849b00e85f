//! Concrete adapter implementations for ports.

pub mod context_csv_adapter;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_report_adapter;
pub mod text_report_adapter;
