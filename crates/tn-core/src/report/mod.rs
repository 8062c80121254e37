//! Verdict report generation

pub mod json;
pub mod text;

use crate::detection::{ScanResult, ScanType};
use crate::{CoreError, CoreResult};
use std::str::FromStr;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    Json,
    #[default]
    Text,
}

impl FromStr for ReportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "text" | "txt" => Ok(ReportFormat::Text),
            other => Err(CoreError::Config(format!("unknown report format '{}'", other))),
        }
    }
}

/// Generate report in specified format
pub fn generate_report(
    scan_type: ScanType,
    result: &ScanResult,
    format: ReportFormat,
) -> CoreResult<String> {
    match format {
        ReportFormat::Json => json::generate(scan_type, result),
        ReportFormat::Text => Ok(text::generate(scan_type, result)),
    }
}
