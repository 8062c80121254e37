//! JSON report generation

use crate::detection::{ScanResult, ScanType};
use crate::{CoreError, CoreResult};
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    scan_type: ScanType,
    label: &'static str,
    #[serde(flatten)]
    result: &'a ScanResult,
}

pub fn generate(scan_type: ScanType, result: &ScanResult) -> CoreResult<String> {
    let report = JsonReport {
        scan_type,
        label: scan_type.label(),
        result,
    };
    serde_json::to_string_pretty(&report)
        .map_err(|e| CoreError::Serialization(format!("JSON serialization failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_report_fields() {
        let report = generate(ScanType::Image, &ScanResult::threat("Fake bank login")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();

        assert_eq!(value["scan_type"], "image");
        assert_eq!(value["label"], "Image Scan");
        assert_eq!(value["status"], "threat");
        assert_eq!(value["message"], "Fake bank login");
        assert!(value.get("completed_at").is_some());
    }

    #[test]
    fn test_pending_report_has_no_timestamp() {
        let report = generate(ScanType::Url, &ScanResult::pending()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["status"], "pending");
        assert!(value.get("completed_at").is_none());
    }
}
