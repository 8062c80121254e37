//! Plain text report generation

use crate::detection::{ScanResult, ScanType};

pub fn generate(scan_type: ScanType, result: &ScanResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n{}\n", scan_type.label(), "=".repeat(50)));

    match result.headline() {
        Some(headline) => {
            out.push_str(&format!("{}\n", headline));
            if !result.message.is_empty() {
                out.push_str(&format!("  {}\n", result.message));
            }
        }
        None => out.push_str("No verdict\n"),
    }

    if let Some(completed_at) = result.completed_at {
        out.push_str(&format!("\nCompleted: {}\n", completed_at.to_rfc3339()));
    }

    out
}
