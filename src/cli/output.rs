//! CLI output: error mapping and run summary formatting.

use crate::audit::AuditReport;
use crate::error::AuditError;

/// Map domain/service errors to a single line-oriented message for stderr.
pub fn map_error(e: &AuditError) -> String {
    format!("[ERROR] {}", e)
}

/// Render the run summary in `format` ("text" or "json").
pub fn format_run_summary(report: &AuditReport, format: &str) -> Result<String, AuditError> {
    match format {
        "json" => serde_json::to_string_pretty(report)
            .map_err(|e| AuditError::Runtime(format!("Failed to encode summary: {}", e))),
        "text" => Ok(format_run_summary_text(report)),
        other => Err(AuditError::ConfigError(format!(
            "Invalid output format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

fn format_run_summary_text(report: &AuditReport) -> String {
    let mut s = format!(
        "Audit of {}:\n  Deleted fields: {}\n  Skipped rows: {}\n  Records counted: {}",
        report.org, report.eligible_rows, report.skipped_rows, report.records
    );

    if let Some(export) = &report.export {
        s.push_str(&format!(
            "\n\nExported to {} ({} total results, {} new)\n  BLAKE3: {}",
            export.path.display(),
            export.total_results,
            export.new_results,
            export.checksum
        ));
        s.push_str("\n\nCurrent counts:");
        for entry in &export.current_counts {
            s.push_str(&format!("\n  {}  {}", entry.date, entry.count));
        }
    }

    if !report.failures.is_empty() {
        s.push_str(&format!("\n\nFailed branches ({}):", report.failures.len()));
        for failure in &report.failures {
            s.push_str(&format!(
                "\n  - [{}] {}: {}",
                failure.stage, failure.subject, failure.message
            ));
        }
    }
    s
}
