//! Pull machine-readable payloads out of the query tool's human-oriented output.

use crate::error::QueryError;
use serde_json::Value;
use std::borrow::Cow;
use tracing::debug;

/// Markers of the advisory line the tool prints ahead of its payload.
const ADVISORY_MARKERS: [&str; 2] = ["»", "update available"];

/// Keep everything from the first line containing a comma onward, dropping blank lines.
///
/// Anything before that (progress text, warnings) is noise.
pub fn extract_csv(output: &str) -> String {
    let mut csv = String::new();
    let mut in_csv = false;
    for line in output.lines() {
        if !in_csv && !line.contains(',') {
            continue;
        }
        in_csv = true;
        if !line.trim().is_empty() {
            debug!(line = line, "CSV data");
            csv.push_str(line);
            csv.push('\n');
        }
    }
    csv
}

fn is_advisory(line: &str) -> bool {
    ADVISORY_MARKERS.iter().any(|marker| line.contains(*marker))
}

/// Drop every advisory banner line, wherever the tool placed it.
pub fn strip_advisory_banner(output: &str) -> Cow<'_, str> {
    if !is_advisory(output) {
        return Cow::Borrowed(output);
    }
    let kept: Vec<&str> = output.lines().filter(|line| !is_advisory(line)).collect();
    Cow::Owned(kept.join("\n"))
}

/// Parse `result.totalSize` from a JSON count response.
pub fn parse_total_size(output: &str) -> Result<u64, QueryError> {
    let payload = strip_advisory_banner(output);
    let decode_error = |message: String| QueryError::Decode {
        message,
        output: output.to_string(),
    };

    let json: Value = serde_json::from_str(&payload)
        .map_err(|e| decode_error(format!("JSON unmarshal failed: {}", e)))?;
    let result = json
        .get("result")
        .and_then(Value::as_object)
        .ok_or_else(|| decode_error("'result' field is not a map".to_string()))?;
    let total_size = result
        .get("totalSize")
        .and_then(Value::as_f64)
        .ok_or_else(|| decode_error("'totalSize' field is not a number".to_string()))?;
    if total_size < 0.0 {
        return Err(decode_error(format!("'totalSize' is negative: {}", total_size)));
    }
    Ok(total_size as u64)
}
