//! LCOV adapter producing the same report shape as coverage.py JSON

use std::fs;
use std::path::Path;

use super::{percent, CoverageReport};
use crate::error::{CoverageError, Result};

/// Parse an LCOV file
pub fn parse_lcov(path: &Path) -> Result<CoverageReport> {
    let content = fs::read_to_string(path).map_err(|e| CoverageError::io(path, e))?;
    parse_lcov_string(&content, path)
}

/// Parse LCOV content from a string
///
/// Only `SF`, `LF`, `LH` and `end_of_record` are interpreted. The overall
/// `percent_covered` is computed across every record, unrounded.
pub fn parse_lcov_string(content: &str, origin: &Path) -> Result<CoverageReport> {
    let mut report = CoverageReport::default();

    let mut current_file: Option<String> = None;
    let mut lines_found = 0u64;
    let mut lines_hit = 0u64;
    let mut total_found = 0u64;
    let mut total_hit = 0u64;

    for (number, line) in content.lines().enumerate() {
        let line = line.trim();

        if let Some(file) = line.strip_prefix("SF:") {
            current_file = Some(file.to_string());
            lines_found = 0;
            lines_hit = 0;
        } else if let Some(count) = line.strip_prefix("LF:") {
            lines_found = parse_count(count, number, origin)?;
        } else if let Some(count) = line.strip_prefix("LH:") {
            lines_hit = parse_count(count, number, origin)?;
        } else if line == "end_of_record" {
            let Some(file) = current_file.take() else {
                return Err(CoverageError::malformed(
                    origin,
                    format!("line {}: end_of_record without SF", number + 1),
                ));
            };
            total_found += lines_found;
            total_hit += lines_hit;
            report.insert_file(file, lines_hit, lines_found);
        }
    }

    if let Some(file) = current_file {
        return Err(CoverageError::malformed(
            origin,
            format!("record for {} is missing end_of_record", file),
        ));
    }

    report.totals.percent_covered = if total_found == 0 {
        0.0
    } else {
        100.0 * total_hit as f64 / total_found as f64
    };

    tracing::debug!(
        path = %origin.display(),
        files = report.files.len(),
        percent = percent(total_hit, total_found),
        "loaded lcov report"
    );

    Ok(report)
}

fn parse_count(value: &str, number: usize, origin: &Path) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|e| {
        CoverageError::malformed(origin, format!("line {}: invalid count {:?}: {}", number + 1, value, e))
    })
}
