//! coverage.py JSON report loader

use std::fs;
use std::path::Path;

use super::CoverageReport;
use crate::error::{CoverageError, Result};

/// Load a coverage.py JSON report (`coverage json`)
pub fn load_json(path: &Path) -> Result<CoverageReport> {
    let content = fs::read_to_string(path).map_err(|e| CoverageError::io(path, e))?;
    parse_json_str(&content, path)
}

/// Parse coverage.py JSON content from a string
///
/// Only the presence and type of `files.*.summary.{covered_lines,num_statements}`
/// and `totals.percent_covered` are checked; anything else in the document is
/// ignored.
pub fn parse_json_str(content: &str, origin: &Path) -> Result<CoverageReport> {
    let report: CoverageReport =
        serde_json::from_str(content).map_err(|e| CoverageError::malformed(origin, e))?;

    tracing::debug!(
        path = %origin.display(),
        files = report.files.len(),
        "loaded coverage report"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const REPORT: &str = r#"{
        "meta": {"version": "7.4.0", "format": 2},
        "files": {
            "api/controllers/a.py": {
                "executed_lines": [1, 2, 3],
                "summary": {"covered_lines": 8, "num_statements": 10, "percent_covered": 80.0}
            },
            "tests/test_a.py": {
                "summary": {"covered_lines": 3, "num_statements": 3}
            }
        },
        "totals": {"covered_lines": 11, "num_statements": 13, "percent_covered": 84.615384}
    }"#;

    #[test]
    fn test_parse_coverage_py_json() {
        let report = parse_json_str(REPORT, Path::new("coverage.json")).unwrap();

        assert_eq!(report.files.len(), 2);
        let a = &report.files["api/controllers/a.py"].summary;
        assert_eq!(a.covered_lines, 8);
        assert_eq!(a.num_statements, 10);
        assert!((report.totals.percent_covered - 84.615384).abs() < 1e-9);
    }

    #[test]
    fn test_missing_totals_is_malformed() {
        let err = parse_json_str(r#"{"files": {}}"#, Path::new("pr.json")).unwrap_err();
        match err {
            CoverageError::MalformedReport { path, reason } => {
                assert_eq!(path, Path::new("pr.json"));
                assert!(reason.contains("totals"), "reason: {}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_files_is_malformed() {
        let err = parse_json_str(r#"{"totals": {"percent_covered": 1.0}}"#, Path::new("x"))
            .unwrap_err();
        assert!(matches!(err, CoverageError::MalformedReport { .. }));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = parse_json_str("not json", Path::new("x")).unwrap_err();
        assert!(matches!(err, CoverageError::MalformedReport { .. }));
    }

    #[test]
    fn test_missing_summary_field_is_malformed() {
        let content = r#"{
            "files": {"api/core/x.py": {"summary": {"covered_lines": 1}}},
            "totals": {"percent_covered": 10.0}
        }"#;
        let err = parse_json_str(content, Path::new("x")).unwrap_err();
        assert!(matches!(err, CoverageError::MalformedReport { .. }));
    }

    #[test]
    fn test_load_json_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(REPORT.as_bytes()).unwrap();

        let report = load_json(file.path()).unwrap();
        assert_eq!(report.files.len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_json(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CoverageError::Io { .. }));
    }
}
