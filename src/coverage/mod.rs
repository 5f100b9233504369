//! Coverage module
//!
//! Provides:
//! - coverage.py JSON loading
//! - LCOV loading into the same report shape
//! - Per-module aggregation under a root prefix
//! - PR vs. main diffing and Markdown rendering
//! - Threshold / regression policy

mod diff;
mod json;
mod lcov;
mod modules;
mod threshold;

pub use diff::*;
pub use json::*;
pub use lcov::*;
pub use modules::*;
pub use threshold::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{CoverageError, Result};

/// A structured coverage report keyed by file path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub files: BTreeMap<String, FileEntry>,
    pub totals: Totals,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub summary: FileSummary,
}

/// Line-coverage summary for a single file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub covered_lines: u64,
    pub num_statements: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub percent_covered: f64,
}

impl CoverageReport {
    pub fn insert_file(&mut self, path: impl Into<String>, covered_lines: u64, num_statements: u64) {
        self.files.insert(
            path.into(),
            FileEntry {
                summary: FileSummary {
                    covered_lines,
                    num_statements,
                },
            },
        );
    }
}

/// Round to two decimal places, ties to even
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Percentage of covered statements, `0.0` when nothing was measured
pub fn percent(covered: u64, total: u64) -> f64 {
    Percent::of(covered, total).value()
}

/// Shortest round-trip form with at least one decimal digit: `80.0`, `33.33`
pub fn format_percent(value: f64) -> String {
    format!("{:?}", value)
}

/// A module's coverage percentage
///
/// `Unmeasured` covers modules with no statements and modules absent from a
/// report. It counts as zero everywhere but renders as a bare `0`, while a
/// measured zero renders as `0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Percent {
    Unmeasured,
    Measured(f64),
}

impl Percent {
    pub fn of(covered: u64, total: u64) -> Self {
        if total == 0 {
            return Percent::Unmeasured;
        }
        Percent::Measured(round2(100.0 * covered as f64 / total as f64))
    }

    pub fn value(self) -> f64 {
        match self {
            Percent::Unmeasured => 0.0,
            Percent::Measured(value) => value,
        }
    }

    /// `self - other`, staying unmeasured only when both sides are
    pub fn minus(self, other: Percent) -> Percent {
        match (self, other) {
            (Percent::Unmeasured, Percent::Unmeasured) => Percent::Unmeasured,
            _ => Percent::Measured(round2(self.value() - other.value())),
        }
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::Unmeasured
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Percent::Unmeasured => f.write_str("0"),
            Percent::Measured(value) => f.write_str(&format_percent(*value)),
        }
    }
}

/// Parse coverage from a file based on format
pub fn parse_coverage(path: &Path, format: &str) -> Result<CoverageReport> {
    match format.to_lowercase().as_str() {
        "json" => load_json(path),
        "lcov" => parse_lcov(path),
        _ => Err(CoverageError::UnknownFormat(format.to_string())),
    }
}
