//! apicov - API coverage reporting
//!
//! Batch tools over a coverage.py JSON report:
//! - Per-module aggregation under a root prefix (`api/` by default)
//! - PR vs. main diff rendered as a Markdown table
//! - Opt-in threshold / regression enforcement
//! - Shield badge JSON per allow-listed module

pub mod badge;
pub mod config;
pub mod coverage;
pub mod error;

pub use badge::{emit_badges, Badge, BadgeColor};
pub use config::Config;
pub use coverage::{
    aggregate, diff, evaluate, parse_coverage, percent, render_markdown, CoverageReport,
    DiffReport, DiffRow, Enforcement, ModuleStats, Percent, Verdict,
};
pub use error::CoverageError;
