//! Threshold and regression policy for the diff report

use colored::Colorize;

use super::{format_percent, DiffReport};

pub const DEFAULT_THRESHOLD: f64 = 70.0;

/// Which checks turn into a failing exit; both are off unless asked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Enforcement {
    pub fail_under_threshold: bool,
    pub fail_on_regression: bool,
}

/// An enforced check that did not hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    BelowThreshold,
    Regression,
}

impl Failure {
    pub fn message(&self) -> &'static str {
        match self {
            Failure::BelowThreshold => "Overall coverage below threshold.",
            Failure::Regression => "Coverage regression detected.",
        }
    }
}

/// Outcome of applying the policy to a diff report
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub overall_pr: f64,
    pub threshold: f64,
    pub below_threshold: bool,
    pub regression: bool,
    pub failures: Vec<Failure>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn print_summary(&self) {
        let status = if self.below_threshold { "✗".red() } else { "✓".green() };
        let delta = self.overall_pr - self.threshold;
        let delta_str = if delta >= 0.0 {
            format!("+{:.1}%", delta).green()
        } else {
            format!("{:.1}%", delta).red()
        };
        eprintln!(
            "  {} Overall coverage: {}% (threshold: {}%, {}){}",
            status,
            format_percent(self.overall_pr),
            format_percent(self.threshold),
            delta_str,
            enforced_suffix(self.failures.contains(&Failure::BelowThreshold))
        );

        let status = if self.regression { "✗".red() } else { "✓".green() };
        let label = if self.regression {
            "module coverage dropped".red()
        } else {
            "no module lost coverage".green()
        };
        eprintln!(
            "  {} Regression: {}{}",
            status,
            label,
            enforced_suffix(self.failures.contains(&Failure::Regression))
        );
    }
}

fn enforced_suffix(failed: bool) -> String {
    if failed {
        format!(" {}", "[enforced]".bold())
    } else {
        String::new()
    }
}

/// Evaluate both signals and collect the failures `enforcement` turns on
pub fn evaluate(report: &DiffReport, threshold: f64, enforcement: &Enforcement) -> Verdict {
    let below_threshold = report.below_threshold(threshold);
    let regression = report.regression;

    let mut failures = Vec::new();
    if enforcement.fail_under_threshold && below_threshold {
        failures.push(Failure::BelowThreshold);
    }
    if enforcement.fail_on_regression && regression {
        failures.push(Failure::Regression);
    }

    Verdict {
        overall_pr: report.overall_pr,
        threshold,
        below_threshold,
        regression,
        failures,
    }
}

/// Failure messages in the order they are checked, one per line
pub fn render_failures(verdict: &Verdict) -> String {
    verdict
        .failures
        .iter()
        .map(|failure| format!("\n{}\n", failure.message()))
        .collect()
}
