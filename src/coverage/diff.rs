//! PR vs. main coverage comparison and Markdown rendering

use std::collections::BTreeSet;
use std::fmt::Write;

use super::{aggregate, format_percent, round2, CoverageReport, Percent, PercentMap};

/// One module's coverage on both sides of the comparison
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    pub module: String,
    pub pr_percent: Percent,
    pub main_percent: Percent,
    pub delta: Percent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffReport {
    pub overall_pr: f64,
    pub overall_main: f64,
    pub overall_delta: f64,
    pub rows: Vec<DiffRow>,
    /// At least one module lost coverage
    pub regression: bool,
}

impl DiffReport {
    pub fn below_threshold(&self, threshold: f64) -> bool {
        self.overall_pr < threshold
    }
}

/// Rows for every module on either side, in name order
///
/// A module missing from one side reads as unmeasured there.
pub fn diff_rows<'a>(
    pr: &'a PercentMap,
    main: &'a PercentMap,
) -> impl Iterator<Item = DiffRow> + 'a {
    let names: BTreeSet<&String> = pr.keys().chain(main.keys()).collect();

    names.into_iter().map(move |module| {
        let pr_percent = pr.get(module).copied().unwrap_or_default();
        let main_percent = main.get(module).copied().unwrap_or_default();
        DiffRow {
            module: module.clone(),
            pr_percent,
            main_percent,
            delta: pr_percent.minus(main_percent),
        }
    })
}

/// Compare a PR snapshot against the main-branch snapshot
///
/// Overall figures come straight from each report's `totals`, which also
/// cover files outside `root_prefix`, so they need not match the module rows.
pub fn diff(pr: &CoverageReport, main: &CoverageReport, root_prefix: &str) -> DiffReport {
    let pr_modules = aggregate(pr, root_prefix).percentages();
    let main_modules = aggregate(main, root_prefix).percentages();

    let overall_pr = round2(pr.totals.percent_covered);
    let overall_main = round2(main.totals.percent_covered);

    let rows: Vec<DiffRow> = diff_rows(&pr_modules, &main_modules).collect();
    let regression = rows.iter().any(|row| row.delta.value() < 0.0);

    DiffReport {
        overall_pr,
        overall_main,
        overall_delta: round2(overall_pr - overall_main),
        rows,
        regression,
    }
}

/// Render the report as a Markdown summary plus per-module table
pub fn render_markdown(report: &DiffReport) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "### API Coverage Report\n");
    let _ = writeln!(out, "**Overall Coverage**");
    let _ = writeln!(out, "- PR: {}%", format_percent(report.overall_pr));
    let _ = writeln!(out, "- Main: {}%", format_percent(report.overall_main));
    let _ = writeln!(out, "- Delta: {}%\n", format_percent(report.overall_delta));

    let _ = writeln!(out, "| Module | PR | Main | Δ |");
    let _ = writeln!(out, "|--------|----|------|---|");

    for row in &report.rows {
        let _ = writeln!(
            out,
            "| {} | {}% | {}% | {}% |",
            row.module, row.pr_percent, row.main_percent, row.delta
        );
    }

    out
}
