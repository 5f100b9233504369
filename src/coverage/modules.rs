//! Per-module aggregation of file coverage

use std::collections::BTreeMap;

use super::{CoverageReport, Percent};

/// Summed line counts for one module
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleCounts {
    pub covered: u64,
    pub total: u64,
}

impl ModuleCounts {
    pub fn percent(&self) -> Percent {
        Percent::of(self.covered, self.total)
    }
}

/// Module name to percentage, rounded to two decimals
pub type PercentMap = BTreeMap<String, Percent>;

/// Coverage counts grouped by module name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleStats {
    modules: BTreeMap<String, ModuleCounts>,
}

impl ModuleStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts for `module`, inserting zeroes on first access
    pub fn entry_mut(&mut self, module: &str) -> &mut ModuleCounts {
        self.modules.entry(module.to_string()).or_default()
    }

    pub fn get(&self, module: &str) -> Option<&ModuleCounts> {
        self.modules.get(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Iterate modules in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleCounts)> {
        self.modules.iter().map(|(name, counts)| (name.as_str(), counts))
    }

    pub fn percentages(&self) -> PercentMap {
        self.modules
            .iter()
            .map(|(name, counts)| (name.clone(), counts.percent()))
            .collect()
    }
}

/// Module name for `path` under `root_prefix`, if it has one
///
/// The module is the path segment directly after the prefix's own segments,
/// so `api/controllers/a.py` under `api/` belongs to `controllers`.
pub fn module_of<'a>(path: &'a str, root_prefix: &str) -> Option<&'a str> {
    if !path.starts_with(root_prefix) {
        return None;
    }
    let depth = root_prefix.trim_end_matches('/').split('/').count();
    path.split('/').nth(depth)
}

/// Sum covered / total lines per module for every file under `root_prefix`
pub fn aggregate(report: &CoverageReport, root_prefix: &str) -> ModuleStats {
    let mut stats = ModuleStats::new();

    for (path, entry) in &report.files {
        let Some(module) = module_of(path, root_prefix) else {
            continue;
        };
        let counts = stats.entry_mut(module);
        counts.covered += entry.summary.covered_lines;
        counts.total += entry.summary.num_statements;
    }

    tracing::debug!(root_prefix, modules = stats.len(), "aggregated module coverage");
    stats
}

/// Like [`aggregate`], restricted to `modules`
///
/// Every requested module is present in the result, with zero counts when
/// the report has no files for it.
pub fn aggregate_selected<S: AsRef<str>>(
    report: &CoverageReport,
    root_prefix: &str,
    modules: &[S],
) -> ModuleStats {
    let all = aggregate(report, root_prefix);
    let mut stats = ModuleStats::new();

    for module in modules {
        let module = module.as_ref();
        let counts = stats.entry_mut(module);
        if let Some(found) = all.get(module) {
            *counts = *found;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> CoverageReport {
        let mut report = CoverageReport::default();
        report.insert_file("api/controllers/a.py", 8, 10);
        report.insert_file("api/controllers/console/b.py", 2, 10);
        report.insert_file("api/services/s.py", 0, 5);
        report.insert_file("api/core/empty.py", 0, 0);
        report.insert_file("web/app/page.ts", 100, 100);
        report.insert_file("tests/api/controllers/test_a.py", 50, 50);
        report
    }

    #[test]
    fn test_module_of() {
        assert_eq!(module_of("api/controllers/a.py", "api/"), Some("controllers"));
        assert_eq!(module_of("api/app.py", "api/"), Some("app.py"));
        assert_eq!(module_of("web/app.ts", "api/"), None);
        assert_eq!(module_of("src/app/core/x.py", "src/app/"), Some("core"));
        assert_eq!(module_of("src/app", "src/app/"), None);
    }

    #[test]
    fn test_aggregate_groups_by_module() {
        let stats = aggregate(&sample_report(), "api/");

        assert_eq!(stats.len(), 3);
        assert_eq!(stats.get("controllers"), Some(&ModuleCounts { covered: 10, total: 20 }));
        assert_eq!(stats.get("services"), Some(&ModuleCounts { covered: 0, total: 5 }));
        assert_eq!(stats.get("core"), Some(&ModuleCounts { covered: 0, total: 0 }));
    }

    #[test]
    fn test_files_outside_prefix_are_ignored() {
        let report = sample_report();
        let stats = aggregate(&report, "api/");

        let module_total: u64 = stats.iter().map(|(_, c)| c.total).sum();
        let expected: u64 = report
            .files
            .iter()
            .filter(|(path, _)| path.starts_with("api/") && path.split('/').count() >= 2)
            .map(|(_, e)| e.summary.num_statements)
            .sum();

        assert_eq!(module_total, expected);
        assert_eq!(module_total, 25);
    }

    #[test]
    fn test_percentages() {
        let percents = aggregate(&sample_report(), "api/").percentages();

        assert_eq!(percents["controllers"], Percent::Measured(50.0));
        assert_eq!(percents["services"], Percent::Measured(0.0));
        // no measured statements reads as 0, not 100
        assert_eq!(percents["core"], Percent::Unmeasured);
        assert_eq!(percents["core"].value(), 0.0);
    }

    #[test]
    fn test_aggregate_selected_fills_missing_modules() {
        let stats = aggregate_selected(&sample_report(), "api/", &["controllers", "models"]);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats.get("controllers"), Some(&ModuleCounts { covered: 10, total: 20 }));
        assert_eq!(stats.get("models"), Some(&ModuleCounts::default()));
        assert!(stats.get("services").is_none());
    }

    #[test]
    fn test_empty_report() {
        let stats = aggregate(&CoverageReport::default(), "api/");
        assert!(stats.is_empty());
    }
}
