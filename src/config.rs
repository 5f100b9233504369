use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::badge::{DEFAULT_BADGE_DIR, DEFAULT_MODULES};
use crate::coverage::DEFAULT_THRESHOLD;

pub const DEFAULT_ROOT_PREFIX: &str = "api/";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub coverage: CoverageSettings,
    #[serde(default)]
    pub compare: CompareSettings,
    #[serde(default)]
    pub badges: BadgeSettings,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoverageSettings {
    /// Only files under this prefix are grouped into modules
    #[serde(default = "default_root_prefix")]
    pub root_prefix: String,
    /// Input format: json (coverage.py) or lcov
    #[serde(default = "default_format")]
    pub format: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareSettings {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub fail_under_threshold: bool,
    #[serde(default)]
    pub fail_on_regression: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BadgeSettings {
    #[serde(default = "default_modules")]
    pub modules: Vec<String>,
    #[serde(default = "default_badge_dir")]
    pub output_dir: PathBuf,
}

fn default_root_prefix() -> String {
    DEFAULT_ROOT_PREFIX.to_string()
}

fn default_format() -> String {
    "json".to_string()
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_modules() -> Vec<String> {
    DEFAULT_MODULES.iter().map(|m| m.to_string()).collect()
}

fn default_badge_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BADGE_DIR)
}

impl Default for CoverageSettings {
    fn default() -> Self {
        Self {
            root_prefix: default_root_prefix(),
            format: default_format(),
        }
    }
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            fail_under_threshold: false,
            fail_on_regression: false,
        }
    }
}

impl Default for BadgeSettings {
    fn default() -> Self {
        Self {
            modules: default_modules(),
            output_dir: default_badge_dir(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.coverage.root_prefix.is_empty() {
            anyhow::bail!("coverage.root_prefix must not be empty");
        }

        if !self.coverage.root_prefix.ends_with('/') {
            anyhow::bail!(
                "coverage.root_prefix must end with '/', got '{}'",
                self.coverage.root_prefix
            );
        }

        if !(0.0..=100.0).contains(&self.compare.threshold) {
            anyhow::bail!(
                "compare.threshold must be between 0 and 100, got {}",
                self.compare.threshold
            );
        }

        if self.badges.modules.is_empty() {
            anyhow::bail!("badges.modules must list at least one module");
        }

        if let Some(bad) = self.badges.modules.iter().find(|m| m.is_empty() || m.contains('/')) {
            anyhow::bail!("Invalid badge module name '{}'", bad);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[coverage]
root_prefix = "src/app/"
format = "lcov"

[compare]
threshold = 80
fail_on_regression = true

[badges]
modules = ["core", "models"]
output_dir = "public/badges"
"#;

        let config = Config::from_toml(toml_content).unwrap();
        assert_eq!(config.coverage.root_prefix, "src/app/");
        assert_eq!(config.coverage.format, "lcov");
        assert_eq!(config.compare.threshold, 80.0);
        assert!(config.compare.fail_on_regression);
        assert!(!config.compare.fail_under_threshold);
        assert_eq!(config.badges.modules, vec!["core", "models"]);
        assert_eq!(config.badges.output_dir, PathBuf::from("public/badges"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.coverage.root_prefix, "api/");
        assert_eq!(config.coverage.format, "json");
        assert_eq!(config.compare.threshold, 70.0);
        assert!(!config.compare.fail_under_threshold);
        assert!(!config.compare.fail_on_regression);
        assert_eq!(config.badges.modules, vec!["controllers", "services", "core"]);
        assert_eq!(config.badges.output_dir, PathBuf::from("badge"));
    }

    #[test]
    fn test_validation_errors() {
        assert!(Config::from_toml("[coverage]\nroot_prefix = \"\"\n").is_err());
        assert!(Config::from_toml("[compare]\nthreshold = 120.0\n").is_err());
        assert!(Config::from_toml("[badges]\nmodules = []\n").is_err());
        assert!(Config::from_toml("[badges]\nmodules = [\"a/b\"]\n").is_err());
        assert!(Config::from_toml("[compare]\nthreshhold = 50\n").is_err());
    }

    #[test]
    fn test_root_prefix_needs_trailing_slash() {
        let err = Config::from_toml("[coverage]\nroot_prefix = \"api\"\n").unwrap_err();
        assert!(err.to_string().contains("must end with '/'"), "error: {}", err);

        let config = Config::from_toml("[coverage]\nroot_prefix = \"src/app/\"\n").unwrap();
        assert_eq!(config.coverage.root_prefix, "src/app/");
    }

    #[test]
    fn test_load_or_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("apicov.toml");

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.compare.threshold, 70.0);

        fs::write(&path, "[compare]\nthreshold = 55.5\n").unwrap();
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.compare.threshold, 55.5);
    }
}
