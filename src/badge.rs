//! Shield badge documents per module
//!
//! Writes one `{schemaVersion, label, message, color}` JSON file per
//! allow-listed module, for an endpoint-style badge renderer.

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::coverage::{aggregate_selected, CoverageReport, Percent};
use crate::error::{CoverageError, Result};

pub const DEFAULT_MODULES: [&str; 3] = ["controllers", "services", "core"];
pub const DEFAULT_BADGE_DIR: &str = "badge";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Red,
    Yellow,
    BrightGreen,
}

impl BadgeColor {
    pub fn for_percent(percent: f64) -> Self {
        if percent >= 70.0 {
            BadgeColor::BrightGreen
        } else if percent >= 60.0 {
            BadgeColor::Yellow
        } else {
            BadgeColor::Red
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    #[serde(rename = "schemaVersion")]
    pub schema_version: u32,
    pub label: String,
    pub message: String,
    pub color: BadgeColor,
}

impl Badge {
    pub fn for_module(module: &str, percent: Percent) -> Self {
        Self {
            schema_version: 1,
            label: format!("{} coverage", module),
            message: format!("{}%", percent),
            color: BadgeColor::for_percent(percent.value()),
        }
    }

    /// Single-line JSON with `", "` / `": "` separators and non-ASCII escaped
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
        self.serialize(&mut ser)?;
        Ok(buf)
    }

    /// Save badge to `path`, replacing any previous content
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json().map_err(|source| CoverageError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|e| CoverageError::io(path, e))
    }
}

/// Compact layout with a space after each `,` and `:`
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// `<module>-<branch>.json`, with path separators in the branch flattened
pub fn badge_file_name(module: &str, branch: &str) -> String {
    format!("{}-{}.json", module, branch.replace(['/', '\\'], "_"))
}

/// Write one badge per module in `modules` into `output_dir`
///
/// The set of badges depends only on `modules`; a module without files in
/// the report gets a 0% badge.
pub fn emit_badges<S: AsRef<str>>(
    report: &CoverageReport,
    root_prefix: &str,
    modules: &[S],
    branch: &str,
    output_dir: &Path,
) -> Result<BTreeSet<PathBuf>> {
    fs::create_dir_all(output_dir).map_err(|e| CoverageError::io(output_dir, e))?;

    let stats = aggregate_selected(report, root_prefix, modules);
    let mut written = BTreeSet::new();

    for (module, counts) in stats.iter() {
        let badge = Badge::for_module(module, counts.percent());
        let path = output_dir.join(badge_file_name(module, branch));
        badge.save(&path)?;

        tracing::debug!(module, path = %path.display(), message = %badge.message, "wrote badge");
        written.insert(path);
    }

    Ok(written)
}
