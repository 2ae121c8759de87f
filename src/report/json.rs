//! JSON report formatter.
//!
//! Formats a run as machine-readable JSON for CI integration.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Report, ReportFormatter};
use crate::validate::{SeverityCounts, ValidationFinding};

/// Formats reports as JSON.
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    manifest: JsonManifest<'a>,
    findings: &'a [ValidationFinding],
    counts: SeverityCounts,
    success: bool,
}

#[derive(Serialize)]
struct JsonManifest<'a> {
    source_root: &'a Path,
    target_root: &'a Path,
    generated_at: DateTime<Utc>,
    tool_version: &'a str,
    dry_run: bool,
    files_written: usize,
    files_failed: usize,
    strategies: BTreeMap<&'static str, usize>,
}

impl JsonFormatter {
    /// Create a new JSON formatter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format<W: Write>(&self, report: &Report<'_>, writer: &mut W) -> std::io::Result<()> {
        let manifest = report.manifest;
        let output = JsonOutput {
            manifest: JsonManifest {
                source_root: &manifest.source_root,
                target_root: &manifest.target_root,
                generated_at: manifest.generated_at,
                tool_version: &manifest.tool_version,
                dry_run: manifest.dry_run,
                files_written: manifest.written().count(),
                files_failed: manifest.failed_count(),
                strategies: manifest
                    .strategy_counts()
                    .into_iter()
                    .map(|(s, n)| (s.as_str(), n))
                    .collect(),
            },
            findings: report.findings,
            counts: SeverityCounts::of(report.findings),
            success: report.is_success(),
        };

        let json = serde_json::to_string_pretty(&output)?;
        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Strategy;
    use crate::transfer::{GenerationManifest, ManifestEntry};

    fn manifest() -> GenerationManifest {
        let mut m = GenerationManifest::new("/src", "/out", Utc::now(), true);
        m.set_entries(vec![
            ManifestEntry::written("app/", "app/.gitkeep", Strategy::StructureOnly, b"", false),
            ManifestEntry::failed("a.md", "a.md", Strategy::Genericize, "boom"),
        ]);
        m
    }

    #[test]
    fn output_is_valid_json() {
        let m = manifest();
        let findings = vec![ValidationFinding::fatal("path-failed", "boom").with_path("a.md")];
        let output = JsonFormatter::new().render(&Report::new(&m, &findings));

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["success"], false);
        assert_eq!(parsed["counts"]["fatal"], 1);
        assert_eq!(parsed["findings"][0]["rule_id"], "path-failed");
        assert_eq!(parsed["findings"][0]["path"], "a.md");
        assert_eq!(parsed["manifest"]["dry_run"], true);
        assert_eq!(parsed["manifest"]["files_written"], 1);
        assert_eq!(parsed["manifest"]["files_failed"], 1);
        assert_eq!(parsed["manifest"]["strategies"]["structure_only"], 1);
    }

    #[test]
    fn empty_findings_succeed() {
        let m = manifest();
        let output = JsonFormatter::new().render(&Report::new(&m, &[]));
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["findings"].as_array().unwrap().len(), 0);
    }
}
