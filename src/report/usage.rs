//! `TEMPLATE_USAGE.md`: the placeholders a template user still has to fill.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::validate::rules::placeholders::{INTENTIONAL_PLACEHOLDER, UNEXPECTED_PLACEHOLDER};
use crate::validate::ValidationFinding;

/// File name of the usage document at the target root.
pub const USAGE_FILE: &str = "TEMPLATE_USAGE.md";

/// Placeholder name to the files containing it, both sorted.
pub type PlaceholderFiles = BTreeMap<String, BTreeSet<String>>;

/// Placeholders left in the generated tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderUsage {
    /// Allowlisted placeholders.
    pub intentional: PlaceholderFiles,
    /// Placeholders outside the allowlist.
    pub unexpected: PlaceholderFiles,
}

impl PlaceholderUsage {
    /// Collect placeholders from validation findings.
    pub fn from_findings(findings: &[ValidationFinding]) -> Self {
        let mut usage = Self::default();

        for finding in findings {
            let group = match finding.rule_id.as_str() {
                INTENTIONAL_PLACEHOLDER => &mut usage.intentional,
                UNEXPECTED_PLACEHOLDER => &mut usage.unexpected,
                _ => continue,
            };
            if let (Some(name), Some(path)) = (&finding.placeholder, &finding.path) {
                group
                    .entry(name.clone())
                    .or_default()
                    .insert(path.clone());
            }
        }

        usage
    }

    pub fn is_empty(&self) -> bool {
        self.intentional.is_empty() && self.unexpected.is_empty()
    }
}

fn write_group(out: &mut String, heading: &str, group: &PlaceholderFiles) {
    for (name, paths) in group {
        let _ = writeln!(out, "{} `{{{{{}}}}}`\n", heading, name);
        for path in paths {
            let _ = writeln!(out, "- `{}`", path);
        }
        let _ = writeln!(out);
    }
}

/// Render the usage document.
pub fn render_usage(findings: &[ValidationFinding]) -> String {
    let usage = PlaceholderUsage::from_findings(findings);
    let mut out = String::new();

    let _ = writeln!(out, "# Template Usage\n");
    if usage.is_empty() {
        let _ = writeln!(out, "This template has no placeholders to fill in.");
        return out;
    }

    let _ = writeln!(
        out,
        "Replace each placeholder below before using this template.\n"
    );
    write_group(&mut out, "##", &usage.intentional);

    if !usage.unexpected.is_empty() {
        let _ = writeln!(out, "## Placeholders outside the allowlist\n");
        let _ = writeln!(
            out,
            "These were not expected in the files below. Fill them in, or add them \
             to `placeholder_allowlist` if they are meant for the template user.\n"
        );
        write_group(&mut out, "###", &usage.unexpected);
    }

    out
}

/// Write the usage document to `<target_root>/TEMPLATE_USAGE.md`.
pub fn write_usage(target_root: &Path, findings: &[ValidationFinding]) -> Result<PathBuf> {
    let path = target_root.join(USAGE_FILE);
    let mut tmp = tempfile::NamedTempFile::new_in(target_root)?;
    tmp.write_all(render_usage(findings).as_bytes())?;
    tmp.persist(&path)
        .map_err(|e| crate::error::DecouplerError::Io(e.error))?;
    Ok(path)
}
