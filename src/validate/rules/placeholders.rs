//! Placeholder checks.
//!
//! A placeholder left in a genericized file means a binding was missing.
//! Anywhere else it may be intentional: scaffolds and copied templates keep
//! placeholders for the template user to fill in. The allowlist records
//! which ones are expected.

use std::collections::{BTreeMap, BTreeSet};

use globset::GlobMatcher;

use crate::classify::Strategy;
use crate::error::Result;
use crate::template::placeholder_occurrences;
use crate::validate::finding::{RuleId, ValidationFinding};
use crate::validate::rule::{ValidationContext, ValidationRule};

use super::compile_glob;

pub const UNRESOLVED_PLACEHOLDER: &str = "unresolved-placeholder";
pub const INTENTIONAL_PLACEHOLDER: &str = "intentional-placeholder";
pub const UNEXPECTED_PLACEHOLDER: &str = "unexpected-placeholder";

/// Classifies every placeholder left in the generated tree.
pub struct PlaceholderRule {
    allowlist: Vec<(GlobMatcher, BTreeSet<String>)>,
}

impl PlaceholderRule {
    /// Compile the allowlist (file glob to placeholder names).
    pub fn new(allowlist: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let allowlist = allowlist
            .iter()
            .map(|(glob, names)| {
                Ok((
                    compile_glob(glob)?.compile_matcher(),
                    names.iter().cloned().collect(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { allowlist })
    }

    fn is_allowed(&self, path: &str, name: &str) -> bool {
        self.allowlist
            .iter()
            .any(|(glob, names)| names.contains(name) && glob.is_match(path))
    }
}

fn occurrences_note(count: usize, line: usize) -> String {
    if count == 1 {
        format!("line {}", line)
    } else {
        format!("{} occurrences, first on line {}", count, line)
    }
}

impl ValidationRule for PlaceholderRule {
    fn id(&self) -> RuleId {
        RuleId::new("placeholders")
    }

    fn name(&self) -> &str {
        "Placeholders"
    }

    fn description(&self) -> &str {
        "Reports placeholders remaining in generated files"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        for file in ctx.files {
            let text = file.text();
            for (name, count, line) in placeholder_occurrences(&text) {
                let note = occurrences_note(count, line);
                let finding = if file.strategy == Strategy::Genericize {
                    ValidationFinding::fatal(
                        UNRESOLVED_PLACEHOLDER,
                        format!("placeholder {{{{{}}}}} left unresolved ({})", name, note),
                    )
                } else if self.is_allowed(&file.path, &name) {
                    ValidationFinding::info(
                        INTENTIONAL_PLACEHOLDER,
                        format!("intentional placeholder {{{{{}}}}} ({})", name, note),
                    )
                } else {
                    ValidationFinding::warning(
                        UNEXPECTED_PLACEHOLDER,
                        format!("unexpected placeholder {{{{{}}}}} ({})", name, note),
                    )
                };
                findings.push(finding.with_path(file.path.as_str()).with_placeholder(name));
            }
        }

        findings
    }
}
