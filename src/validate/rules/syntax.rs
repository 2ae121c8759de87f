//! JSON and YAML syntax checks.

use globset::GlobSet;
use serde::Deserialize;

use crate::config::SyntaxChecks;
use crate::error::Result;
use crate::validate::finding::{RuleId, ValidationFinding};
use crate::validate::rule::{ValidationContext, ValidationRule};

use super::compile_globset;

pub const INVALID_JSON: &str = "invalid-json";
pub const INVALID_YAML: &str = "invalid-yaml";

/// Files selected by glob must parse in their declared format.
pub struct SyntaxRule {
    json: GlobSet,
    yaml: GlobSet,
}

impl SyntaxRule {
    /// Compile the configured globs.
    pub fn new(checks: &SyntaxChecks) -> Result<Self> {
        Ok(Self {
            json: compile_globset(&checks.json)?,
            yaml: compile_globset(&checks.yaml)?,
        })
    }
}

fn check_yaml(content: &[u8]) -> std::result::Result<(), serde_yaml::Error> {
    let text = String::from_utf8_lossy(content);
    // Multi-document streams are common in manifests.
    for doc in serde_yaml::Deserializer::from_str(&text) {
        serde_yaml::Value::deserialize(doc)?;
    }
    Ok(())
}

impl ValidationRule for SyntaxRule {
    fn id(&self) -> RuleId {
        RuleId::new("syntax")
    }

    fn name(&self) -> &str {
        "Syntax"
    }

    fn description(&self) -> &str {
        "Checks that generated JSON and YAML files parse"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        for file in ctx.files {
            if self.json.is_match(&file.path) {
                if let Err(e) = serde_json::from_slice::<serde_json::Value>(&file.content) {
                    findings.push(
                        ValidationFinding::fatal(INVALID_JSON, format!("invalid JSON: {}", e))
                            .with_path(file.path.as_str()),
                    );
                }
            }
            if self.yaml.is_match(&file.path) {
                if let Err(e) = check_yaml(&file.content) {
                    findings.push(
                        ValidationFinding::fatal(INVALID_YAML, format!("invalid YAML: {}", e))
                            .with_path(file.path.as_str()),
                    );
                }
            }
        }

        findings
    }
}
