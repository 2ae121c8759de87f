//! Configuration schema definitions for decoupler.
//!
//! These structs map to the YAML configuration format shared by the embedded
//! defaults, `<source>/.decoupler.yml` and `--config` files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classify::{Strategy, TransferRule};
use crate::error::Result;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoupleConfig {
    /// Rule table mapping source paths to strategies.
    pub rules: Vec<RuleConfig>,

    /// Directories that must exist in the generated tree.
    pub required_dirs: Vec<String>,

    /// Variables that must be bound before any transformation starts.
    pub required_variables: Vec<String>,

    /// Variable bindings declared in configuration.
    pub variables: BTreeMap<String, String>,

    /// Literal find/replace pairs applied by the genericize strategy.
    pub replacements: BTreeMap<String, String>,

    /// Source patterns never walked (same syntax as rule patterns).
    pub exclude: Vec<String>,

    /// Zero-byte file written into structure-only directories.
    pub marker_file: String,

    /// Files checked for syntactic validity.
    pub syntax_checks: SyntaxChecks,

    /// Leakage scanning settings.
    pub leakage: LeakageConfig,

    /// Glob to placeholder names left in the output on purpose.
    pub placeholder_allowlist: BTreeMap<String, Vec<String>>,

    /// Inline scaffolds: scaffold name to (relative file path to content).
    pub scaffolds: BTreeMap<String, BTreeMap<String, String>>,

    /// Wall-clock budget for the walk and transfer phases.
    pub time_budget_secs: u64,
}

impl Default for DecoupleConfig {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            required_dirs: Vec::new(),
            required_variables: Vec::new(),
            variables: BTreeMap::new(),
            replacements: BTreeMap::new(),
            exclude: vec![".git/".to_string()],
            marker_file: default_marker_file(),
            syntax_checks: SyntaxChecks::default(),
            leakage: LeakageConfig::default(),
            placeholder_allowlist: BTreeMap::new(),
            scaffolds: BTreeMap::new(),
            time_budget_secs: default_time_budget(),
        }
    }
}

fn default_marker_file() -> String {
    ".gitkeep".to_string()
}

fn default_time_budget() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

impl DecoupleConfig {
    /// Compile the rule table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` if a pattern does not parse.
    pub fn transfer_rules(&self) -> Result<Vec<TransferRule>> {
        self.rules.iter().map(RuleConfig::to_rule).collect()
    }
}

/// One rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Unique rule name.
    pub name: String,

    /// Exact path, `dir/` prefix or glob.
    pub pattern: String,

    /// Strategy applied to matching paths.
    pub strategy: Strategy,

    /// Target path template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Scaffold name (scaffold rules only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaffold: Option<String>,

    /// Extra subdirectories (structure-only rules only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subdirs: Vec<String>,
}

impl RuleConfig {
    /// Compile into a [`TransferRule`].
    pub fn to_rule(&self) -> Result<TransferRule> {
        let mut rule = TransferRule::new(&self.name, &self.pattern, self.strategy)?
            .with_subdirs(self.subdirs.iter().cloned());
        if let Some(target) = &self.target {
            rule = rule.with_target(target);
        }
        if let Some(scaffold) = &self.scaffold {
            rule = rule.with_scaffold(scaffold);
        }
        Ok(rule)
    }
}

/// Globs selecting files for syntax validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntaxChecks {
    /// Files that must parse as JSON.
    pub json: Vec<String>,
    /// Files that must parse as YAML.
    pub yaml: Vec<String>,
}

/// Deny-list settings for leakage scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeakageConfig {
    /// Enable the built-in secret-shaped patterns.
    #[serde(default = "default_true")]
    pub builtin_secrets: bool,

    /// Additional secret regexes keyed by pattern id.
    pub secret_patterns: BTreeMap<String, String>,

    /// Project names that must not appear (case-insensitive).
    pub project_names: Vec<String>,

    /// Email addresses that must not appear.
    pub emails: Vec<String>,
}

impl Default for LeakageConfig {
    fn default() -> Self {
        Self {
            builtin_secrets: true,
            secret_patterns: BTreeMap::new(),
            project_names: Vec::new(),
            emails: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let config: DecoupleConfig = serde_yaml::from_str(
            r#"
rules:
  - name: readme
    pattern: README.md
    strategy: genericize
"#,
        )
        .unwrap();

        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].strategy, Strategy::Genericize);
        assert_eq!(config.marker_file, ".gitkeep");
        assert_eq!(config.time_budget_secs, 300);
        assert!(config.leakage.builtin_secrets);
        assert_eq!(config.exclude, vec![".git/"]);
    }

    #[test]
    fn parses_full_rule() {
        let rule: RuleConfig = serde_yaml::from_str(
            r#"
name: app
pattern: app/
strategy: structure_only
target: "services/{{PROJECT_NAME}}/"
subdirs: [client, server]
"#,
        )
        .unwrap();

        let compiled = rule.to_rule().unwrap();
        assert_eq!(compiled.subdirs, vec!["client", "server"]);
        assert_eq!(compiled.target.as_deref(), Some("services/{{PROJECT_NAME}}/"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let result: std::result::Result<DecoupleConfig, _> =
            serde_yaml::from_str("rulez: []");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_strategy() {
        let result: std::result::Result<RuleConfig, _> =
            serde_yaml::from_str("name: x\npattern: x\nstrategy: teleport");
        assert!(result.is_err());
    }

    #[test]
    fn leakage_section_defaults() {
        let config: DecoupleConfig = serde_yaml::from_str(
            r#"
leakage:
  project_names: [acme]
"#,
        )
        .unwrap();
        assert!(config.leakage.builtin_secrets);
        assert_eq!(config.leakage.project_names, vec!["acme"]);
    }
}
