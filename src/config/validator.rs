//! Configuration validation rules.
//!
//! This module validates configuration before any transformation starts:
//! - Rule names are unique and patterns compile
//! - Declarative rules (structure-only, scaffold) name a directory
//! - Scaffold rules reference a known scaffold
//! - Regexes, globs and variable names are well formed

use crate::classify::{PathPattern, Strategy, UNCLASSIFIED};
use crate::config::schema::DecoupleConfig;
use crate::error::{DecouplerError, Result};
use crate::template::{is_placeholder_name, LiteralReplacements};
use globset::Glob;
use regex::Regex;
use std::collections::HashSet;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a configuration and return all errors.
///
/// `scaffold_names` lists every scaffold available to the run.
pub fn validate_config(config: &DecoupleConfig, scaffold_names: &[&str]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_rules(config, scaffold_names));
    errors.extend(validate_variables(config));
    errors.extend(validate_patterns(config));
    errors.extend(validate_leakage(config));
    errors.extend(validate_settings(config));

    errors
}

fn check_relative_dir(path: &str) -> bool {
    !path.is_empty() && !path.starts_with('/') && !path.split('/').any(|p| p == "..")
}

fn validate_rules(config: &DecoupleConfig, scaffold_names: &[&str]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for rule in &config.rules {
        if rule.name.trim().is_empty() {
            errors.push(ValidationError::new("empty-rule-name", "Rule names must not be empty"));
        } else if rule.name == UNCLASSIFIED {
            errors.push(ValidationError::new(
                "reserved-rule-name",
                format!("Rule name '{}' is reserved", rule.name),
            ));
        } else if !names.insert(rule.name.as_str()) {
            errors.push(ValidationError::new(
                "duplicate-rule",
                format!("Rule '{}' is declared more than once", rule.name),
            ));
        }

        let pattern = match PathPattern::parse(&rule.pattern) {
            Ok(pattern) => pattern,
            Err(e) => {
                errors.push(ValidationError::new(
                    "invalid-pattern",
                    format!("Rule '{}': {}", rule.name, e),
                ));
                continue;
            }
        };

        if rule.strategy.is_declarative() && pattern.directory().is_none() {
            errors.push(ValidationError::new(
                "declarative-pattern",
                format!(
                    "Rule '{}' uses strategy {} and must name a directory (e.g. 'app/')",
                    rule.name, rule.strategy
                ),
            ));
        }

        match (rule.strategy, &rule.scaffold) {
            (Strategy::Scaffold, None) => errors.push(ValidationError::new(
                "missing-scaffold",
                format!("Rule '{}' uses strategy scaffold but names no scaffold", rule.name),
            )),
            (Strategy::Scaffold, Some(name)) if !scaffold_names.contains(&name.as_str()) => {
                errors.push(ValidationError::new(
                    "unknown-scaffold",
                    format!(
                        "Rule '{}' references scaffold '{}' which does not exist",
                        rule.name, name
                    ),
                ))
            }
            (Strategy::Scaffold, Some(_)) => {}
            (_, Some(_)) => errors.push(ValidationError::new(
                "unexpected-scaffold",
                format!("Rule '{}' names a scaffold but is not a scaffold rule", rule.name),
            )),
            (_, None) => {}
        }

        if !rule.subdirs.is_empty() && rule.strategy != Strategy::StructureOnly {
            errors.push(ValidationError::new(
                "unexpected-subdirs",
                format!("Rule '{}' declares subdirs but is not structure_only", rule.name),
            ));
        }
        for sub in &rule.subdirs {
            if !check_relative_dir(sub.trim_end_matches('/')) {
                errors.push(ValidationError::new(
                    "invalid-subdir",
                    format!("Rule '{}': invalid subdir '{}'", rule.name, sub),
                ));
            }
        }

        if let Some(target) = &rule.target {
            if target.starts_with('/') || target.split('/').any(|p| p == "..") {
                errors.push(ValidationError::new(
                    "invalid-target",
                    format!(
                        "Rule '{}': target '{}' must stay inside the target root",
                        rule.name, target
                    ),
                ));
            }
        }
    }

    errors
}

fn validate_variables(config: &DecoupleConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for name in config.variables.keys().chain(config.required_variables.iter()) {
        if !is_placeholder_name(name) {
            errors.push(ValidationError::new(
                "invalid-variable",
                format!("Variable '{}' must be UPPER_SNAKE_CASE", name),
            ));
        }
    }

    for (pattern, names) in &config.placeholder_allowlist {
        for name in names {
            if !is_placeholder_name(name) {
                errors.push(ValidationError::new(
                    "invalid-variable",
                    format!(
                        "placeholder_allowlist['{}']: '{}' must be UPPER_SNAKE_CASE",
                        pattern, name
                    ),
                ));
            }
        }
    }

    if let Err(e) = LiteralReplacements::new(&config.replacements) {
        errors.push(ValidationError::new(
            "invalid-replacements",
            format!("replacements cannot be compiled: {}", e),
        ));
    }

    errors
}

fn validate_patterns(config: &DecoupleConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for pattern in &config.exclude {
        if let Err(e) = PathPattern::parse(pattern) {
            errors.push(ValidationError::new(
                "invalid-exclude",
                format!("exclude: {}", e),
            ));
        }
    }

    let globs = config
        .syntax_checks
        .json
        .iter()
        .chain(config.syntax_checks.yaml.iter())
        .chain(config.placeholder_allowlist.keys());
    for glob in globs {
        if let Err(e) = Glob::new(glob) {
            errors.push(ValidationError::new(
                "invalid-glob",
                format!("invalid glob '{}': {}", glob, e),
            ));
        }
    }

    for dir in &config.required_dirs {
        if !check_relative_dir(dir.trim_end_matches('/')) {
            errors.push(ValidationError::new(
                "invalid-required-dir",
                format!("required_dirs: '{}' must be a relative path", dir),
            ));
        }
    }

    errors
}

fn validate_leakage(config: &DecoupleConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (id, pattern) in &config.leakage.secret_patterns {
        if id.is_empty() || id.contains(char::is_whitespace) {
            errors.push(ValidationError::new(
                "invalid-pattern-id",
                format!("secret pattern id '{}' must be a single word", id),
            ));
        }
        if let Err(e) = Regex::new(pattern) {
            errors.push(ValidationError::new(
                "invalid-regex",
                format!("secret pattern '{}': {}", id, e),
            ));
        }
    }

    for name in &config.leakage.project_names {
        if name.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-project-name",
                "leakage.project_names must not contain empty entries",
            ));
        }
    }

    errors
}

fn validate_settings(config: &DecoupleConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.marker_file.is_empty()
        || config.marker_file.contains('/')
        || config.marker_file == "."
        || config.marker_file == ".."
    {
        errors.push(ValidationError::new(
            "invalid-marker",
            format!("marker_file '{}' must be a plain file name", config.marker_file),
        ));
    }

    if config.time_budget_secs == 0 {
        errors.push(ValidationError::new(
            "invalid-time-budget",
            "time_budget_secs must be greater than zero",
        ));
    }

    errors
}

/// Validate and return an error if invalid.
pub fn validate(config: &DecoupleConfig, scaffold_names: &[&str]) -> Result<()> {
    let errors = validate_config(config, scaffold_names);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(DecouplerError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
