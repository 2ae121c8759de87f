//! Leakage scanning.
//!
//! Detects content that should never survive decoupling: secret-shaped
//! strings (fatal) and identifiers of the original project such as its name
//! or team email addresses (warnings).

use regex::Regex;

use crate::config::LeakageConfig;
use crate::error::{DecouplerError, Result};
use crate::validate::finding::{RuleId, Severity, ValidationFinding};
use crate::validate::rule::{ValidationContext, ValidationRule};

use super::line_of;

/// Prefix of every leakage finding id.
pub const LEAKAGE_PREFIX: &str = "leakage";

/// Built-in secret patterns.
///
/// Each tuple contains (id, description, regex_pattern).
pub const BUILTIN_SECRET_PATTERNS: &[(&str, &str, &str)] = &[
    ("aws-access-key", "AWS access key id", r"AKIA[0-9A-Z]{16}"),
    (
        "github-token",
        "GitHub token",
        r"\b(?:gh[pousr]_[A-Za-z0-9]{36,}|github_pat_[A-Za-z0-9_]{22,})",
    ),
    (
        "slack-token",
        "Slack token",
        r"\bxox[abeprs]-[A-Za-z0-9-]{10,}",
    ),
    (
        "private-key",
        "private key block",
        r"-----BEGIN (?:[A-Z]+ )*PRIVATE KEY-----",
    ),
    (
        "api-key",
        "API key assignment",
        r#"(?i)\b(?:api[_-]?key|secret[_-]?key|access[_-]?token|auth[_-]?token)["']?\s*[:=]\s*["'][A-Za-z0-9_\-/+=.]{16,}["']"#,
    ),
];

/// A compiled deny-list pattern.
#[derive(Debug, Clone)]
pub struct LeakPattern {
    /// Finding id suffix.
    pub id: String,
    /// What was found, for messages.
    pub label: String,
    pub regex: Regex,
    pub severity: Severity,
}

/// Scans every generated file against the deny-list.
pub struct LeakageRule {
    patterns: Vec<LeakPattern>,
}

impl LeakageRule {
    /// Create a rule from explicit patterns.
    pub fn new(patterns: Vec<LeakPattern>) -> Self {
        Self { patterns }
    }

    /// Compile the built-in and configured patterns.
    pub fn from_config(config: &LeakageConfig) -> Result<Self> {
        let mut patterns = Vec::new();

        if config.builtin_secrets {
            for (id, label, pattern) in BUILTIN_SECRET_PATTERNS {
                patterns.push(LeakPattern {
                    id: id.to_string(),
                    label: label.to_string(),
                    regex: compile(id, pattern)?,
                    severity: Severity::Fatal,
                });
            }
        }

        for (id, pattern) in &config.secret_patterns {
            patterns.push(LeakPattern {
                id: id.clone(),
                label: format!("secret matching '{}'", id),
                regex: compile(id, pattern)?,
                severity: Severity::Fatal,
            });
        }

        for name in config.project_names.iter().filter(|n| !n.is_empty()) {
            patterns.push(LeakPattern {
                id: "project-name".to_string(),
                label: format!("original project name '{}'", name),
                regex: compile(name, &format!("(?i){}", regex::escape(name)))?,
                severity: Severity::Warning,
            });
        }

        for email in config.emails.iter().filter(|e| !e.is_empty()) {
            patterns.push(LeakPattern {
                id: "email".to_string(),
                label: format!("email address '{}'", email),
                regex: compile(email, &regex::escape(email))?,
                severity: Severity::Warning,
            });
        }

        Ok(Self { patterns })
    }

    /// Number of compiled patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

fn compile(id: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| DecouplerError::ConfigValidationError {
        message: format!("leakage pattern '{}': {}", id, e),
    })
}

impl ValidationRule for LeakageRule {
    fn id(&self) -> RuleId {
        RuleId::new(LEAKAGE_PREFIX)
    }

    fn name(&self) -> &str {
        "Leakage"
    }

    fn description(&self) -> &str {
        "Checks generated files for secrets and original project identifiers"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        for file in ctx.files {
            let text = file.text();
            for pattern in &self.patterns {
                let mut matches = pattern.regex.find_iter(&text);
                let Some(first) = matches.next() else {
                    continue;
                };
                let total = 1 + matches.count();

                // Never echo the matched text: it may be the secret itself.
                let message = format!(
                    "{} found on line {}{}",
                    pattern.label,
                    line_of(&text, first.start()),
                    if total > 1 {
                        format!(" ({} occurrences)", total)
                    } else {
                        String::new()
                    }
                );
                findings.push(
                    ValidationFinding::new(
                        format!("{}:{}", LEAKAGE_PREFIX, pattern.id),
                        pattern.severity,
                        message,
                    )
                    .with_path(file.path.as_str()),
                );
            }
        }

        findings
    }
}
