//! Validation findings.
//!
//! A [`ValidationFinding`] is pure data: it reports something about the
//! generated tree or the run that produced it, and never changes the tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for the check that produced a finding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub String);

impl RuleId {
    /// Create a new rule ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The rule ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, never affects the exit code.
    Info,
    /// Should be reviewed, exit code stays 0.
    Warning,
    /// The generated tree is not usable as-is.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// A single observation about a run or its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// Severity of this finding.
    pub severity: Severity,
    /// Relative path the finding refers to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// The check that produced this finding.
    pub rule_id: RuleId,
    /// Human-readable message.
    pub message: String,
    /// Placeholder name the finding is about, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl ValidationFinding {
    /// Create a new finding.
    pub fn new(rule_id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            path: None,
            rule_id: RuleId::new(rule_id),
            message: message.into(),
            placeholder: None,
        }
    }

    /// Create a fatal finding.
    pub fn fatal(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, Severity::Fatal, message)
    }

    /// Create a warning.
    pub fn warning(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, Severity::Warning, message)
    }

    /// Create an informational finding.
    pub fn info(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, Severity::Info, message)
    }

    /// Attach the path this finding refers to.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach the placeholder name this finding is about.
    pub fn with_placeholder(mut self, name: impl Into<String>) -> Self {
        self.placeholder = Some(name.into());
        self
    }

    /// Whether this finding is fatal.
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

/// Counts of findings per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub fatal: usize,
    pub warning: usize,
    pub info: usize,
}

impl SeverityCounts {
    /// Count findings.
    pub fn of(findings: &[ValidationFinding]) -> Self {
        let mut counts = Self::default();
        for f in findings {
            match f.severity {
                Severity::Fatal => counts.fatal += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Info => counts.info += 1,
            }
        }
        counts
    }
}

/// Whether any finding is fatal.
pub fn has_fatal(findings: &[ValidationFinding]) -> bool {
    findings.iter().any(ValidationFinding::is_fatal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_creation() {
        let f = ValidationFinding::fatal("leakage:aws-access-key", "AWS key found")
            .with_path("secrets.txt");

        assert_eq!(f.rule_id, RuleId::new("leakage:aws-access-key"));
        assert_eq!(f.severity, Severity::Fatal);
        assert_eq!(f.path.as_deref(), Some("secrets.txt"));
        assert!(f.is_fatal());
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Fatal);
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Fatal).unwrap(), "\"fatal\"");
        assert_eq!(format!("{}", Severity::Info), "info");
    }

    #[test]
    fn finding_json_shape() {
        let f = ValidationFinding::warning("unexpected-placeholder", "left {{X}}");
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["rule_id"], "unexpected-placeholder");
        assert_eq!(json["severity"], "warning");
        assert!(json.get("path").is_none());
        assert!(json.get("placeholder").is_none());

        let f = f.with_placeholder("X");
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["placeholder"], "X");
    }

    #[test]
    fn counts_and_fatal_detection() {
        let findings = vec![
            ValidationFinding::info("a", "x"),
            ValidationFinding::warning("b", "y"),
            ValidationFinding::warning("b", "z"),
        ];
        let counts = SeverityCounts::of(&findings);
        assert_eq!(counts, SeverityCounts { fatal: 0, warning: 2, info: 1 });
        assert!(!has_fatal(&findings));
    }
}
