//! Variable bindings for placeholder substitution.
//!
//! Bindings are assembled once per run. Sources, lowest priority first:
//!
//! 1. Built-ins (`AUTHOR`, `GENERATED_AT`, `GENERATED_DATE`, `TOOL_VERSION`)
//! 2. Configuration `variables`
//! 3. `--project-name`
//! 4. `--var KEY=VALUE`

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{DecouplerError, Result};

use super::placeholder::is_placeholder_name;

/// Variables that may fall back to a safe default when unbound.
///
/// Every other variable must be bound explicitly.
pub const FALLBACKS: &[(&str, &str)] = &[("AUTHOR", "Platform Engineering Team")];

/// Resolved placeholder values for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableBindings {
    values: BTreeMap<String, String>,
}

impl VariableBindings {
    /// Create an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` if `name` is not `UPPER_SNAKE_CASE`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        if !is_placeholder_name(&name) {
            return Err(DecouplerError::ConfigValidationError {
                message: format!(
                    "variable '{}' is not a valid placeholder name (expected UPPER_SNAKE_CASE)",
                    name
                ),
            });
        }
        self.values.insert(name, value.into());
        Ok(())
    }

    /// Builder-style insert for names known to be valid.
    pub fn with(mut self, name: &str, value: &str) -> Result<Self> {
        self.insert(name, value)?;
        Ok(self)
    }

    /// Look up a binding.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Check whether a binding exists.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no bindings exist.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return a copy extended with per-path variables.
    pub fn extended<'a>(&self, extra: impl IntoIterator<Item = (&'a str, String)>) -> Self {
        let mut values = self.values.clone();
        for (name, value) in extra {
            values.insert(name.to_string(), value);
        }
        Self { values }
    }

    /// Ensure every required variable is bound.
    ///
    /// # Errors
    ///
    /// Returns `MissingBinding` for the first required name without a value.
    pub fn require<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            let name = name.as_ref();
            if !self.contains(name) {
                return Err(DecouplerError::MissingBinding {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Assembles [`VariableBindings`] from all sources.
#[derive(Debug, Clone)]
pub struct BindingsBuilder {
    generated_at: DateTime<Utc>,
    author: Option<String>,
    config_vars: BTreeMap<String, String>,
    project_name: Option<String>,
    cli_vars: Vec<(String, String)>,
}

impl BindingsBuilder {
    /// Start a builder stamped with `generated_at`.
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            author: None,
            config_vars: BTreeMap::new(),
            project_name: None,
            cli_vars: Vec::new(),
        }
    }

    /// Author name as reported by git, if any.
    pub fn author(mut self, author: Option<String>) -> Self {
        self.author = author.filter(|a| !a.trim().is_empty());
        self
    }

    /// Variables declared in configuration.
    pub fn config_vars(mut self, vars: &BTreeMap<String, String>) -> Self {
        self.config_vars = vars.clone();
        self
    }

    /// Project name from `--project-name`.
    pub fn project_name(mut self, name: Option<String>) -> Self {
        self.project_name = name;
        self
    }

    /// `KEY=VALUE` assignments from `--var`.
    pub fn cli_vars(mut self, vars: Vec<(String, String)>) -> Self {
        self.cli_vars = vars;
        self
    }

    /// Build the bindings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` when a variable name is invalid.
    pub fn build(self) -> Result<VariableBindings> {
        let mut bindings = VariableBindings::new();

        bindings.insert(
            "GENERATED_AT",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;
        bindings.insert(
            "GENERATED_DATE",
            self.generated_at.format("%Y-%m-%d").to_string(),
        )?;
        bindings.insert("TOOL_VERSION", env!("CARGO_PKG_VERSION"))?;
        if let Some(author) = self.author {
            bindings.insert("AUTHOR", author)?;
        }

        for (name, value) in self.config_vars {
            bindings.insert(name, value)?;
        }
        if let Some(project) = self.project_name {
            bindings.insert("PROJECT_NAME", project)?;
        }
        for (name, value) in self.cli_vars {
            bindings.insert(name, value)?;
        }

        for (name, fallback) in FALLBACKS {
            if !bindings.contains(name) {
                tracing::debug!("Using fallback value for {}", name);
                bindings.insert(*name, *fallback)?;
            }
        }

        Ok(bindings)
    }
}

/// Parse a `KEY=VALUE` assignment (used as a clap value parser).
pub fn parse_assignment(input: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", input))?;
    let key = key.trim();
    if !is_placeholder_name(key) {
        return Err(format!(
            "'{}' is not a valid variable name (expected UPPER_SNAKE_CASE)",
            key
        ));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn builtins_are_present() {
        let bindings = BindingsBuilder::new(fixed_time()).build().unwrap();

        assert_eq!(bindings.get("GENERATED_AT"), Some("2024-03-01T12:30:00Z"));
        assert_eq!(bindings.get("GENERATED_DATE"), Some("2024-03-01"));
        assert_eq!(bindings.get("TOOL_VERSION"), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn author_falls_back() {
        let bindings = BindingsBuilder::new(fixed_time())
            .author(None)
            .build()
            .unwrap();
        assert_eq!(bindings.get("AUTHOR"), Some("Platform Engineering Team"));

        let bindings = BindingsBuilder::new(fixed_time())
            .author(Some("   ".into()))
            .build()
            .unwrap();
        assert_eq!(bindings.get("AUTHOR"), Some("Platform Engineering Team"));
    }

    #[test]
    fn git_author_wins_over_fallback() {
        let bindings = BindingsBuilder::new(fixed_time())
            .author(Some("Ada".into()))
            .build()
            .unwrap();
        assert_eq!(bindings.get("AUTHOR"), Some("Ada"));
    }

    #[test]
    fn priority_order() {
        let mut config = BTreeMap::new();
        config.insert("PROJECT_NAME".to_string(), "from-config".to_string());
        config.insert("REGION".to_string(), "eu-west-1".to_string());

        let bindings = BindingsBuilder::new(fixed_time())
            .config_vars(&config)
            .project_name(Some("from-flag".into()))
            .cli_vars(vec![("REGION".into(), "us-east-1".into())])
            .build()
            .unwrap();

        assert_eq!(bindings.get("PROJECT_NAME"), Some("from-flag"));
        assert_eq!(bindings.get("REGION"), Some("us-east-1"));
    }

    #[test]
    fn invalid_config_variable_name_is_rejected() {
        let mut config = BTreeMap::new();
        config.insert("project".to_string(), "x".to_string());

        let result = BindingsBuilder::new(fixed_time())
            .config_vars(&config)
            .build();
        assert!(matches!(
            result,
            Err(DecouplerError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn require_reports_missing_name() {
        let bindings = VariableBindings::new().with("A", "1").unwrap();
        assert!(bindings.require(&["A"]).is_ok());
        match bindings.require(&["A", "B"]) {
            Err(DecouplerError::MissingBinding { name }) => assert_eq!(name, "B"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn extended_does_not_mutate_original() {
        let bindings = VariableBindings::new().with("A", "1").unwrap();
        let extended = bindings.extended([("REL_PATH", "x/y".to_string())]);
        assert_eq!(extended.get("REL_PATH"), Some("x/y"));
        assert!(!bindings.contains("REL_PATH"));
    }

    #[test]
    fn parse_assignment_cases() {
        assert_eq!(
            parse_assignment("REGION=eu-west-1"),
            Ok(("REGION".into(), "eu-west-1".into()))
        );
        assert_eq!(
            parse_assignment("URL=http://x?a=b"),
            Ok(("URL".into(), "http://x?a=b".into()))
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("lower=x").is_err());
    }
}
