//! Rule registry for validation rules.
//!
//! The [`RuleRegistry`] keeps rules in registration order; the validator
//! runs them in that order.

use crate::config::DecoupleConfig;
use crate::error::Result;

use super::rule::ValidationRule;
use super::rules::{LeakageRule, PlaceholderRule, StructureRule, SyntaxRule};

/// Ordered set of validation rules.
pub struct RuleRegistry {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl RuleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a registry with the built-in rules, configured from `config`.
    ///
    /// Order: structure, syntax, leakage, placeholders.
    pub fn from_config(config: &DecoupleConfig) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Box::new(StructureRule::new(&config.required_dirs)));
        registry.register(Box::new(SyntaxRule::new(&config.syntax_checks)?));
        registry.register(Box::new(LeakageRule::from_config(&config.leakage)?));
        registry.register(Box::new(PlaceholderRule::new(
            &config.placeholder_allowlist,
        )?));
        Ok(registry)
    }

    /// Register a rule after the existing ones.
    pub fn register(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Iterate over rules in order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn ValidationRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Get the number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
