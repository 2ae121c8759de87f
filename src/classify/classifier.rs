//! Path classification against an immutable rule table.

use std::collections::BTreeSet;

use crate::error::{DecouplerError, Result};

use super::rule::TransferRule;

/// Maps relative source paths to the single rule that applies to them.
///
/// Rules are ordered once at construction: longest literal prefix first,
/// then exact > directory prefix > glob, then declaration order. The first
/// matching rule wins; when none match, the `unclassified` Skip pseudo-rule is
/// returned.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    rules: Vec<TransferRule>,
    fallback: TransferRule,
    include: Option<BTreeSet<String>>,
}

impl PathClassifier {
    /// Build a classifier from the configured rules.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` for duplicate rule names.
    pub fn new(rules: Vec<TransferRule>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for rule in &rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(DecouplerError::ConfigValidationError {
                    message: format!("duplicate rule name '{}'", rule.name),
                });
            }
            if rule.is_unclassified() {
                return Err(DecouplerError::ConfigValidationError {
                    message: format!("rule name '{}' is reserved", rule.name),
                });
            }
        }

        let mut rules = rules;
        // Stable sort keeps declaration order within equal precedence.
        rules.sort_by_key(|rule| rule.precedence());

        Ok(Self {
            rules,
            fallback: TransferRule::unclassified(),
            include: None,
        })
    }

    /// Restrict the run to the named rules.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` naming every unknown rule.
    pub fn with_include(mut self, include: &[String]) -> Result<Self> {
        if include.is_empty() {
            self.include = None;
            return Ok(self);
        }

        let unknown: Vec<&str> = include
            .iter()
            .map(String::as_str)
            .filter(|name| !self.rules.iter().any(|r| r.name == *name))
            .collect();
        if !unknown.is_empty() {
            return Err(DecouplerError::ConfigValidationError {
                message: format!("unknown rule(s) in --include: {}", unknown.join(", ")),
            });
        }

        self.include = Some(include.iter().cloned().collect());
        Ok(self)
    }

    /// Return the rule that applies to `path`.
    ///
    /// Never fails and always returns exactly one rule.
    pub fn classify(&self, path: &str) -> &TransferRule {
        let rule = self
            .rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .unwrap_or(&self.fallback);
        tracing::debug!("{} -> {} ({})", path, rule.name, rule.strategy);
        rule
    }

    /// Whether `rule` is part of this run.
    pub fn is_selected(&self, rule: &TransferRule) -> bool {
        match &self.include {
            None => true,
            Some(names) => names.contains(&rule.name),
        }
    }

    /// Rules in precedence order.
    pub fn rules(&self) -> &[TransferRule] {
        &self.rules
    }

    /// Selected rules in precedence order.
    pub fn selected_rules(&self) -> impl Iterator<Item = &TransferRule> {
        self.rules.iter().filter(|rule| self.is_selected(rule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::rule::Strategy;

    fn rule(name: &str, pattern: &str, strategy: Strategy) -> TransferRule {
        TransferRule::new(name, pattern, strategy).unwrap()
    }

    fn classifier() -> PathClassifier {
        PathClassifier::new(vec![
            rule("docs", "docs/**/*.md", Strategy::Genericize),
            rule("app", "app/", Strategy::StructureOnly),
            rule("app-scripts", "app/scripts/", Strategy::FullCopy),
            rule("readme", "README.md", Strategy::Genericize),
            rule("markdown", "*.md", Strategy::FullCopy),
        ])
        .unwrap()
    }

    #[test]
    fn longest_prefix_wins() {
        let c = classifier();
        assert_eq!(c.classify("app/scripts/deploy.sh").name, "app-scripts");
        assert_eq!(c.classify("app/index.js").name, "app");
    }

    #[test]
    fn exact_beats_glob() {
        let c = classifier();
        assert_eq!(c.classify("README.md").name, "readme");
        assert_eq!(c.classify("CHANGELOG.md").name, "markdown");
    }

    #[test]
    fn equal_precedence_uses_declaration_order() {
        let c = PathClassifier::new(vec![
            rule("first", "ab/", Strategy::StructureOnly),
            rule("second", "ab/", Strategy::FullCopy),
            rule("file", "ab/c", Strategy::FullCopy),
        ])
        .unwrap();
        assert_eq!(c.classify("ab/c").name, "file");
        assert_eq!(c.classify("ab/d").name, "first");
    }

    #[test]
    fn dir_prefix_beats_glob_with_same_prefix() {
        let c = PathClassifier::new(vec![
            rule("glob", "ab/*", Strategy::FullCopy),
            rule("dir", "ab/", Strategy::Genericize),
        ])
        .unwrap();
        assert_eq!(c.classify("ab/x").name, "dir");
    }

    #[test]
    fn unmatched_path_falls_back_to_skip() {
        let c = classifier();
        let r = c.classify("src/main.rs");
        assert!(r.is_unclassified());
        assert_eq!(r.strategy, Strategy::Skip);
    }

    #[test]
    fn classification_is_total() {
        let c = classifier();
        let paths = [
            "README.md",
            "app/index.js",
            "app/scripts/a.sh",
            "docs/x/y.md",
            "docs/y.txt",
            "weird name with spaces",
            "a/b/c/d/e/f",
        ];
        for path in paths {
            let matching = c.rules().iter().filter(|r| r.pattern.matches(path)).count();
            let chosen = c.classify(path);
            if matching == 0 {
                assert!(chosen.is_unclassified());
            } else {
                assert!(chosen.pattern.matches(path));
            }
        }
    }

    #[test]
    fn duplicate_names_rejected() {
        let result = PathClassifier::new(vec![
            rule("a", "x/", Strategy::FullCopy),
            rule("a", "y/", Strategy::FullCopy),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn reserved_name_rejected() {
        let result = PathClassifier::new(vec![rule("unclassified", "x/", Strategy::FullCopy)]);
        assert!(result.is_err());
    }

    #[test]
    fn include_filters_rules() {
        let c = classifier().with_include(&["app".to_string()]).unwrap();
        assert!(c.is_selected(c.classify("app/index.js")));
        assert!(!c.is_selected(c.classify("README.md")));
        assert_eq!(c.selected_rules().count(), 1);
    }

    #[test]
    fn include_rejects_unknown_names() {
        let err = classifier()
            .with_include(&["nope".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
