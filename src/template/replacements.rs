//! Literal find/replace phase used by genericization.
//!
//! Keys are always tried longest first. The ordering lives inside
//! [`LiteralReplacements`], so callers cannot supply a list in the wrong
//! order: with keys `app` and `app-beta`, the text `app-beta-v2` is matched by
//! `app-beta` and never split into `app` + `-beta-v2`.
//!
//! The scan is a single leftmost-longest pass. Replaced text is never scanned
//! again, so a value containing another key does not cascade.

use std::collections::{BTreeMap, HashMap};

use regex::{Captures, Regex};

/// An ordered, immutable set of literal replacements.
#[derive(Debug, Clone, Default)]
pub struct LiteralReplacements {
    /// Pairs sorted by descending key length, then key.
    pairs: Vec<(String, String)>,
    lookup: HashMap<String, String>,
    pattern: Option<Regex>,
}

impl LiteralReplacements {
    /// Build the replacement set. Empty keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the combined pattern exceeds the size limit.
    pub fn new(map: &BTreeMap<String, String>) -> Result<Self, regex::Error> {
        let mut pairs: Vec<(String, String)> = map
            .iter()
            .filter(|(k, _)| !k.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let pattern = if pairs.is_empty() {
            None
        } else {
            let alternation = pairs
                .iter()
                .map(|(k, _)| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&alternation)?)
        };

        let lookup = pairs.iter().cloned().collect();

        Ok(Self {
            pairs,
            lookup,
            pattern,
        })
    }

    /// Keys in application order (longest first).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    /// Number of replacement pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Apply every replacement in one pass.
    pub fn apply(&self, input: &str) -> String {
        match &self.pattern {
            None => input.to_string(),
            Some(re) => re
                .replace_all(input, |caps: &Captures| {
                    self.lookup.get(&caps[0]).cloned().unwrap_or_default()
                })
                .into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, &str)]) -> LiteralReplacements {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LiteralReplacements::new(&map).unwrap()
    }

    #[test]
    fn longest_key_wins() {
        let r = set(&[("app", "X"), ("app-beta", "Y")]);
        assert_eq!(r.apply("app-beta-v2"), "Y-v2");
        assert_eq!(r.apply("app and app-beta"), "X and Y");
    }

    #[test]
    fn keys_are_sorted_by_length() {
        let r = set(&[("a", "1"), ("abc", "3"), ("ab", "2")]);
        let keys: Vec<_> = r.keys().collect();
        assert_eq!(keys, vec!["abc", "ab", "a"]);
    }

    #[test]
    fn replacement_is_not_rescanned() {
        let r = set(&[("myapp", "myapp-template"), ("template", "BAD")]);
        assert_eq!(r.apply("myapp"), "myapp-template");
    }

    #[test]
    fn special_characters_are_literal() {
        let r = set(&[("https://acme.io/api?v=1", "{{API_URL}}"), (":8080", ":{{PORT}}")]);
        assert_eq!(
            r.apply("GET https://acme.io/api?v=1 on localhost:8080"),
            "GET {{API_URL}} on localhost:{{PORT}}"
        );
    }

    #[test]
    fn empty_set_is_identity() {
        let r = set(&[]);
        assert!(r.is_empty());
        assert_eq!(r.apply("unchanged"), "unchanged");
    }

    #[test]
    fn empty_keys_are_ignored() {
        let r = set(&[("", "x"), ("a", "b")]);
        assert_eq!(r.len(), 1);
        assert_eq!(r.apply("a"), "b");
    }
}
