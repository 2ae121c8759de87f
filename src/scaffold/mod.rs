//! Scaffolds: sets of template files generated instead of copied.
//!
//! Built-in scaffolds live under `templates/scaffolds/<name>/` and are
//! embedded at compile time. Configuration may add scaffolds or replace a
//! built-in one wholesale through the `scaffolds` key.

pub mod builtin;

use std::collections::BTreeMap;

use crate::error::Result;

/// A named set of template files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scaffold {
    /// Scaffold name.
    pub name: String,
    /// Relative file path to template content.
    pub files: BTreeMap<String, String>,
}

/// Every scaffold available to a run.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldLibrary {
    scaffolds: BTreeMap<String, Scaffold>,
}

impl ScaffoldLibrary {
    /// Load the built-in scaffolds.
    pub fn builtin() -> Result<Self> {
        let mut library = Self::default();
        for (name, files) in builtin::load_scaffolds()? {
            library.insert(name, files);
        }
        Ok(library)
    }

    /// Load built-ins, then apply inline scaffolds from configuration.
    pub fn with_overrides(inline: &BTreeMap<String, BTreeMap<String, String>>) -> Result<Self> {
        let mut library = Self::builtin()?;
        for (name, files) in inline {
            library.insert(name.clone(), files.clone());
        }
        Ok(library)
    }

    /// Add or replace a scaffold.
    pub fn insert(&mut self, name: String, files: BTreeMap<String, String>) {
        self.scaffolds
            .insert(name.clone(), Scaffold { name, files });
    }

    /// Get a scaffold by name.
    pub fn get(&self, name: &str) -> Option<&Scaffold> {
        self.scaffolds.get(name)
    }

    /// All scaffold names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.scaffolds.keys().map(String::as_str).collect()
    }
}
