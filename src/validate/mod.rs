//! Validation of a generated tree.
//!
//! The [`Validator`] reads every file the manifest lists as written, then
//! runs each rule of a [`RuleRegistry`] in order:
//!
//! 1. [`StructureRule`](rules::StructureRule) - required directories
//! 2. [`SyntaxRule`](rules::SyntaxRule) - JSON and YAML parse
//! 3. [`LeakageRule`](rules::LeakageRule) - secrets and project identifiers
//! 4. [`PlaceholderRule`](rules::PlaceholderRule) - remaining placeholders
//!
//! The same validator checks a tree on disk and a dry run captured in memory.
//!
//! # Example
//!
//! ```
//! use decoupler::config::DecoupleConfig;
//! use decoupler::transfer::GenerationManifest;
//! use decoupler::validate::{tree::MemoryTree, Validator};
//!
//! let config = DecoupleConfig::default();
//! let manifest = GenerationManifest::new("src", "out", chrono::Utc::now(), true);
//! let findings = Validator::from_config(&config)
//!     .unwrap()
//!     .validate(&manifest, &MemoryTree::new());
//! assert!(findings.is_empty());
//! ```

pub mod finding;
pub mod registry;
pub mod rule;
pub mod rules;
pub mod tree;

pub use finding::{has_fatal, RuleId, Severity, SeverityCounts, ValidationFinding};
pub use registry::RuleRegistry;
pub use rule::{GeneratedFile, ValidationContext, ValidationRule};
pub use tree::{DiskTree, MemoryNode, MemoryTree, TreeView};

use rayon::prelude::*;

use crate::config::DecoupleConfig;
use crate::error::Result;
use crate::transfer::{GenerationManifest, ManifestEntry};

/// Finding id for a manifest entry whose file cannot be read back.
pub const MISSING_OUTPUT: &str = "missing-output";

/// Runs validation rules over a generated tree.
pub struct Validator {
    registry: RuleRegistry,
}

impl Validator {
    /// Build the validator for a configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` if a configured glob or regex does
    /// not compile.
    pub fn from_config(config: &DecoupleConfig) -> Result<Self> {
        Ok(Self {
            registry: RuleRegistry::from_config(config)?,
        })
    }

    /// Validate `tree` against `manifest`.
    pub fn validate(
        &self,
        manifest: &GenerationManifest,
        tree: &dyn TreeView,
    ) -> Vec<ValidationFinding> {
        let (files, mut findings) = load_files(manifest, tree);
        tracing::info!(
            "Validating {} files from {}",
            files.len(),
            tree.describe()
        );

        let ctx = ValidationContext {
            manifest,
            tree,
            files: &files,
        };
        for rule in self.registry.iter() {
            let found = rule.check(&ctx);
            tracing::debug!("Rule {} produced {} findings", rule.id(), found.len());
            findings.extend(found);
        }

        findings
    }
}

fn load_files(
    manifest: &GenerationManifest,
    tree: &dyn TreeView,
) -> (Vec<GeneratedFile>, Vec<ValidationFinding>) {
    let written: Vec<&ManifestEntry> = manifest.written().collect();

    let loaded: Vec<_> = written
        .par_iter()
        .map(|entry| (entry, tree.read(&entry.target_path)))
        .collect();

    let mut files = Vec::new();
    let mut findings = Vec::new();
    for (entry, result) in loaded {
        match result {
            Ok(Some(content)) => files.push(GeneratedFile {
                path: entry.target_path.clone(),
                strategy: entry.strategy,
                content,
            }),
            Ok(None) => {}
            Err(e) => findings.push(
                ValidationFinding::fatal(
                    MISSING_OUTPUT,
                    format!("listed in the manifest but cannot be read: {}", e),
                )
                .with_path(entry.target_path.as_str()),
            ),
        }
    }

    (files, findings)
}
