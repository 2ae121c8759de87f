//! Validation rule definitions.
//!
//! - [`ValidationRule`] - The trait every check implements
//! - [`ValidationContext`] - What a check sees: the manifest and the
//!   generated files it lists

use crate::classify::Strategy;
use crate::transfer::GenerationManifest;

use super::finding::{RuleId, ValidationFinding};
use super::tree::TreeView;

/// A generated regular file, read once per validation run.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    /// Path relative to the target root.
    pub path: String,
    /// Strategy that produced the file.
    pub strategy: Strategy,
    /// File content.
    pub content: Vec<u8>,
}

impl GeneratedFile {
    /// Content as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Input to every validation rule.
pub struct ValidationContext<'a> {
    pub manifest: &'a GenerationManifest,
    pub tree: &'a dyn TreeView,
    /// Written regular files in manifest order. Symlinks are excluded.
    pub files: &'a [GeneratedFile],
}

/// A check over a generated tree.
///
/// Rules never modify the tree; they only report findings.
pub trait ValidationRule: Send + Sync {
    /// Identifier of the rule family.
    fn id(&self) -> RuleId;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// What the rule checks.
    fn description(&self) -> &str;

    /// Run the check.
    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationFinding>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lossy_text_for_binary_content() {
        let file = GeneratedFile {
            path: "a.bin".to_string(),
            strategy: Strategy::FullCopy,
            content: vec![b'o', b'k', 0xff],
        };
        assert!(file.text().starts_with("ok"));
    }
}
