//! Required directory check.

use crate::validate::finding::{RuleId, ValidationFinding};
use crate::validate::rule::{ValidationContext, ValidationRule};

/// Finding id for an absent required directory.
pub const MISSING_DIRECTORY: &str = "missing-directory";

/// Every configured directory must exist in the generated tree.
pub struct StructureRule {
    required_dirs: Vec<String>,
}

impl StructureRule {
    pub fn new(required_dirs: &[String]) -> Self {
        Self {
            required_dirs: required_dirs
                .iter()
                .map(|d| d.trim_matches('/').to_string())
                .collect(),
        }
    }
}

impl ValidationRule for StructureRule {
    fn id(&self) -> RuleId {
        RuleId::new(MISSING_DIRECTORY)
    }

    fn name(&self) -> &str {
        "Required Directories"
    }

    fn description(&self) -> &str {
        "Checks that every required directory exists in the generated tree"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationFinding> {
        self.required_dirs
            .iter()
            .filter(|dir| !ctx.tree.is_dir(dir))
            .map(|dir| {
                ValidationFinding::fatal(
                    MISSING_DIRECTORY,
                    format!("required directory '{}' is missing", dir),
                )
                .with_path(dir.as_str())
            })
            .collect()
    }
}
