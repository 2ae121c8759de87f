//! Built-in validation rules, in the order they run.

pub mod leakage;
pub mod placeholders;
pub mod structure;
pub mod syntax;

pub use leakage::LeakageRule;
pub use placeholders::PlaceholderRule;
pub use structure::StructureRule;
pub use syntax::SyntaxRule;

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::{DecouplerError, Result};

/// Compile one glob with `/`-aware wildcards.
pub(crate) fn compile_glob(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| DecouplerError::ConfigValidationError {
            message: format!("invalid glob '{}': {}", pattern, e),
        })
}

/// Compile a list of globs into one set.
pub(crate) fn compile_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(compile_glob(pattern)?);
    }
    builder
        .build()
        .map_err(|e| DecouplerError::ConfigValidationError {
            message: e.to_string(),
        })
}

/// 1-based line number of a byte offset.
pub(crate) fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}
