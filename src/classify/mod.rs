//! Source path classification.
//!
//! A [`PathClassifier`] is built once per run from the configured
//! [`TransferRule`] table and maps every relative source path to exactly one
//! rule.

pub mod classifier;
pub mod rule;

pub use classifier::PathClassifier;
pub use rule::{PathPattern, PatternKind, Strategy, TransferRule, UNCLASSIFIED};
