//! Decoupler - turn a working project into a reusable template tree.
//!
//! A run walks a source project, classifies every path against an ordered
//! rule table, transfers it with the rule's strategy (copy, skeleton,
//! scaffold or placeholder genericization), validates the generated tree
//! for leaked secrets and leftover placeholders, and reports the result.
//!
//! # Modules
//!
//! - [`classify`] - Transfer rules and longest-match path classification
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Layered configuration loading and validation
//! - [`error`] - Error types and result aliases
//! - [`git`] - The git collaborator
//! - [`pipeline`] - End-to-end runs
//! - [`report`] - Human and JSON reports, `TEMPLATE_USAGE.md`
//! - [`scaffold`] - Built-in and configured scaffold file sets
//! - [`template`] - Placeholders, bindings and rendering
//! - [`transfer`] - Source walking, transfer engine, manifest
//! - [`ui`] - Terminal output, prompts and spinners
//! - [`validate`] - Validation rules over the generated tree
//!
//! # Example
//!
//! ```
//! use decoupler::template::find_placeholders;
//!
//! let names: Vec<String> = find_placeholders("# {{PROJECT_NAME}} by {{AUTHOR}}")
//!     .into_iter()
//!     .collect();
//! assert_eq!(names, vec!["AUTHOR", "PROJECT_NAME"]);
//! ```
//!
//! For complete runs, see [`pipeline::Decoupler`] and the integration tests.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod report;
pub mod scaffold;
pub mod template;
pub mod transfer;
pub mod ui;
pub mod validate;

pub use error::{DecouplerError, PathError, Result};
