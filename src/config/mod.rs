//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - Layer discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use decoupler::config::{load_config, validate, ConfigPaths};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".decoupler.yml"), "marker_file: .keep").unwrap();
//!
//! let config = load_config(&ConfigPaths::discover(Some(temp.path()), None)).unwrap();
//! validate(&config, &["terraform", "ci"]).unwrap();
//! assert_eq!(config.marker_file, ".keep");
//! ```
//!
//! # Configuration Layers
//!
//! 1. Embedded defaults (`templates/defaults.yml`)
//! 2. Source config (`<source>/.decoupler.yml`)
//! 3. Explicit config (`--config <file>`)

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use loader::{
    load_config, load_config_value, load_default_value, ConfigPaths, SOURCE_CONFIG_FILE,
};
pub use merger::{deep_merge, merge_configs};
pub use schema::{DecoupleConfig, LeakageConfig, RuleConfig, SyntaxChecks};
pub use validator::{validate, validate_config, ValidationError};
