//! Placeholder templating.
//!
//! - [`placeholder`] - the `{{UPPER_SNAKE_CASE}}` token grammar
//! - [`bindings`] - resolved variable values for a run
//! - [`replacements`] - longest-first literal find/replace
//! - [`renderer`] - single-pass substitution with unresolved detection
//!
//! # Example
//!
//! ```
//! use decoupler::template::{render, VariableBindings};
//!
//! let mut bindings = VariableBindings::new();
//! bindings.insert("PROJECT_NAME", "Acme").unwrap();
//!
//! let out = render("Hello {{PROJECT_NAME}} ${var.region}", &bindings);
//! assert_eq!(out.content, "Hello Acme ${var.region}");
//! assert!(out.unresolved.is_empty());
//! ```

pub mod bindings;
pub mod placeholder;
pub mod renderer;
pub mod replacements;

pub use bindings::{parse_assignment, BindingsBuilder, VariableBindings, FALLBACKS};
pub use placeholder::{
    find_placeholders, is_placeholder_name, parse_placeholders, placeholder_occurrences, Segment,
};
pub use renderer::{render, Rendered, TemplateRenderer};
pub use replacements::LiteralReplacements;
