//! Error types for decoupler operations.
//!
//! Two layers of failure exist:
//!
//! - [`DecouplerError`] covers configuration and invocation problems. These
//!   abort a run before any transformation starts and map to exit code 2.
//! - [`PathError`] covers a single source path or output file. These never
//!   abort a run; the transfer engine turns them into failed manifest entries
//!   and fatal findings.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for decoupler operations.
#[derive(Debug, Error)]
pub enum DecouplerError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Source directory is missing or unusable.
    #[error("Invalid source {path}: {message}")]
    InvalidSource { path: PathBuf, message: String },

    /// Target directory is unusable.
    #[error("Invalid target {path}: {message}")]
    InvalidTarget { path: PathBuf, message: String },

    /// Target directory has content and the overwrite was not confirmed.
    #[error("Target {path} is not empty (use --force to write into it)")]
    TargetNotEmpty { path: PathBuf },

    /// Source is not inside a git repository.
    #[error("Source {path} is not a git repository (use --skip-git to bypass)")]
    NotARepository { path: PathBuf },

    /// A variable required by the configuration has no binding.
    #[error("Missing binding for required variable '{name}'")]
    MissingBinding { name: String },

    /// Manifest could not be read back.
    #[error("Failed to read manifest at {path}: {message}")]
    ManifestError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for decoupler operations.
pub type Result<T> = std::result::Result<T, DecouplerError>;

/// Failure confined to a single path of the source or target tree.
#[derive(Debug, Error)]
pub enum PathError {
    /// Reading, writing or inspecting the file failed.
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A text-mode strategy hit content that is not valid UTF-8.
    #[error("{path}: content is not valid UTF-8")]
    NonUtf8 { path: String },

    /// A symlink resolves to a directory that was already visited.
    #[error("{path}: symlink forms a cycle through {target}")]
    SymlinkCycle { path: String, target: PathBuf },

    /// A symlink resolves outside the source root.
    #[error("{path}: symlink points outside the source root ({target})")]
    SymlinkEscapesRoot { path: String, target: PathBuf },

    /// A symlink cannot be resolved (dangling or looping).
    #[error("{path}: symlink cannot be resolved: {message}")]
    SymlinkUnresolvable { path: String, message: String },

    /// Content-rendering strategies cannot be applied to directory links.
    #[error("{path}: cannot genericize a directory symlink")]
    DirectorySymlink { path: String },

    /// Rendering left placeholders without bindings.
    #[error("{path}: unresolved placeholders: {}", names.join(", "))]
    UnresolvedPlaceholders { path: String, names: Vec<String> },

    /// A rendered target path is absolute, empty or escapes the target root.
    #[error("{path}: invalid target path '{target}'")]
    InvalidTargetPath { path: String, target: String },

    /// Another unit already produces this target path.
    #[error("{path}: target '{target}' is already produced by {owner}")]
    TargetConflict {
        path: String,
        target: String,
        owner: String,
    },
}

impl PathError {
    /// Build an IO error for the given path.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
