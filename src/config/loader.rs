//! Configuration discovery and loading.

use crate::config::merger::merge_configs;
use crate::config::schema::DecoupleConfig;
use crate::error::{DecouplerError, Result};
use crate::scaffold::builtin;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-source configuration file.
pub const SOURCE_CONFIG_FILE: &str = ".decoupler.yml";

/// Paths to configuration files in priority order (later overrides earlier).
///
/// Merge order:
/// 1. Embedded defaults (`templates/defaults.yml`)
/// 2. Source config (`<source>/.decoupler.yml`)
/// 3. Explicit config (`--config <file>`)
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Source config: `<source>/.decoupler.yml`
    pub source: Option<PathBuf>,

    /// Explicit config from `--config`
    pub explicit: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given source root.
    pub fn discover(source_root: Option<&Path>, explicit: Option<&Path>) -> Self {
        Self {
            source: source_root.and_then(Self::find_source_config),
            explicit: explicit.map(Path::to_path_buf),
        }
    }

    fn find_source_config(source_root: &Path) -> Option<PathBuf> {
        let path = source_root.join(SOURCE_CONFIG_FILE);
        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }

    /// Returns all config paths in merge order.
    pub fn all(&self) -> Vec<&PathBuf> {
        self.source.iter().chain(self.explicit.iter()).collect()
    }
}

/// Load a config file as a raw YAML value (for merging).
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist and
/// `ConfigParseError` if the YAML is invalid.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DecouplerError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DecouplerError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| DecouplerError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the embedded defaults as a raw YAML value.
pub fn load_default_value() -> Result<serde_yaml::Value> {
    let content = builtin::default_config()?;
    serde_yaml::from_str(content).map_err(|e| DecouplerError::ConfigParseError {
        path: "templates/defaults.yml".into(),
        message: e.to_string(),
    })
}

/// Load and merge every configuration layer.
///
/// # Errors
///
/// Returns `ConfigNotFound` if `--config` names a missing file and
/// `ConfigParseError` if any layer is invalid.
pub fn load_config(paths: &ConfigPaths) -> Result<DecoupleConfig> {
    let mut layers = vec![load_default_value()?];
    for path in paths.all() {
        tracing::debug!("Loading config layer {}", path.display());
        layers.push(load_config_value(path)?);
    }

    let merged = merge_configs(&layers);
    let origin = paths
        .explicit
        .clone()
        .or_else(|| paths.source.clone())
        .unwrap_or_else(|| PathBuf::from("templates/defaults.yml"));

    serde_yaml::from_value(merged).map_err(|e| DecouplerError::ConfigParseError {
        path: origin,
        message: e.to_string(),
    })
}
