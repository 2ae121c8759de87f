//! Built-in assets embedded at compile time.

use crate::error::{DecouplerError, Result};
use include_dir::{include_dir, Dir};
use std::collections::BTreeMap;

/// Embedded templates directory.
static TEMPLATES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Suffix stripped from embedded scaffold file names.
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// The embedded default configuration.
pub fn default_config() -> Result<&'static str> {
    let file = TEMPLATES_DIR.get_file("defaults.yml").ok_or_else(|| {
        DecouplerError::ConfigNotFound {
            path: "templates/defaults.yml".into(),
        }
    })?;

    file.contents_utf8()
        .ok_or_else(|| DecouplerError::ConfigParseError {
            path: "templates/defaults.yml".into(),
            message: "Invalid UTF-8".to_string(),
        })
}

/// Load all built-in scaffolds as name -> (relative path -> content).
pub fn load_scaffolds() -> Result<BTreeMap<String, BTreeMap<String, String>>> {
    let mut scaffolds = BTreeMap::new();

    if let Some(root) = TEMPLATES_DIR.get_dir("scaffolds") {
        for dir in root.dirs() {
            let Some(name) = dir.path().file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let mut files = BTreeMap::new();
            collect_files(dir, dir, &mut files)?;
            scaffolds.insert(name.to_string(), files);
        }
    }

    Ok(scaffolds)
}

fn collect_files(
    base: &Dir<'_>,
    dir: &Dir<'_>,
    files: &mut BTreeMap<String, String>,
) -> Result<()> {
    for file in dir.files() {
        let content = file
            .contents_utf8()
            .ok_or_else(|| DecouplerError::ConfigParseError {
                path: file.path().to_path_buf(),
                message: "Invalid UTF-8".to_string(),
            })?;

        let relative = file
            .path()
            .strip_prefix(base.path())
            .unwrap_or(file.path())
            .to_string_lossy()
            .replace('\\', "/");
        let relative = relative
            .strip_suffix(TEMPLATE_SUFFIX)
            .unwrap_or(&relative)
            .to_string();

        files.insert(relative, content.to_string());
    }

    for sub in dir.dirs() {
        collect_files(base, sub, files)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_embedded() {
        let content = default_config().unwrap();
        assert!(content.contains("rules:"));
    }

    #[test]
    fn terraform_scaffold_is_embedded() {
        let scaffolds = load_scaffolds().unwrap();
        let terraform = &scaffolds["terraform"];
        assert!(terraform.contains_key("main.tf"));
        assert!(terraform.contains_key("variables.tf"));
        assert!(terraform.contains_key("README.md"));
        assert!(terraform["main.tf"].contains("${var.project_name}"));
    }

    #[test]
    fn template_suffix_is_stripped() {
        let scaffolds = load_scaffolds().unwrap();
        for files in scaffolds.values() {
            for name in files.keys() {
                assert!(!name.ends_with(TEMPLATE_SUFFIX), "{}", name);
            }
        }
    }
}
