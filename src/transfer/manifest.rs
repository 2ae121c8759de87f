//! The generation manifest.
//!
//! The manifest is the authoritative record of what one run produced. It is
//! built by the transfer engine, written as pretty JSON to
//! `<target>/generation-manifest.json` and read back by the `validate`
//! subcommand. A new run replaces it; entries are never merged across runs.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::classify::Strategy;
use crate::error::{DecouplerError, Result};

/// File name of the manifest at the target root.
pub const MANIFEST_FILE: &str = "generation-manifest.json";

/// Outcome of one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Written,
    Failed,
}

/// One produced (or failed) output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Source path, `scaffold:<name>/<file>` for scaffolds, or the
    /// directory for structure markers.
    pub source_path: String,
    /// Path relative to the target root.
    pub target_path: String,
    pub strategy: Strategy,
    pub rendered_size_bytes: u64,
    /// Hex SHA-256 of the rendered bytes; empty for failed entries.
    pub sha256: String,
    pub status: EntryStatus,
    #[serde(default)]
    pub executable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ManifestEntry {
    /// Entry for successfully rendered content.
    pub fn written(
        source_path: impl Into<String>,
        target_path: impl Into<String>,
        strategy: Strategy,
        content: &[u8],
        executable: bool,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_path: target_path.into(),
            strategy,
            rendered_size_bytes: content.len() as u64,
            sha256: content_hash(content),
            status: EntryStatus::Written,
            executable,
            error: None,
        }
    }

    /// Entry for a path that could not be produced.
    pub fn failed(
        source_path: impl Into<String>,
        target_path: impl Into<String>,
        strategy: Strategy,
        error: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_path: target_path.into(),
            strategy,
            rendered_size_bytes: 0,
            sha256: String::new(),
            status: EntryStatus::Failed,
            executable: false,
            error: Some(error.into()),
        }
    }

    /// Whether the entry was written.
    pub fn is_written(&self) -> bool {
        self.status == EntryStatus::Written
    }
}

/// Record of a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationManifest {
    pub source_root: PathBuf,
    pub target_root: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub dry_run: bool,
    pub entries: Vec<ManifestEntry>,
}

impl GenerationManifest {
    /// Create an empty manifest.
    pub fn new(
        source_root: impl Into<PathBuf>,
        target_root: impl Into<PathBuf>,
        generated_at: DateTime<Utc>,
        dry_run: bool,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            target_root: target_root.into(),
            generated_at,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            dry_run,
            entries: Vec::new(),
        }
    }

    /// Replace the entries, sorted by target path.
    pub fn set_entries(&mut self, mut entries: Vec<ManifestEntry>) {
        entries.sort_by(|a, b| {
            a.target_path
                .cmp(&b.target_path)
                .then_with(|| a.source_path.cmp(&b.source_path))
        });
        self.entries = entries;
    }

    /// Entries that were written.
    pub fn written(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|e| e.is_written())
    }

    /// Number of failed entries.
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_written()).count()
    }

    /// Written entries per strategy.
    pub fn strategy_counts(&self) -> BTreeMap<Strategy, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.written() {
            *counts.entry(entry.strategy).or_insert(0) += 1;
        }
        counts
    }

    /// Look up an entry by target path.
    ///
    /// A target conflict leaves several entries for one target; the written
    /// one is returned, otherwise the first failed one.
    pub fn entry(&self, target_path: &str) -> Option<&ManifestEntry> {
        let start = self
            .entries
            .partition_point(|e| e.target_path.as_str() < target_path);
        let same: Vec<&ManifestEntry> = self.entries[start..]
            .iter()
            .take_while(|e| e.target_path == target_path)
            .collect();
        same.iter()
            .find(|e| e.is_written())
            .or_else(|| same.first())
            .copied()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| DecouplerError::ManifestError {
            path: self.target_root.join(MANIFEST_FILE),
            message: e.to_string(),
        })
    }

    /// Write the manifest to `<target_root>/generation-manifest.json`,
    /// replacing any previous manifest atomically.
    pub fn save(&self, target_root: &Path) -> Result<PathBuf> {
        let path = target_root.join(MANIFEST_FILE);
        let mut json = self.to_json()?;
        json.push('\n');

        fs::create_dir_all(target_root)?;
        let mut tmp = tempfile::NamedTempFile::new_in(target_root)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&path).map_err(|e| DecouplerError::Io(e.error))?;

        Ok(path)
    }

    /// Read `<target_root>/generation-manifest.json`.
    pub fn load(target_root: &Path) -> Result<Self> {
        let path = target_root.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path).map_err(|e| DecouplerError::ManifestError {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let mut manifest: Self =
            serde_json::from_str(&content).map_err(|e| DecouplerError::ManifestError {
                path: path.clone(),
                message: e.to_string(),
            })?;
        let entries = std::mem::take(&mut manifest.entries);
        manifest.set_entries(entries);
        Ok(manifest)
    }
}

/// Hex-encoded SHA-256 of `content`.
pub fn content_hash(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    hex::encode(&digest[..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn manifest() -> GenerationManifest {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut m = GenerationManifest::new("/src", "/out", at, false);
        m.set_entries(vec![
            ManifestEntry::written("b.txt", "b.txt", Strategy::FullCopy, b"b", false),
            ManifestEntry::failed("a.md", "a.md", Strategy::Genericize, "boom"),
            ManifestEntry::written("app/", "app/.gitkeep", Strategy::StructureOnly, b"", false),
        ]);
        m
    }

    #[test]
    fn entries_are_sorted_by_target() {
        let m = manifest();
        let targets: Vec<_> = m.entries.iter().map(|e| e.target_path.as_str()).collect();
        assert_eq!(targets, vec!["a.md", "app/.gitkeep", "b.txt"]);
    }

    #[test]
    fn hashes_and_sizes() {
        let m = manifest();
        let b = m.entry("b.txt").unwrap();
        assert_eq!(b.rendered_size_bytes, 1);
        assert_eq!(b.sha256, content_hash(b"b"));
        assert_eq!(b.sha256.len(), 64);

        let empty = m.entry("app/.gitkeep").unwrap();
        assert_eq!(
            empty.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn entry_prefers_written_on_conflict() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut m = GenerationManifest::new("/src", "/out", at, false);
        m.set_entries(vec![
            ManifestEntry::written("b/config.yml", "config.yml", Strategy::FullCopy, b"b", false),
            ManifestEntry::failed("a/config.yml", "config.yml", Strategy::FullCopy, "conflict"),
            ManifestEntry::failed("c/other.yml", "other.yml", Strategy::FullCopy, "boom"),
        ]);

        let entry = m.entry("config.yml").unwrap();
        assert!(entry.is_written());
        assert_eq!(entry.source_path, "b/config.yml");
        assert_eq!(m.entry("other.yml").unwrap().source_path, "c/other.yml");
        assert!(m.entry("missing.yml").is_none());
    }

    #[test]
    fn counts() {
        let m = manifest();
        assert_eq!(m.failed_count(), 1);
        assert_eq!(m.strategy_counts().get(&Strategy::FullCopy), Some(&1));
        assert_eq!(m.strategy_counts().get(&Strategy::Genericize), None);
    }

    #[test]
    fn json_uses_snake_case() {
        let json = manifest().to_json().unwrap();
        assert!(json.contains("\"rendered_size_bytes\""));
        assert!(json.contains("\"structure_only\""));
        assert!(json.contains("\"status\": \"failed\""));
    }

    #[test]
    fn save_and_load() {
        let temp = TempDir::new().unwrap();
        let m = manifest();
        let path = m.save(temp.path()).unwrap();
        assert!(path.ends_with(MANIFEST_FILE));

        let loaded = GenerationManifest::load(temp.path()).unwrap();
        assert_eq!(loaded, m);
    }

    #[test]
    fn load_missing_manifest_fails() {
        let temp = TempDir::new().unwrap();
        let err = GenerationManifest::load(temp.path()).unwrap_err();
        assert!(matches!(err, DecouplerError::ManifestError { .. }));
    }
}
