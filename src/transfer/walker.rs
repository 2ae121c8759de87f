//! Source tree walking.
//!
//! The walker visits every file and symlink below the source root exactly
//! once. It never follows symlinks; each link is inspected on its own and
//! rejected when it escapes the root, cannot be resolved, or points at a
//! directory on its own ancestor chain (which would recurse forever if
//! followed).

use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::classify::PathPattern;
use crate::error::{DecouplerError, PathError, Result};

use super::deadline::Deadline;

/// What kind of filesystem object a source entry is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A symlink that resolves inside the source root.
    Symlink {
        /// Link text to recreate (always relative).
        link: PathBuf,
        /// Whether the link resolves to a directory.
        is_dir: bool,
    },
}

/// A walked source path.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// POSIX-style path relative to the source root.
    pub rel_path: String,
    /// Absolute path on disk.
    pub abs_path: PathBuf,
    pub kind: EntryKind,
}

/// A path that could not be walked.
#[derive(Debug)]
pub struct WalkFailure {
    pub rel_path: String,
    pub error: PathError,
}

/// Result of a walk.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Walked entries, sorted by relative path.
    pub entries: Vec<SourceEntry>,
    /// Per-path failures, sorted by relative path.
    pub failures: Vec<WalkFailure>,
    /// Whether the time budget ran out before the walk finished.
    pub incomplete: bool,
}

/// Walks a source tree.
#[derive(Debug, Clone)]
pub struct SourceWalker {
    root: PathBuf,
    excludes: Vec<PathPattern>,
    skipped_subtrees: Vec<String>,
}

impl SourceWalker {
    /// Create a walker for `root`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSource` if the root is not a readable directory and
    /// `ConfigValidationError` if an exclude pattern does not parse.
    pub fn new(root: &Path, excludes: &[String]) -> Result<Self> {
        let root = fs::canonicalize(root).map_err(|e| DecouplerError::InvalidSource {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;
        if !root.is_dir() {
            return Err(DecouplerError::InvalidSource {
                path: root,
                message: "not a directory".to_string(),
            });
        }

        let excludes = excludes
            .iter()
            .map(|p| PathPattern::parse(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            root,
            excludes,
            skipped_subtrees: Vec::new(),
        })
    }

    /// The canonical source root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Never descend into `dir` (used when the target lives inside the
    /// source). Paths outside the root are ignored.
    pub fn skip_subtree(mut self, dir: &Path) -> Self {
        if let Ok(canonical) = fs::canonicalize(dir) {
            if let Ok(rel) = canonical.strip_prefix(&self.root) {
                if let Some(rel) = to_posix(rel) {
                    if !rel.is_empty() {
                        self.skipped_subtrees.push(rel);
                    }
                }
            }
        }
        self
    }

    fn is_excluded(&self, rel: &str, is_dir: bool) -> bool {
        let skipped = self
            .skipped_subtrees
            .iter()
            .any(|s| rel == s || rel.strip_prefix(s.as_str()).is_some_and(|r| r.starts_with('/')));
        skipped
            || self.excludes.iter().any(|pattern| {
                pattern.matches(rel)
                    || (is_dir && matches!(pattern, PathPattern::DirPrefix(d) if d == rel))
            })
    }

    /// Walk the tree.
    pub fn walk(&self, deadline: &Deadline) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();
        let mut it = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(next) = it.next() {
            if deadline.expired() {
                tracing::warn!("Time budget exhausted while walking {}", self.root.display());
                outcome.incomplete = true;
                break;
            }

            let entry = match next {
                Ok(entry) => entry,
                Err(err) => {
                    let rel = err
                        .path()
                        .and_then(|p| p.strip_prefix(&self.root).ok())
                        .map(|p| p.to_string_lossy().replace('\\', "/"))
                        .unwrap_or_default();
                    let io = err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("walk error"));
                    outcome.failures.push(WalkFailure {
                        error: PathError::io(rel.clone(), io),
                        rel_path: rel,
                    });
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let file_type = entry.file_type();
            let rel_os = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            let Some(rel) = to_posix(rel_os) else {
                let lossy = rel_os.to_string_lossy().replace('\\', "/");
                outcome.failures.push(WalkFailure {
                    error: PathError::NonUtf8 {
                        path: lossy.clone(),
                    },
                    rel_path: lossy,
                });
                if file_type.is_dir() {
                    it.skip_current_dir();
                }
                continue;
            };

            if self.is_excluded(&rel, file_type.is_dir()) {
                tracing::debug!("Excluded {}", rel);
                if file_type.is_dir() {
                    it.skip_current_dir();
                }
                continue;
            }

            if file_type.is_dir() {
                continue;
            }

            let abs_path = entry.path().to_path_buf();
            if file_type.is_symlink() {
                match self.inspect_symlink(&abs_path, &rel) {
                    Ok(kind) => outcome.entries.push(SourceEntry {
                        rel_path: rel,
                        abs_path,
                        kind,
                    }),
                    Err(error) => outcome.failures.push(WalkFailure {
                        rel_path: rel,
                        error,
                    }),
                }
            } else {
                outcome.entries.push(SourceEntry {
                    rel_path: rel,
                    abs_path,
                    kind: EntryKind::File,
                });
            }
        }

        outcome.entries.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        outcome.failures.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        tracing::info!(
            "Walked {}: {} entries, {} failures",
            self.root.display(),
            outcome.entries.len(),
            outcome.failures.len()
        );
        outcome
    }

    fn inspect_symlink(&self, abs: &Path, rel: &str) -> std::result::Result<EntryKind, PathError> {
        let link = fs::read_link(abs).map_err(|e| PathError::io(rel, e))?;
        let resolved =
            fs::canonicalize(abs).map_err(|e| PathError::SymlinkUnresolvable {
                path: rel.to_string(),
                message: e.to_string(),
            })?;

        let Ok(resolved_rel) = resolved.strip_prefix(&self.root) else {
            return Err(PathError::SymlinkEscapesRoot {
                path: rel.to_string(),
                target: resolved,
            });
        };

        let is_dir = resolved.is_dir();
        let link_dir = abs.parent().unwrap_or(&self.root);
        // The directories between the root and the link are the ones already
        // being visited; a link back to any of them is a cycle.
        if is_dir && link_dir.starts_with(&resolved) {
            return Err(PathError::SymlinkCycle {
                path: rel.to_string(),
                target: resolved,
            });
        }

        let link = if link.is_absolute() {
            let rel_dir = Path::new(rel).parent().unwrap_or(Path::new(""));
            relative_link(rel_dir, resolved_rel)
        } else {
            link
        };

        Ok(EntryKind::Symlink { link, is_dir })
    }
}

/// Convert a relative path into a `/`-separated string.
fn to_posix(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Relative link text from directory `from` to `to` (both root-relative).
fn relative_link(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut link = PathBuf::new();
    for _ in common..from.len() {
        link.push("..");
    }
    for part in &to[common..] {
        link.push(part.as_os_str());
    }
    if link.as_os_str().is_empty() {
        link.push(".");
    }
    link
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(60))
    }

    fn rels(outcome: &WalkOutcome) -> Vec<&str> {
        outcome.entries.iter().map(|e| e.rel_path.as_str()).collect()
    }

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("app/lib")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join("README.md"), "hi").unwrap();
        fs::write(root.join("app/index.js"), "x").unwrap();
        fs::write(root.join("app/lib/util.js"), "y").unwrap();
        fs::write(root.join(".git/HEAD"), "ref").unwrap();
        temp
    }

    #[test]
    fn walks_files_sorted() {
        let temp = fixture();
        let walker = SourceWalker::new(temp.path(), &[]).unwrap();
        let outcome = walker.walk(&deadline());

        assert_eq!(
            rels(&outcome),
            vec![".git/HEAD", "README.md", "app/index.js", "app/lib/util.js"]
        );
        assert!(outcome.failures.is_empty());
        assert!(!outcome.incomplete);
    }

    #[test]
    fn excludes_directories() {
        let temp = fixture();
        let walker = SourceWalker::new(temp.path(), &[".git/".to_string()]).unwrap();
        let outcome = walker.walk(&deadline());
        assert_eq!(rels(&outcome), vec!["README.md", "app/index.js", "app/lib/util.js"]);
    }

    #[test]
    fn skips_target_inside_source() {
        let temp = fixture();
        fs::create_dir_all(temp.path().join("out")).unwrap();
        fs::write(temp.path().join("out/old.txt"), "z").unwrap();

        let walker = SourceWalker::new(temp.path(), &[".git/".to_string()])
            .unwrap()
            .skip_subtree(&temp.path().join("out"));
        let outcome = walker.walk(&deadline());
        assert!(!rels(&outcome).contains(&"out/old.txt"));
    }

    #[test]
    fn expired_budget_marks_incomplete() {
        let temp = fixture();
        let walker = SourceWalker::new(temp.path(), &[]).unwrap();
        let outcome = walker.walk(&Deadline::after(Duration::ZERO));
        assert!(outcome.incomplete);
        assert!(outcome.entries.is_empty());
    }

    #[test]
    fn missing_root_is_invalid_source() {
        let temp = TempDir::new().unwrap();
        let result = SourceWalker::new(&temp.path().join("missing"), &[]);
        assert!(matches!(result, Err(DecouplerError::InvalidSource { .. })));
    }

    #[test]
    fn relative_link_paths() {
        assert_eq!(
            relative_link(Path::new("a/b"), Path::new("a/c/file")),
            PathBuf::from("../c/file")
        );
        assert_eq!(relative_link(Path::new(""), Path::new("x")), PathBuf::from("x"));
        assert_eq!(relative_link(Path::new("a"), Path::new("a")), PathBuf::from("."));
    }

    #[cfg(unix)]
    mod symlinks {
        use super::*;
        use std::os::unix::fs::symlink;

        #[test]
        fn safe_file_link_is_kept() {
            let temp = fixture();
            symlink("README.md", temp.path().join("LINK.md")).unwrap();

            let walker = SourceWalker::new(temp.path(), &[".git/".to_string()]).unwrap();
            let outcome = walker.walk(&deadline());
            let entry = outcome
                .entries
                .iter()
                .find(|e| e.rel_path == "LINK.md")
                .unwrap();
            assert_eq!(
                entry.kind,
                EntryKind::Symlink {
                    link: PathBuf::from("README.md"),
                    is_dir: false
                }
            );
        }

        #[test]
        fn absolute_link_is_made_relative() {
            let temp = fixture();
            let canonical = fs::canonicalize(temp.path()).unwrap();
            symlink(canonical.join("app/index.js"), temp.path().join("app/lib/entry.js")).unwrap();

            let walker = SourceWalker::new(temp.path(), &[".git/".to_string()]).unwrap();
            let outcome = walker.walk(&deadline());
            let entry = outcome
                .entries
                .iter()
                .find(|e| e.rel_path == "app/lib/entry.js")
                .unwrap();
            assert_eq!(
                entry.kind,
                EntryKind::Symlink {
                    link: PathBuf::from("../index.js"),
                    is_dir: false
                }
            );
        }

        #[test]
        fn escaping_link_fails_only_that_path() {
            let temp = fixture();
            let outside = TempDir::new().unwrap();
            fs::write(outside.path().join("secret"), "s").unwrap();
            symlink(outside.path().join("secret"), temp.path().join("leak")).unwrap();

            let walker = SourceWalker::new(temp.path(), &[".git/".to_string()]).unwrap();
            let outcome = walker.walk(&deadline());

            assert_eq!(outcome.failures.len(), 1);
            assert_eq!(outcome.failures[0].rel_path, "leak");
            assert!(matches!(
                outcome.failures[0].error,
                PathError::SymlinkEscapesRoot { .. }
            ));
            assert!(rels(&outcome).contains(&"README.md"));
        }

        #[test]
        fn cycle_link_is_detected() {
            let temp = fixture();
            symlink("..", temp.path().join("app/lib/up")).unwrap();

            let walker = SourceWalker::new(temp.path(), &[".git/".to_string()]).unwrap();
            let outcome = walker.walk(&deadline());

            assert_eq!(outcome.failures.len(), 1);
            assert!(matches!(
                outcome.failures[0].error,
                PathError::SymlinkCycle { .. }
            ));
        }

        #[test]
        fn dangling_link_is_unresolvable() {
            let temp = fixture();
            symlink("nowhere", temp.path().join("dangling")).unwrap();

            let walker = SourceWalker::new(temp.path(), &[".git/".to_string()]).unwrap();
            let outcome = walker.walk(&deadline());

            assert!(matches!(
                outcome.failures[0].error,
                PathError::SymlinkUnresolvable { .. }
            ));
        }

        #[test]
        fn sibling_directory_link_is_allowed() {
            let temp = fixture();
            symlink("app/lib", temp.path().join("lib")).unwrap();

            let walker = SourceWalker::new(temp.path(), &[".git/".to_string()]).unwrap();
            let outcome = walker.walk(&deadline());
            assert!(outcome.failures.is_empty());
            let entry = outcome.entries.iter().find(|e| e.rel_path == "lib").unwrap();
            assert!(matches!(entry.kind, EntryKind::Symlink { is_dir: true, .. }));
        }
    }
}
