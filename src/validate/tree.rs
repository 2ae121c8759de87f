//! Read-only views of a generated tree.
//!
//! The validator reads through [`TreeView`] so that a real run (files on
//! disk) and a dry run (files captured in memory) are checked by the same
//! code.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read access to a generated tree, addressed by relative POSIX paths.
pub trait TreeView: Sync {
    /// Read a regular file. Returns `Ok(None)` for symlinks.
    fn read(&self, rel: &str) -> io::Result<Option<Vec<u8>>>;

    /// Whether `rel` is a directory.
    fn is_dir(&self, rel: &str) -> bool;

    /// Human-readable location of the tree.
    fn describe(&self) -> String;
}

/// A tree on disk.
#[derive(Debug, Clone)]
pub struct DiskTree {
    root: PathBuf,
}

impl DiskTree {
    /// View the tree rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TreeView for DiskTree {
    fn read(&self, rel: &str) -> io::Result<Option<Vec<u8>>> {
        let path = self.root.join(rel);
        if fs::symlink_metadata(&path)?.file_type().is_symlink() {
            return Ok(None);
        }
        fs::read(&path).map(Some)
    }

    fn is_dir(&self, rel: &str) -> bool {
        self.root.join(rel).is_dir()
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// A node captured by a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryNode {
    /// Regular file content.
    File(Vec<u8>),
    /// Symlink with its link text.
    Symlink(PathBuf),
}

/// A tree held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    nodes: BTreeMap<String, MemoryNode>,
}

impl MemoryTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node.
    pub fn insert(&mut self, rel: impl Into<String>, node: MemoryNode) {
        self.nodes.insert(rel.into(), node);
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    pub fn get(&self, rel: &str) -> Option<&MemoryNode> {
        self.nodes.get(rel)
    }
}

impl FromIterator<(String, MemoryNode)> for MemoryTree {
    fn from_iter<I: IntoIterator<Item = (String, MemoryNode)>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl TreeView for MemoryTree {
    fn read(&self, rel: &str) -> io::Result<Option<Vec<u8>>> {
        match self.nodes.get(rel) {
            Some(MemoryNode::File(content)) => Ok(Some(content.clone())),
            Some(MemoryNode::Symlink(_)) => Ok(None),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} was not produced", rel),
            )),
        }
    }

    fn is_dir(&self, rel: &str) -> bool {
        let rel = rel.trim_end_matches('/');
        if rel.is_empty() {
            return true;
        }
        let prefix = format!("{}/", rel);
        self.nodes
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(&prefix))
    }

    fn describe(&self) -> String {
        "(dry run)".to_string()
    }
}
