//! Output writers.
//!
//! The transfer engine never touches the target tree directly. Real runs use
//! [`DiskWriter`]; dry runs use [`MemoryWriter`], which performs the same
//! write transition against an in-memory tree.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::PathError;
use crate::validate::tree::{MemoryNode, MemoryTree};

/// Destination for rendered output.
pub trait OutputWriter: Send + Sync {
    /// Write `content` to the relative path `rel`.
    ///
    /// `permissions` are copied from the source file when available.
    fn write_file(
        &self,
        rel: &str,
        content: &[u8],
        permissions: Option<&fs::Permissions>,
    ) -> Result<(), PathError>;

    /// Create a symlink at `rel` pointing to `link`.
    fn write_symlink(&self, rel: &str, link: &Path) -> Result<(), PathError>;

    /// Whether this writer leaves the filesystem untouched.
    fn is_dry_run(&self) -> bool;
}

/// Writes files atomically below a target root.
#[derive(Debug, Clone)]
pub struct DiskWriter {
    root: PathBuf,
}

impl DiskWriter {
    /// Create a writer for `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn prepare(&self, rel: &str) -> Result<(PathBuf, PathBuf), PathError> {
        let dest = self.root.join(rel);
        let parent = dest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        fs::create_dir_all(&parent).map_err(|e| PathError::io(rel, e))?;
        Ok((dest, parent))
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

impl OutputWriter for DiskWriter {
    fn write_file(
        &self,
        rel: &str,
        content: &[u8],
        permissions: Option<&fs::Permissions>,
    ) -> Result<(), PathError> {
        let (dest, parent) = self.prepare(rel)?;

        // The temp file lives next to the destination so the final rename
        // never crosses a filesystem boundary.
        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| PathError::io(rel, e))?;
        tmp.write_all(content).map_err(|e| PathError::io(rel, e))?;
        tmp.as_file().sync_all().map_err(|e| PathError::io(rel, e))?;

        if let Some(perms) = permissions.cloned().or_else(default_permissions) {
            tmp.as_file()
                .set_permissions(perms)
                .map_err(|e| PathError::io(rel, e))?;
        }

        tmp.persist(&dest).map_err(|e| PathError::io(rel, e.error))?;
        tracing::debug!("Wrote {} ({} bytes)", rel, content.len());
        Ok(())
    }

    #[cfg(unix)]
    fn write_symlink(&self, rel: &str, link: &Path) -> Result<(), PathError> {
        let (dest, parent) = self.prepare(rel)?;
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = parent.join(format!(".{}.{}.decoupler-tmp", name, std::process::id()));

        if fs::symlink_metadata(&tmp).is_ok() {
            fs::remove_file(&tmp).map_err(|e| PathError::io(rel, e))?;
        }
        std::os::unix::fs::symlink(link, &tmp).map_err(|e| PathError::io(rel, e))?;
        if let Err(e) = fs::rename(&tmp, &dest) {
            let _ = fs::remove_file(&tmp);
            return Err(PathError::io(rel, e));
        }

        tracing::debug!("Linked {} -> {}", rel, link.display());
        Ok(())
    }

    #[cfg(not(unix))]
    fn write_symlink(&self, rel: &str, _link: &Path) -> Result<(), PathError> {
        Err(PathError::io(
            rel,
            std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "symlinks are only recreated on unix targets",
            ),
        ))
    }

    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Captures output in memory instead of writing it.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    nodes: Mutex<Vec<(String, MemoryNode)>>,
}

impl MemoryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, rel: &str, node: MemoryNode) {
        let mut nodes = self.nodes.lock().unwrap_or_else(|e| e.into_inner());
        nodes.push((rel.to_string(), node));
    }

    /// The captured tree.
    pub fn into_tree(self) -> MemoryTree {
        self.nodes
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .into_iter()
            .collect()
    }
}

impl OutputWriter for MemoryWriter {
    fn write_file(
        &self,
        rel: &str,
        content: &[u8],
        _permissions: Option<&fs::Permissions>,
    ) -> Result<(), PathError> {
        self.push(rel, MemoryNode::File(content.to_vec()));
        Ok(())
    }

    fn write_symlink(&self, rel: &str, link: &Path) -> Result<(), PathError> {
        self.push(rel, MemoryNode::Symlink(link.to_path_buf()));
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::tree::TreeView;
    use tempfile::TempDir;

    #[test]
    fn disk_writer_creates_parents() {
        let temp = TempDir::new().unwrap();
        let writer = DiskWriter::new(temp.path());

        writer.write_file("a/b/c.txt", b"hello", None).unwrap();
        assert_eq!(fs::read_to_string(temp.path().join("a/b/c.txt")).unwrap(), "hello");
    }

    #[test]
    fn disk_writer_overwrites() {
        let temp = TempDir::new().unwrap();
        let writer = DiskWriter::new(temp.path());

        writer.write_file("x.txt", b"one", None).unwrap();
        writer.write_file("x.txt", b"two", None).unwrap();
        assert_eq!(fs::read_to_string(temp.path().join("x.txt")).unwrap(), "two");
    }

    #[test]
    fn disk_writer_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let writer = DiskWriter::new(temp.path());
        writer.write_file("x.txt", b"data", None).unwrap();

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("x.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn disk_writer_preserves_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let writer = DiskWriter::new(temp.path());
        let perms = fs::Permissions::from_mode(0o755);

        writer.write_file("run.sh", b"#!/bin/sh\n", Some(&perms)).unwrap();
        let mode = fs::metadata(temp.path().join("run.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);

        writer.write_file("plain.txt", b"x", None).unwrap();
        let mode = fs::metadata(temp.path().join("plain.txt"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn disk_writer_creates_symlinks() {
        let temp = TempDir::new().unwrap();
        let writer = DiskWriter::new(temp.path());
        writer.write_file("real.txt", b"x", None).unwrap();
        writer.write_symlink("alias.txt", Path::new("real.txt")).unwrap();

        let link = temp.path().join("alias.txt");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("real.txt"));
    }

    #[test]
    fn memory_writer_captures_without_touching_disk() {
        let writer = MemoryWriter::new();
        writer.write_file("app/.gitkeep", b"", None).unwrap();
        writer.write_file("README.md", b"Hello", None).unwrap();
        assert!(writer.is_dry_run());

        let tree = writer.into_tree();
        assert_eq!(tree.len(), 2);
        assert!(tree.is_dir("app"));
        assert_eq!(tree.read("README.md").unwrap(), Some(b"Hello".to_vec()));
    }
}
