//! Git collaborator.
//!
//! Git is only ever used as an external binary: checking that the source is
//! a repository, reading `user.name` for the `AUTHOR` binding, and
//! optionally committing the generated tree.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

use crate::validate::ValidationFinding;

/// Finding id for a failed post-run git step.
pub const GIT_FAILED: &str = "git-failed";

/// Identity used when the target repository has none configured.
const FALLBACK_NAME: &str = "decoupler";
const FALLBACK_EMAIL: &str = "decoupler@localhost";

/// Version control operations used by a run.
pub trait VersionControl: Send + Sync {
    /// Whether `path` is inside a repository.
    fn is_repository(&self, path: &Path) -> bool;

    /// Configured `user.name` as seen from `path`.
    fn user_name(&self, path: &Path) -> Option<String>;

    /// Initialize a repository at `path` and commit everything in it.
    fn init_and_commit(&self, path: &Path, message: &str) -> Result<()>;
}

/// Shells out to the `git` binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl GitCli {
    fn run(&self, path: &Path, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(path)
            .output()
            .with_context(|| format!("failed to run git {}", args.join(" ")))?;

        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn config_value(&self, path: &Path, key: &str) -> Option<String> {
        self.run(path, &["config", key])
            .ok()
            .filter(|v| !v.is_empty())
    }
}

impl VersionControl for GitCli {
    fn is_repository(&self, path: &Path) -> bool {
        self.run(path, &["rev-parse", "--git-dir"]).is_ok()
    }

    fn user_name(&self, path: &Path) -> Option<String> {
        self.config_value(path, "user.name")
    }

    fn init_and_commit(&self, path: &Path, message: &str) -> Result<()> {
        self.run(path, &["init"])?;
        self.run(path, &["add", "-A"])?;

        let mut args: Vec<String> = Vec::new();
        if self.config_value(path, "user.name").is_none() {
            args.extend(["-c".to_string(), format!("user.name={}", FALLBACK_NAME)]);
        }
        if self.config_value(path, "user.email").is_none() {
            args.extend(["-c".to_string(), format!("user.email={}", FALLBACK_EMAIL)]);
        }
        args.extend(["commit".to_string(), "-m".to_string(), message.to_string()]);

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(path, &args)?;
        tracing::info!("Committed generated tree in {}", path.display());
        Ok(())
    }
}

/// Commit the target tree, converting failure into a fatal finding.
pub fn commit_target(vcs: &dyn VersionControl, target: &Path) -> Option<ValidationFinding> {
    let message = format!(
        "Initial template generated by decoupler {}",
        env!("CARGO_PKG_VERSION")
    );
    match vcs.init_and_commit(target, &message) {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!("git commit failed: {:#}", e);
            Some(ValidationFinding::fatal(GIT_FAILED, format!("{:#}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FailingVcs;

    impl VersionControl for FailingVcs {
        fn is_repository(&self, _path: &Path) -> bool {
            false
        }
        fn user_name(&self, _path: &Path) -> Option<String> {
            None
        }
        fn init_and_commit(&self, _path: &Path, _message: &str) -> Result<()> {
            bail!("git init failed: permission denied")
        }
    }

    #[test]
    fn commit_failure_becomes_fatal_finding() {
        let temp = TempDir::new().unwrap();
        let finding = commit_target(&FailingVcs, temp.path()).unwrap();
        assert_eq!(finding.rule_id.as_str(), GIT_FAILED);
        assert!(finding.is_fatal());
        assert!(finding.message.contains("permission denied"));
    }

    #[test]
    fn plain_directory_is_not_a_repository() {
        let temp = TempDir::new().unwrap();
        assert!(!GitCli.is_repository(temp.path()));
    }

    #[test]
    fn init_and_commit_creates_repository() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("README.md"), "hello").unwrap();

        assert!(commit_target(&GitCli, temp.path()).is_none());
        assert!(GitCli.is_repository(temp.path()));
        let log = GitCli.run(temp.path(), &["log", "--oneline"]).unwrap();
        assert!(log.contains("Initial template generated by decoupler"));
    }
}
