//! Git operations wrapper using the system git command.
//!
//! Like Cargo, depcmake shells out to the installed `git` binary instead of
//! linking a git library: authentication, proxies and credential helpers
//! then work exactly as they do on the user's command line.
//!
//! [`GitRepo`] covers the three operations the fetch stage needs: clone,
//! pull of the default branch, and checkout of a pinned revision.

pub mod command_builder;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use command_builder::{GitCommand, GitOutput};

/// Low-level git failures, wrapped into unit-level errors by the
/// dependency layer.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git is not installed or not found in PATH")]
    NotFound,

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Handle on a local clone in the fetch cache.
#[derive(Debug)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Wrap an existing clone. No validation happens here.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Clone a repository into `target`.
    pub async fn clone(url: &str, target: impl AsRef<Path>) -> Result<Self, GitError> {
        let target = target.as_ref();
        GitCommand::new()
            .args(["clone", url])
            .arg(target.display().to_string())
            .execute_success()
            .await?;
        Ok(Self::new(target))
    }

    /// Re-attach to the remote default branch and pull it.
    ///
    /// A previous run may have left the clone on a detached, pinned
    /// revision; checking the default branch out first makes the pull
    /// well-defined.
    pub async fn pull_default_branch(&self) -> Result<(), GitError> {
        let branch = self.default_branch().await?;
        GitCommand::new()
            .current_dir(&self.path)
            .args(["checkout", &branch])
            .execute_success()
            .await?;
        GitCommand::new()
            .current_dir(&self.path)
            .arg("pull")
            .execute_success()
            .await
    }

    /// Check out a revision (branch, tag or commit), detaching if needed.
    pub async fn checkout(&self, revision: &str) -> Result<(), GitError> {
        GitCommand::new()
            .current_dir(&self.path)
            .args(["checkout", revision])
            .execute_success()
            .await
    }

    /// The remote default branch, falling back to the current branch when
    /// the remote HEAD reference is not recorded locally.
    async fn default_branch(&self) -> Result<String, GitError> {
        let remote_head = GitCommand::new()
            .current_dir(&self.path)
            .args(["symbolic-ref", "--short", "refs/remotes/origin/HEAD"])
            .execute()
            .await;

        if let Ok(output) = remote_head {
            if let Some(branch) = output.stdout.trim().strip_prefix("origin/") {
                return Ok(branch.to_string());
            }
        }

        let output = GitCommand::new()
            .current_dir(&self.path)
            .args(["rev-parse", "--abbrev-ref", "HEAD"])
            .execute()
            .await?;
        Ok(output.stdout.trim().to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Availability probe for the version-control client.
pub fn ensure_git_available() -> Result<(), GitError> {
    which::which("git").map_err(|_| GitError::NotFound)?;
    Ok(())
}
