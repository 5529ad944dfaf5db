//! Fluent builder for system git commands.
//!
//! All git interaction goes through [`GitCommand`] so that working-directory
//! handling (`-C`), output capture, logging and error wrapping stay
//! consistent. Commands block the run until they finish: there is no timeout
//! or cancellation at this layer, and a failing command aborts its
//! dependency immediately.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use super::GitError;

/// Captured output of a finished git command.
#[derive(Debug)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Builder for one git invocation.
#[derive(Debug, Default)]
pub struct GitCommand {
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl GitCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the command inside the given repository via `git -C`.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Execute and return captured stdout/stderr.
    ///
    /// A non-zero exit status becomes [`GitError::CommandFailed`] carrying
    /// the subcommand name and the captured stderr; a missing git binary
    /// becomes [`GitError::NotFound`].
    pub async fn execute(self) -> Result<GitOutput, GitError> {
        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.clone());

        tracing::debug!(target: "git", "Executing command: git {}", full_args.join(" "));

        let output = Command::new("git")
            .args(&full_args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|error| {
                if error.kind() == std::io::ErrorKind::NotFound {
                    GitError::NotFound
                } else {
                    GitError::Io(error)
                }
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let operation = self.args.first().cloned().unwrap_or_default();
            tracing::debug!(target: "git", "Command failed ({operation}): {}", stderr.trim());
            return Err(GitError::CommandFailed {
                operation,
                stderr: stderr.trim().to_string(),
            });
        }

        tracing::trace!(target: "git", "Command completed successfully");
        Ok(GitOutput { stdout, stderr })
    }

    /// Execute, discarding the output.
    pub async fn execute_success(self) -> Result<(), GitError> {
        self.execute().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_args() {
        let cmd = GitCommand::new().arg("clone").args(["--quiet", "url"]);
        assert_eq!(cmd.args, vec!["clone", "--quiet", "url"]);
    }

    #[test]
    fn builder_records_working_directory() {
        let cmd = GitCommand::new().current_dir("/tmp/repo").arg("pull");
        assert_eq!(cmd.current_dir, Some(PathBuf::from("/tmp/repo")));
    }

    #[tokio::test]
    async fn version_succeeds_when_git_is_installed() {
        let output = GitCommand::new().arg("--version").execute().await.unwrap();
        assert!(output.stdout.contains("git version"));
    }

    #[tokio::test]
    async fn failed_command_carries_operation_and_stderr() {
        let error = GitCommand::new()
            .args(["rev-parse", "HEAD"])
            .current_dir(std::env::temp_dir())
            .execute()
            .await;
        // temp dir is not a repository
        match error {
            Err(GitError::CommandFailed { operation, stderr }) => {
                assert_eq!(operation, "rev-parse");
                assert!(!stderr.is_empty());
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }
}
