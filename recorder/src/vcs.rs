//! Version-control queries backing the save-event decision.
//!
//! The recorder needs exactly two answers from version control: whether a
//! path is tracked, and what its diff against the last committed state looks
//! like. Both are asked through the [`VcsQuery`] trait so the classification
//! logic can be exercised without a live repository; [`GitCli`] is the one
//! backing implementation, invoking the `git` binary scoped to the workspace
//! root.
//!
//! Failure semantics differ between the two queries and are part of the
//! contract: a failing tracked-check is an expected outcome ("untracked"),
//! while a failing diff is a fault that is logged by the caller and causes
//! the triggering save event to be dropped.

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors from the version-control backend.
#[derive(Error, Debug)]
pub enum VcsError {
    /// The `git` binary could not be launched.
    #[error("failed to launch git: {0}")]
    Spawn(#[from] std::io::Error),

    /// A git invocation exited unsuccessfully.
    #[error("git {args} failed: {stderr}")]
    CommandFailed {
        /// The arguments of the failing invocation.
        args: String,
        /// Trimmed stderr of the failing invocation.
        stderr: String,
    },
}

/// Result type for version-control operations.
pub type Result<T> = std::result::Result<T, VcsError>;

/// Tracked-status and diff queries, scoped to one workspace root.
#[async_trait]
pub trait VcsQuery: Send + Sync {
    /// Returns true if `path` is tracked by version control.
    ///
    /// Any underlying failure (path never committed, repository absent,
    /// backend unavailable) reports untracked; callers treat that as a
    /// signal, not a fault.
    async fn is_tracked(&self, path: &Path) -> bool;

    /// Returns the unified diff of `path` against its last committed state.
    ///
    /// An empty string means no textual difference.
    async fn diff(&self, path: &Path) -> Result<String>;
}

/// [`VcsQuery`] implementation invoking the `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Creates a git query adapter with `root` as the repository context.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the workspace root the adapter is scoped to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn run(&self, args: &[&str]) -> Result<Output> {
        let output = Command::new("git")
            .current_dir(&self.root)
            .args(args)
            .output()
            .await?;
        Ok(output)
    }
}

#[async_trait]
impl VcsQuery for GitCli {
    async fn is_tracked(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        match self
            .run(&["ls-files", "--error-unmatch", "--", path.as_ref()])
            .await
        {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!(path = %path, error = %e, "Tracked-check failed, treating as untracked");
                false
            }
        }
    }

    async fn diff(&self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy();
        let args = ["diff", "HEAD", "--", path_str.as_ref()];
        let output = self.run(&args).await?;

        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
