//! Scope filtering for workspace paths.
//!
//! Decides, per workspace-relative path, whether an event is worth recording.
//! Three rules apply in order: an empty path is out of scope, anything under
//! the version-control metadata prefix (`.git`) is out of scope, and anything
//! matched by the session's ignore rules is out of scope. Everything else is
//! in scope.
//!
//! The ignore rules follow gitignore pattern semantics (ordered patterns,
//! later patterns override earlier ones, `!` re-inclusion, trailing-slash
//! directory patterns, `**` across segments) and are built once per recording
//! session from the workspace's ignore specification file. A missing or
//! unreadable file degrades to an empty rule set, not an error.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, warn};

/// Version-control metadata prefix.
///
/// Checked as a plain string prefix: `.git/`, `.git`, and `.gitignore` are
/// all excluded.
const VCS_METADATA_PREFIX: &str = ".git";

/// Immutable per-session path filter.
///
/// Built at session start and read-only for the session's lifetime. The
/// filter itself is pure and stateless; every event is evaluated fresh.
#[derive(Debug)]
pub struct ScopeFilter {
    rules: Gitignore,
}

impl ScopeFilter {
    /// Creates a filter with no ignore rules; only the empty-path and
    /// `.git`-prefix rules apply.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: Gitignore::empty(),
        }
    }

    /// Builds a filter from ignore-specification text.
    ///
    /// `root` anchors the rules the way a `.gitignore` at the workspace root
    /// would. Unparseable lines are skipped with a warning; they never fail
    /// the build.
    #[must_use]
    pub fn from_patterns(root: &Path, patterns: &str) -> Self {
        let mut builder = GitignoreBuilder::new(root);

        for line in patterns.lines() {
            if let Err(e) = builder.add_line(None, line) {
                warn!(pattern = line, error = %e, "Skipping unparseable ignore pattern");
            }
        }

        match builder.build() {
            Ok(rules) => Self { rules },
            Err(e) => {
                warn!(error = %e, "Failed to build ignore rules, using none");
                Self::empty()
            }
        }
    }

    /// Loads the filter from `<root>/<ignore_file>`.
    ///
    /// Absence of the file is the common case for fresh workspaces and yields
    /// an empty rule set.
    pub async fn load(root: &Path, ignore_file: &str) -> Self {
        let path = root.join(ignore_file);
        match tokio::fs::read_to_string(&path).await {
            Ok(patterns) => {
                debug!(path = %path.display(), "Loaded ignore rules");
                Self::from_patterns(root, &patterns)
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No ignore file, recording everything");
                Self::empty()
            }
        }
    }

    /// Returns true if an event for this workspace-relative path should be
    /// recorded.
    #[must_use]
    pub fn is_in_scope(&self, relative_path: &str) -> bool {
        if relative_path.is_empty() {
            return false;
        }
        if relative_path.starts_with(VCS_METADATA_PREFIX) {
            return false;
        }
        !self
            .rules
            .matched_path_or_any_parents(relative_path, false)
            .is_ignore()
    }
}
