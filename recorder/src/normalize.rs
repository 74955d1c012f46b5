//! Event classification and normalization, the recorder's core.
//!
//! Consumes raw [`HostEvent`]s and decides, per event, whether and how it
//! enters the log:
//!
//! - Command completions are recorded unconditionally (commands are not
//!   path-scoped), with control sequences stripped from the output.
//! - Focus changes and path creation/deletion are relativized against the
//!   workspace root and pass through the scope filter.
//! - Saves are where the real decision lives: a tracked file is recorded as
//!   a unified diff against its last committed state, unless the diff is
//!   empty, in which case the save is not recorded at all; an untracked file
//!   (or one whose tracked-check fails) is recorded as its full text, every
//!   save, regardless of whether the content changed.
//!
//! The normalizer holds no state across events beyond the read-only scope
//! filter and version-control adapter, so classification is unit-testable
//! without a live event source.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::ansi::strip_ansi;
use crate::scope::ScopeFilter;
use crate::types::{EntryPayload, HostEvent};
use crate::vcs::VcsQuery;

/// Per-session event classifier.
pub struct Normalizer {
    root: PathBuf,
    filter: Arc<ScopeFilter>,
    vcs: Arc<dyn VcsQuery>,
}

impl Normalizer {
    /// Creates a classifier for the given workspace root.
    #[must_use]
    pub fn new(root: PathBuf, filter: Arc<ScopeFilter>, vcs: Arc<dyn VcsQuery>) -> Self {
        Self { root, filter, vcs }
    }

    /// Classifies one raw event into a log payload, or nothing.
    ///
    /// `None` means the event is out of scope, changed nothing worth
    /// recording, or hit a query fault that drops it (logged, never
    /// escalated).
    pub async fn normalize(&self, event: HostEvent) -> Option<EntryPayload> {
        match event {
            HostEvent::CommandCompleted { command, output } => Some(EntryPayload::Command {
                command,
                output: strip_ansi(&output),
            }),

            HostEvent::FocusChanged { path } => {
                let path = self.in_scope_relative(&path)?;
                Some(EntryPayload::FileFocus { path })
            }

            HostEvent::PathCreated { path } => {
                let path = self.in_scope_relative(&path)?;
                Some(EntryPayload::FileCreate {
                    path,
                    data: String::new(),
                })
            }

            HostEvent::PathDeleted { path } => {
                let path = self.in_scope_relative(&path)?;
                Some(EntryPayload::FileDelete {
                    path,
                    data: String::new(),
                })
            }

            HostEvent::DocumentSaved { path, text } => {
                let relative = self.in_scope_relative(&path)?;

                if self.vcs.is_tracked(&path).await {
                    match self.vcs.diff(&path).await {
                        Ok(diff) if diff.is_empty() => {
                            debug!(path = %relative, "Save changed nothing, not recording");
                            None
                        }
                        Ok(diff) => Some(EntryPayload::FileDiff {
                            path: relative,
                            data: diff,
                        }),
                        Err(e) => {
                            warn!(path = %relative, error = %e, "Diff query failed, dropping save event");
                            None
                        }
                    }
                } else {
                    Some(EntryPayload::FileContent {
                        path: relative,
                        data: text,
                    })
                }
            }
        }
    }

    /// Relativizes `path` against the workspace root and applies the scope
    /// filter. Paths outside the workspace are out of scope.
    fn in_scope_relative(&self, path: &Path) -> Option<String> {
        let relative = match path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().into_owned(),
            Err(_) => {
                trace!(path = %path.display(), "Path outside workspace, ignoring");
                return None;
            }
        };

        if self.filter.is_in_scope(&relative) {
            Some(relative)
        } else {
            trace!(path = %relative, "Path out of scope, ignoring");
            None
        }
    }
}
