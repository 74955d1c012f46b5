//! Entry and event types for session recording.
//!
//! This module defines the schema of the recorded log, [`LogEntry`] and its
//! payload variants, and [`HostEvent`], the raw event vocabulary consumed
//! from the host environment.
//!
//! Entries serialize to flat JSON objects with a `type` discriminator in
//! SCREAMING_SNAKE_CASE; fields that do not apply to a kind are omitted
//! entirely rather than serialized as null:
//!
//! ```json
//! { "timestamp": 1736970000000, "type": "COMMAND", "command": "echo hi", "output": "hi\n" }
//! { "timestamp": 1736970000412, "type": "FILE_CREATE", "path": "src/lib.rs", "data": "" }
//! { "timestamp": 1736970001003, "type": "FILE_FOCUS", "path": "README.md" }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single recorded operation.
///
/// Entries are immutable once appended to the session log: they are never
/// mutated, reordered, or removed. Timestamps are assigned at the moment the
/// entry is accepted into the log and are monotonically non-decreasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch, assigned at append time.
    pub timestamp: u64,

    /// Kind-specific payload, flattened next to the timestamp.
    #[serde(flatten)]
    pub payload: EntryPayload,
}

/// Payload variants for each entry kind.
///
/// Exactly one payload shape exists per kind; no variant mixes command and
/// file-path fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryPayload {
    /// A terminal command finished executing.
    Command {
        /// The command line as entered.
        command: String,
        /// Full captured output with terminal control sequences stripped.
        output: String,
    },
    /// A path appeared in the workspace.
    FileCreate {
        /// Workspace-relative path.
        path: String,
        /// Always empty; kept for schema uniformity with the other file kinds.
        data: String,
    },
    /// A path disappeared from the workspace.
    FileDelete {
        /// Workspace-relative path.
        path: String,
        /// Always empty; kept for schema uniformity with the other file kinds.
        data: String,
    },
    /// A tracked file was saved with changes against its last committed state.
    FileDiff {
        /// Workspace-relative path.
        path: String,
        /// Unified diff text.
        data: String,
    },
    /// An untracked file was saved; the full text is recorded.
    FileContent {
        /// Workspace-relative path.
        path: String,
        /// Full file text at save time.
        data: String,
    },
    /// The actively focused document changed.
    FileFocus {
        /// Workspace-relative path.
        path: String,
    },
}

impl EntryPayload {
    /// Returns the wire name of this entry kind, e.g. `"FILE_DIFF"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Command { .. } => "COMMAND",
            Self::FileCreate { .. } => "FILE_CREATE",
            Self::FileDelete { .. } => "FILE_DELETE",
            Self::FileDiff { .. } => "FILE_DIFF",
            Self::FileContent { .. } => "FILE_CONTENT",
            Self::FileFocus { .. } => "FILE_FOCUS",
        }
    }
}

/// A raw event delivered by the host environment.
///
/// This is the abstract feed the recorder consumes: editor lifecycle events,
/// filesystem watch events, and terminal execution results all arrive through
/// one channel of `HostEvent`s. Paths are absolute as delivered by the host;
/// the normalizer relativizes them against the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A terminal command completed; `output` is the fully drained stream.
    CommandCompleted {
        /// The command line as entered.
        command: String,
        /// Concatenated output, accumulated until the stream ended.
        output: String,
    },
    /// The focused document changed.
    FocusChanged {
        /// Absolute path of the newly focused document.
        path: PathBuf,
    },
    /// A filesystem path was created.
    PathCreated {
        /// Absolute path.
        path: PathBuf,
    },
    /// A filesystem path was deleted.
    PathDeleted {
        /// Absolute path.
        path: PathBuf,
    },
    /// A document was saved.
    DocumentSaved {
        /// Absolute path of the saved document.
        path: PathBuf,
        /// The document's full text at save time.
        text: String,
    },
}
