//! OpLog Recorder - workspace activity recorder.
//!
//! Records a developer's editing session (terminal commands, file lifecycle
//! events, and file-content changes) into an ordered, replayable activity
//! log for a single workspace. Stopping a session materializes the log as
//! one pretty-printed JSON artifact at the workspace root.
//!
//! # Overview
//!
//! Raw events from the host environment (an editor, the bundled filesystem
//! watcher, a terminal integration) arrive on one channel of [`HostEvent`]s.
//! Each event is classified by the [`normalize`] module: out-of-scope paths
//! are dropped via [`scope`], command output is stripped of control
//! sequences via [`ansi`], and saves consult version control ([`vcs`]) to
//! decide between recording a diff and recording full content. Accepted
//! entries are appended to the strictly time-ordered [`log`], which the
//! [`session`] controller materializes on stop.
//!
//! # Modules
//!
//! - [`types`]: Log entry schema and the raw host event vocabulary
//! - [`normalize`]: Event classification, the recorder's core
//! - [`scope`]: Path filtering and ignore rules
//! - [`vcs`]: Version-control tracked/diff queries
//! - [`ansi`]: Terminal control-sequence stripping
//! - [`log`]: The append-only session log
//! - [`session`]: Session lifecycle and the notification seam
//! - [`persist`]: Artifact materialization
//! - [`watch`]: Filesystem event source for the daemon
//! - [`config`]: Configuration from environment variables
//! - [`error`]: Error types for recorder operations

pub mod ansi;
pub mod config;
pub mod error;
pub mod log;
pub mod normalize;
pub mod persist;
pub mod scope;
pub mod session;
pub mod types;
pub mod vcs;
pub mod watch;

pub use ansi::strip_ansi;
pub use config::{Config, ConfigError};
pub use error::{RecorderError, Result};
pub use log::SessionLog;
pub use normalize::Normalizer;
pub use persist::PersistError;
pub use scope::ScopeFilter;
pub use session::{Notifier, Session, SessionStatus, TracingNotifier};
pub use types::{EntryPayload, HostEvent, LogEntry};
pub use vcs::{GitCli, VcsError, VcsQuery};
pub use watch::{WatchError, WorkspaceWatcher};
