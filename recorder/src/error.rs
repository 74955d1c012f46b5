//! Error types for the OpLog recorder.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::persist::PersistError;
use crate::vcs::VcsError;
use crate::watch::WatchError;

/// Errors that can occur during recorder operations.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Version-control query error.
    #[error("version control error: {0}")]
    Vcs(#[from] VcsError),

    /// File watching error.
    #[error("file watch error: {0}")]
    Watch(#[from] WatchError),

    /// Artifact materialization error.
    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),

    /// The workspace root could not be resolved at session start.
    #[error("workspace root does not exist: {0}")]
    WorkspaceNotFound(PathBuf),

    /// `start` was called while already recording.
    #[error("a recording session is already active")]
    AlreadyRecording,

    /// `stop` was called while idle.
    #[error("no recording session is active")]
    NotRecording,
}

/// A specialized `Result` type for recorder operations.
pub type Result<T> = std::result::Result<T, RecorderError>;
