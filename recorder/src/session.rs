//! Recording session lifecycle.
//!
//! A [`Session`] is the sole mutable aggregate in the recorder: it owns the
//! log, the scope filter, and the live subscription to the host event feed.
//! It moves between exactly two states, `Idle` and `Recording`, and only the
//! session itself mutates that state, at start/stop boundaries.
//!
//! Starting resets the log, rebuilds the scope filter from the workspace's
//! ignore specification, and spawns a dispatcher that drains the feed; each
//! incoming event is handled by its own spawned task, so entries land in the
//! log in handler-completion order. Stopping tears the subscription down
//! unconditionally; in-flight handlers are not awaited, and a late append
//! racing materialization is lost by design. Stop then materializes the log to
//! the artifact file if anything was recorded.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{DEFAULT_ARTIFACT_NAME, DEFAULT_IGNORE_FILE};
use crate::error::{RecorderError, Result};
use crate::log::SessionLog;
use crate::normalize::Normalizer;
use crate::persist;
use crate::scope::ScopeFilter;
use crate::types::HostEvent;
use crate::vcs::VcsQuery;

/// The two lifecycle states of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No recording in progress.
    Idle,
    /// Events are being captured.
    Recording,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Recording => write!(f, "recording"),
        }
    }
}

/// User-facing presentation seam.
///
/// The recorder is an embedded tool: outcomes surface as notification text
/// and a status indicator, not process exit codes. Hosts implement this to
/// route messages wherever their UI lives.
pub trait Notifier: Send + Sync {
    /// An informational message, e.g. "Recording started.".
    fn info(&self, message: &str);

    /// A user-visible error message.
    fn error(&self, message: &str);

    /// The status indicator changed.
    fn status(&self, status: SessionStatus);
}

/// Default [`Notifier`] that routes everything through tracing.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn status(&self, status: SessionStatus) {
        info!(status = %status, "Status changed");
    }
}

/// A recording session bound to one workspace root.
pub struct Session {
    id: Uuid,
    root: PathBuf,
    artifact_name: String,
    ignore_file: String,
    status: SessionStatus,
    log: Arc<SessionLog>,
    subscriptions: Vec<JoinHandle<()>>,
    vcs: Arc<dyn VcsQuery>,
    notifier: Arc<dyn Notifier>,
}

impl Session {
    /// Creates an idle session for `root`.
    #[must_use]
    pub fn new(root: PathBuf, vcs: Arc<dyn VcsQuery>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            id: Uuid::new_v4(),
            root,
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            ignore_file: DEFAULT_IGNORE_FILE.to_string(),
            status: SessionStatus::Idle,
            log: Arc::new(SessionLog::new()),
            subscriptions: Vec::new(),
            vcs,
            notifier,
        }
    }

    /// Overrides the artifact filename written at stop.
    #[must_use]
    pub fn with_artifact_name(mut self, name: impl Into<String>) -> Self {
        self.artifact_name = name.into();
        self
    }

    /// Overrides the ignore-specification filename read at start.
    #[must_use]
    pub fn with_ignore_file(mut self, name: impl Into<String>) -> Self {
        self.ignore_file = name.into();
        self
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns true while events are being captured.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.status == SessionStatus::Recording
    }

    /// Returns a handle to the session's log.
    #[must_use]
    pub fn log(&self) -> Arc<SessionLog> {
        Arc::clone(&self.log)
    }

    /// Starts recording, consuming events from `feed`.
    ///
    /// Resets the log, rebuilds the ignore rules from the workspace (absence
    /// is tolerated), and subscribes to the feed.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::AlreadyRecording`] if a session is active,
    /// or [`RecorderError::WorkspaceNotFound`] if the workspace root is not
    /// a directory; the latter is also surfaced through the notifier and
    /// causes no state change.
    pub async fn start(&mut self, feed: mpsc::Receiver<HostEvent>) -> Result<()> {
        if self.is_recording() {
            return Err(RecorderError::AlreadyRecording);
        }

        if !self.root.is_dir() {
            self.notifier
                .error("Please open a folder to start recording.");
            return Err(RecorderError::WorkspaceNotFound(self.root.clone()));
        }

        self.log = Arc::new(SessionLog::new());

        let filter = Arc::new(ScopeFilter::load(&self.root, &self.ignore_file).await);
        let normalizer = Arc::new(Normalizer::new(
            self.root.clone(),
            filter,
            Arc::clone(&self.vcs),
        ));

        let dispatcher = tokio::spawn(dispatch(feed, normalizer, Arc::clone(&self.log)));
        self.subscriptions.push(dispatcher);

        self.status = SessionStatus::Recording;
        self.notifier.status(self.status);
        self.notifier.info("Recording started.");

        info!(
            session_id = %self.id,
            root = %self.root.display(),
            "Recording session started"
        );

        Ok(())
    }

    /// Stops recording and materializes the log.
    ///
    /// Subscription teardown is unconditional; handlers still in flight are
    /// not awaited. If at least one entry was recorded, the full ordered
    /// sequence is written to the artifact file at the workspace root and
    /// its path is returned; an empty log writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::NotRecording`] if no session is active, or
    /// the persistence error if the artifact write fails (also surfaced
    /// through the notifier; the in-memory log is discarded either way).
    pub async fn stop(&mut self) -> Result<Option<PathBuf>> {
        if !self.is_recording() {
            return Err(RecorderError::NotRecording);
        }

        for subscription in self.subscriptions.drain(..) {
            subscription.abort();
        }

        self.status = SessionStatus::Idle;
        self.notifier.status(self.status);

        let entries = self.log.drain().await;
        info!(
            session_id = %self.id,
            entries = entries.len(),
            "Recording session stopped"
        );

        if entries.is_empty() {
            self.notifier
                .info("Recording stopped. No activity recorded.");
            return Ok(None);
        }

        let artifact = self.root.join(&self.artifact_name);
        match persist::write_artifact(&artifact, &entries).await {
            Ok(()) => {
                self.notifier
                    .info(&format!("Recording saved to {}", self.artifact_name));
                Ok(Some(artifact))
            }
            Err(e) => {
                self.notifier
                    .error(&format!("Failed to save recording: {e}"));
                Err(e.into())
            }
        }
    }
}

/// Drains the feed, handling each event in its own task.
///
/// Log order is the order handler tasks complete their append, not event
/// arrival order; near-simultaneous events may interleave.
async fn dispatch(
    mut feed: mpsc::Receiver<HostEvent>,
    normalizer: Arc<Normalizer>,
    log: Arc<SessionLog>,
) {
    while let Some(event) = feed.recv().await {
        let normalizer = Arc::clone(&normalizer);
        let log = Arc::clone(&log);
        tokio::spawn(async move {
            if let Some(payload) = normalizer.normalize(event).await {
                debug!(kind = payload.kind(), "Appending entry");
                log.append(payload).await;
            }
        });
    }

    debug!("Event feed closed");
}
