//! Filesystem event source for the recorder daemon.
//!
//! Bridges [`notify`] filesystem notifications into the recorder's
//! [`HostEvent`] feed. The notify callback is kept lightweight: it only
//! classifies the raw notification and forwards it through an internal
//! channel; a dedicated async task does the file I/O (reading saved text)
//! and emits the public events.
//!
//! The source is deliberately raw: it reports everything under the
//! workspace, including version-controlled metadata and ignored paths.
//! Scope decisions belong to the normalizer, which sees the same unfiltered
//! feed an editor host would deliver.

use std::path::{Path, PathBuf};

use notify::{
    event::ModifyKind, Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

use crate::types::HostEvent;

/// Capacity of the internal notify-to-async bridge channel.
const BRIDGE_CAPACITY: usize = 1024;

/// Errors that can occur during file watching operations.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Failed to initialize the file system watcher.
    #[error("failed to create watcher: {0}")]
    Init(#[from] notify::Error),

    /// The workspace root does not exist or is inaccessible.
    #[error("watch directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),
}

/// Raw change classification, before any file I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RawChange {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
}

/// Watches a workspace tree and feeds [`HostEvent`]s into the recorder.
///
/// Dropping the watcher stops the subscription; the forwarding task then
/// drains and exits on its own.
#[derive(Debug)]
pub struct WorkspaceWatcher {
    /// Kept alive to maintain the watch subscription.
    #[allow(dead_code)]
    watcher: RecommendedWatcher,

    /// The workspace root being watched.
    root: PathBuf,
}

impl WorkspaceWatcher {
    /// Creates a watcher over `root`, emitting events into `events`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist or the underlying
    /// watcher cannot be initialized.
    pub fn new(root: PathBuf, events: mpsc::Sender<HostEvent>) -> Result<Self, WatchError> {
        if !root.is_dir() {
            return Err(WatchError::DirectoryNotFound(root));
        }

        let (bridge_tx, bridge_rx) = mpsc::channel::<RawChange>(BRIDGE_CAPACITY);
        tokio::spawn(forward_changes(bridge_rx, events));

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                handle_notify_event(res, &bridge_tx);
            },
            Config::default(),
        )?;
        watcher.watch(&root, RecursiveMode::Recursive)?;

        debug!(root = %root.display(), "Started recursive workspace watch");

        Ok(Self { watcher, root })
    }

    /// Returns the workspace root being watched.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Classifies and forwards one notify callback invocation.
///
/// Runs on the notify thread; must not block, so a full bridge drops the
/// change rather than waiting.
fn handle_notify_event(
    res: Result<Event, notify::Error>,
    bridge_tx: &mpsc::Sender<RawChange>,
) {
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            error!(error = %e, "File watcher error");
            return;
        }
    };

    for path in &event.paths {
        if let Some(change) = classify_change(&event.kind, path) {
            if let Err(e) = bridge_tx.try_send(change) {
                warn!(error = %e, "Dropping filesystem change, bridge channel full");
            }
        }
    }
}

/// Maps a notify event kind for one path to a raw change.
fn classify_change(kind: &EventKind, path: &Path) -> Option<RawChange> {
    match kind {
        EventKind::Create(_) => Some(RawChange::Created(path.to_path_buf())),
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
            Some(RawChange::Modified(path.to_path_buf()))
        }
        EventKind::Remove(_) => Some(RawChange::Removed(path.to_path_buf())),
        other => {
            trace!(kind = ?other, path = %path.display(), "Ignoring event kind");
            None
        }
    }
}

/// Async task turning raw changes into host events.
///
/// A data modification is reported as a document save carrying the file's
/// current text; files that vanish or cannot be read before we get to them
/// are skipped.
async fn forward_changes(mut bridge_rx: mpsc::Receiver<RawChange>, events: mpsc::Sender<HostEvent>) {
    while let Some(change) = bridge_rx.recv().await {
        let event = match change {
            RawChange::Created(path) => Some(HostEvent::PathCreated { path }),
            RawChange::Removed(path) => Some(HostEvent::PathDeleted { path }),
            RawChange::Modified(path) => read_saved_document(path).await,
        };

        if let Some(event) = event {
            if events.send(event).await.is_err() {
                debug!("Host event channel closed, stopping watch forwarding");
                return;
            }
        }
    }

    debug!("Watch bridge closed");
}

async fn read_saved_document(path: PathBuf) -> Option<HostEvent> {
    if !path.is_file() {
        return None;
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => Some(HostEvent::DocumentSaved {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            path,
        }),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Skipping unreadable saved file");
            None
        }
    }
}
