//! End-to-end recording scenarios.
//!
//! Each test drives a full session through the public surface: a feed
//! channel in, lifecycle calls on [`Session`], and the JSON artifact (or the
//! notifier transcript) out. Version control is scripted per path so the
//! save-classification branches are exercised without a live repository.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use oplog_recorder::log::SessionLog;
use oplog_recorder::session::{Notifier, Session, SessionStatus};
use oplog_recorder::types::{EntryPayload, HostEvent, LogEntry};
use oplog_recorder::vcs::{Result as VcsResult, VcsQuery};

// =============================================================================
// Test Helpers
// =============================================================================

/// Scripted version-control answers keyed by absolute path.
///
/// Paths not registered are untracked; tracked paths answer with their
/// scripted diff (possibly empty).
#[derive(Default)]
struct ScriptedVcs {
    tracked: HashSet<PathBuf>,
    diffs: HashMap<PathBuf, String>,
}

impl ScriptedVcs {
    fn tracked_with_diff(mut self, path: impl Into<PathBuf>, diff: &str) -> Self {
        let path = path.into();
        self.tracked.insert(path.clone());
        self.diffs.insert(path, diff.to_string());
        self
    }
}

#[async_trait]
impl VcsQuery for ScriptedVcs {
    async fn is_tracked(&self, path: &Path) -> bool {
        self.tracked.contains(path)
    }

    async fn diff(&self, path: &Path) -> VcsResult<String> {
        Ok(self.diffs.get(path).cloned().unwrap_or_default())
    }
}

/// Notifier capturing every message for assertions.
#[derive(Default)]
struct CollectingNotifier {
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    statuses: Mutex<Vec<SessionStatus>>,
}

impl Notifier for CollectingNotifier {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn status(&self, status: SessionStatus) {
        self.statuses.lock().unwrap().push(status);
    }
}

impl CollectingNotifier {
    fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }
}

struct Harness {
    session: Session,
    notifier: Arc<CollectingNotifier>,
    feed: mpsc::Sender<HostEvent>,
    root: PathBuf,
    _dir: tempfile::TempDir,
}

/// Builds a started session over a fresh workspace.
async fn start_session(vcs: ScriptedVcs) -> Harness {
    let dir = tempfile::tempdir().expect("Failed to create temp workspace");
    let root = dir.path().to_path_buf();
    let notifier = Arc::new(CollectingNotifier::default());

    let mut session = Session::new(
        root.clone(),
        Arc::new(vcs),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    let (feed, rx) = mpsc::channel(32);
    session.start(rx).await.expect("Failed to start session");

    Harness {
        session,
        notifier,
        feed,
        root,
        _dir: dir,
    }
}

/// Polls the log until it holds at least `n` entries.
async fn wait_for_entries(log: &Arc<SessionLog>, n: usize) {
    for _ in 0..500 {
        if log.len().await >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {n} entries");
}

/// Gives still-running handlers a moment to (wrongly) append.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

fn parse_artifact(path: &Path) -> Vec<LogEntry> {
    let content = std::fs::read_to_string(path).expect("Failed to read artifact");
    serde_json::from_str(&content).expect("Artifact is not valid entry JSON")
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn created_file_is_recorded_with_empty_data() {
    let mut h = start_session(ScriptedVcs::default()).await;

    h.feed
        .send(HostEvent::PathCreated {
            path: h.root.join("foo.txt"),
        })
        .await
        .unwrap();
    wait_for_entries(&h.session.log(), 1).await;

    let artifact = h.session.stop().await.unwrap().expect("expected artifact");
    let entries = parse_artifact(&artifact);

    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].payload,
        EntryPayload::FileCreate {
            path: "foo.txt".to_string(),
            data: String::new(),
        }
    );
}

#[tokio::test]
async fn command_output_is_recorded_stripped() {
    let mut h = start_session(ScriptedVcs::default()).await;

    h.feed
        .send(HostEvent::CommandCompleted {
            command: "echo hi".to_string(),
            output: "\u{1b}[32mhi\u{1b}[0m\n".to_string(),
        })
        .await
        .unwrap();
    wait_for_entries(&h.session.log(), 1).await;

    let artifact = h.session.stop().await.unwrap().unwrap();
    let entries = parse_artifact(&artifact);

    assert_eq!(
        entries[0].payload,
        EntryPayload::Command {
            command: "echo hi".to_string(),
            output: "hi\n".to_string(),
        }
    );
}

#[tokio::test]
async fn untracked_save_records_full_content() {
    let mut h = start_session(ScriptedVcs::default()).await;

    h.feed
        .send(HostEvent::DocumentSaved {
            path: h.root.join("notes.md"),
            text: "draft".to_string(),
        })
        .await
        .unwrap();
    wait_for_entries(&h.session.log(), 1).await;

    let artifact = h.session.stop().await.unwrap().unwrap();
    let entries = parse_artifact(&artifact);

    assert_eq!(
        entries[0].payload,
        EntryPayload::FileContent {
            path: "notes.md".to_string(),
            data: "draft".to_string(),
        }
    );
}

#[tokio::test]
async fn tracked_save_records_the_diff() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let saved = root.join("src/lib.rs");
    let diff = "diff --git a/src/lib.rs b/src/lib.rs\n@@ -1 +1 @@\n-old line\n+new line\n";

    let notifier = Arc::new(CollectingNotifier::default());
    let mut session = Session::new(
        root.clone(),
        Arc::new(ScriptedVcs::default().tracked_with_diff(&saved, diff)),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    let (feed, rx) = mpsc::channel(8);
    session.start(rx).await.unwrap();

    feed.send(HostEvent::DocumentSaved {
        path: saved,
        text: "new line\n".to_string(),
    })
    .await
    .unwrap();
    wait_for_entries(&session.log(), 1).await;

    let artifact = session.stop().await.unwrap().unwrap();
    let entries = parse_artifact(&artifact);

    match &entries[0].payload {
        EntryPayload::FileDiff { path, data } => {
            assert_eq!(path, "src/lib.rs");
            assert!(data.contains("+new line"));
        }
        other => panic!("expected FILE_DIFF, got {other:?}"),
    }
}

#[tokio::test]
async fn tracked_save_without_changes_records_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let saved = root.join("src/lib.rs");

    let mut session = Session::new(
        root.clone(),
        Arc::new(ScriptedVcs::default().tracked_with_diff(&saved, "")),
        Arc::new(CollectingNotifier::default()) as Arc<dyn Notifier>,
    );

    let (feed, rx) = mpsc::channel(8);
    session.start(rx).await.unwrap();

    feed.send(HostEvent::DocumentSaved {
        path: saved,
        text: "unchanged\n".to_string(),
    })
    .await
    .unwrap();
    // A focus event afterwards proves the pipeline kept flowing.
    feed.send(HostEvent::FocusChanged {
        path: root.join("README.md"),
    })
    .await
    .unwrap();

    wait_for_entries(&session.log(), 1).await;
    settle().await;

    let log = session.log();
    assert_eq!(log.len().await, 1);
    let entries = log.snapshot().await;
    assert_eq!(
        entries[0].payload,
        EntryPayload::FileFocus {
            path: "README.md".to_string(),
        }
    );

    session.stop().await.unwrap();
}

#[tokio::test]
async fn ignore_rules_are_loaded_at_start() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    std::fs::write(root.join(".gitignore"), "*.log\n").unwrap();

    let mut session = Session::new(
        root.clone(),
        Arc::new(ScriptedVcs::default()),
        Arc::new(CollectingNotifier::default()) as Arc<dyn Notifier>,
    );

    let (feed, rx) = mpsc::channel(8);
    session.start(rx).await.unwrap();

    feed.send(HostEvent::PathCreated {
        path: root.join("debug.log"),
    })
    .await
    .unwrap();
    feed.send(HostEvent::PathCreated {
        path: root.join("keep.txt"),
    })
    .await
    .unwrap();

    wait_for_entries(&session.log(), 1).await;
    settle().await;

    let entries = session.log().snapshot().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].payload,
        EntryPayload::FileCreate {
            path: "keep.txt".to_string(),
            data: String::new(),
        }
    );

    session.stop().await.unwrap();
}

#[tokio::test]
async fn stop_with_empty_log_writes_no_artifact() {
    let mut h = start_session(ScriptedVcs::default()).await;

    let result = h.session.stop().await.unwrap();

    assert_eq!(result, None);
    assert!(!h.root.join("operation.json").exists());
    let infos = h.notifier.infos();
    assert!(infos
        .iter()
        .any(|m| m.contains("No activity recorded")));
}

#[tokio::test]
async fn materialized_log_round_trips_field_for_field() {
    let mut h = start_session(ScriptedVcs::default()).await;

    let events = [
        HostEvent::CommandCompleted {
            command: "cargo test".to_string(),
            output: "ok\n".to_string(),
        },
        HostEvent::PathCreated {
            path: h.root.join("a.rs"),
        },
        HostEvent::FocusChanged {
            path: h.root.join("a.rs"),
        },
        HostEvent::DocumentSaved {
            path: h.root.join("a.rs"),
            text: "fn main() {}\n".to_string(),
        },
    ];
    for event in events {
        h.feed.send(event).await.unwrap();
    }
    wait_for_entries(&h.session.log(), 4).await;

    let in_memory = h.session.log().snapshot().await;
    let artifact = h.session.stop().await.unwrap().unwrap();
    let parsed = parse_artifact(&artifact);

    assert_eq!(parsed, in_memory);
}

#[tokio::test]
async fn repeated_untracked_saves_each_produce_an_entry() {
    let mut h = start_session(ScriptedVcs::default()).await;

    for _ in 0..2 {
        h.feed
            .send(HostEvent::DocumentSaved {
                path: h.root.join("notes.md"),
                text: "same text".to_string(),
            })
            .await
            .unwrap();
    }
    wait_for_entries(&h.session.log(), 2).await;

    let artifact = h.session.stop().await.unwrap().unwrap();
    let entries = parse_artifact(&artifact);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].payload, entries[1].payload);
    assert!(entries[0].timestamp <= entries[1].timestamp);
}

#[tokio::test]
async fn lifecycle_notifications_follow_the_session() {
    let mut h = start_session(ScriptedVcs::default()).await;

    h.feed
        .send(HostEvent::PathCreated {
            path: h.root.join("foo.txt"),
        })
        .await
        .unwrap();
    wait_for_entries(&h.session.log(), 1).await;
    h.session.stop().await.unwrap();

    let infos = h.notifier.infos();
    assert!(infos.iter().any(|m| m == "Recording started."));
    assert!(infos
        .iter()
        .any(|m| m.contains("Recording saved to operation.json")));

    let statuses = h.notifier.statuses.lock().unwrap().clone();
    assert_eq!(
        statuses,
        vec![SessionStatus::Recording, SessionStatus::Idle]
    );
}

#[tokio::test]
async fn session_can_restart_with_a_fresh_log() {
    let mut h = start_session(ScriptedVcs::default()).await;

    h.feed
        .send(HostEvent::PathCreated {
            path: h.root.join("first.txt"),
        })
        .await
        .unwrap();
    wait_for_entries(&h.session.log(), 1).await;
    h.session.stop().await.unwrap();

    // Second session over the same workspace starts empty.
    let (feed, rx) = mpsc::channel(8);
    h.session.start(rx).await.unwrap();
    assert!(h.session.log().is_empty().await);

    feed.send(HostEvent::PathCreated {
        path: h.root.join("second.txt"),
    })
    .await
    .unwrap();
    wait_for_entries(&h.session.log(), 1).await;

    let artifact = h.session.stop().await.unwrap().unwrap();
    let entries = parse_artifact(&artifact);
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].payload,
        EntryPayload::FileCreate {
            path: "second.txt".to_string(),
            data: String::new(),
        }
    );
}
