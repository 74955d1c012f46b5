//! The in-memory session log.
//!
//! An append-only, strictly time-ordered sequence of [`LogEntry`] values,
//! owned exclusively by the active recording session. Concurrent handler
//! tasks append through a shared [`SessionLog`]; each append is a single
//! atomic step that assigns the entry's timestamp, so the log order is the
//! order appends complete, not the order the originating events fired.
//! Entries are never mutated, reordered, or removed once pushed.

use chrono::Utc;
use tokio::sync::Mutex;

use crate::types::{EntryPayload, LogEntry};

#[derive(Debug, Default)]
struct LogInner {
    entries: Vec<LogEntry>,
    last_timestamp: u64,
}

/// Append-safe ordered entry sequence.
///
/// Timestamps are milliseconds since the Unix epoch and monotonically
/// non-decreasing: if the clock reads earlier than the last appended entry,
/// the previous timestamp is reused.
#[derive(Debug, Default)]
pub struct SessionLog {
    inner: Mutex<LogInner>,
}

impl SessionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, assigning its timestamp at the moment of acceptance.
    ///
    /// Returns the assigned timestamp.
    pub async fn append(&self, payload: EntryPayload) -> u64 {
        let mut inner = self.inner.lock().await;
        let timestamp = now_millis().max(inner.last_timestamp);
        inner.last_timestamp = timestamp;
        inner.entries.push(LogEntry { timestamp, payload });
        timestamp
    }

    /// Returns the number of entries recorded so far.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Returns true if nothing has been recorded.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }

    /// Takes the full ordered sequence out of the log, leaving it empty.
    ///
    /// Called once at session stop for materialization.
    pub async fn drain(&self) -> Vec<LogEntry> {
        std::mem::take(&mut self.inner.lock().await.entries)
    }

    /// Returns a copy of the current entries, in append order.
    pub async fn snapshot(&self) -> Vec<LogEntry> {
        self.inner.lock().await.entries.clone()
    }
}

fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
