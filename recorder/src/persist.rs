//! Artifact materialization.
//!
//! Serializes the recorded entries as a pretty-printed JSON array and writes
//! them all-or-nothing: the content goes to a temporary sibling file first
//! and is renamed into place, so a failed write never leaves a partial
//! artifact behind.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::types::LogEntry;

/// Errors from artifact materialization.
#[derive(Error, Debug)]
pub enum PersistError {
    /// JSON serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing or renaming the artifact failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes `entries` to `path` as pretty-printed JSON.
pub async fn write_artifact(path: &Path, entries: &[LogEntry]) -> Result<(), PersistError> {
    let content = serde_json::to_vec_pretty(entries)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    let tmp = path.with_file_name(format!("{file_name}.tmp"));

    tokio::fs::write(&tmp, &content).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    debug!(path = %path.display(), entries = entries.len(), "Artifact written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryPayload;

    fn entries() -> Vec<LogEntry> {
        vec![
            LogEntry {
                timestamp: 1,
                payload: EntryPayload::Command {
                    command: "echo hi".to_string(),
                    output: "hi\n".to_string(),
                },
            },
            LogEntry {
                timestamp: 2,
                payload: EntryPayload::FileCreate {
                    path: "foo.txt".to_string(),
                    data: String::new(),
                },
            },
        ]
    }

    #[tokio::test]
    async fn written_artifact_parses_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("operation.json");
        let original = entries();

        write_artifact(&artifact, &original).await.unwrap();

        let content = std::fs::read_to_string(&artifact).unwrap();
        let parsed: Vec<LogEntry> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, original);
        // Pretty-printed, not a single line.
        assert!(content.lines().count() > 2);
    }

    #[tokio::test]
    async fn no_temporary_file_remains() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("operation.json");

        write_artifact(&artifact, &entries()).await.unwrap();

        assert!(artifact.exists());
        assert!(!dir.path().join("operation.json.tmp").exists());
    }

    #[tokio::test]
    async fn write_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("missing").join("operation.json");

        let result = write_artifact(&artifact, &entries()).await;
        assert!(matches!(result, Err(PersistError::Io(_))));
        assert!(!artifact.exists());
    }
}
