//! OpLog Recorder - workspace activity recorder daemon.
//!
//! Records filesystem activity in a workspace until interrupted, then writes
//! the ordered activity log to `operation.json` at the workspace root.
//! Recording starts on launch and stops on Ctrl+C (or SIGTERM); an empty
//! session writes no artifact.
//!
//! # Environment Variables
//!
//! See the [`config`] module for available configuration options.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use oplog_recorder::config::Config;
use oplog_recorder::session::{Session, TracingNotifier};
use oplog_recorder::vcs::GitCli;
use oplog_recorder::watch::WorkspaceWatcher;

/// OpLog Recorder - workspace activity recorder.
///
/// Watches a workspace for file creation, deletion, and saves, classifies
/// each change (diffs for tracked files, full content for untracked ones),
/// and writes the time-ordered log on stop.
#[derive(Parser, Debug)]
#[command(name = "oplog-recorder")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    OPLOG_WORKSPACE      Workspace root (default: current directory)
    OPLOG_ARTIFACT       Artifact filename (default: operation.json)
    OPLOG_IGNORE_FILE    Ignore-specification filename (default: .gitignore)
    OPLOG_BUFFER_SIZE    Event channel capacity (default: 1024)

EXAMPLES:
    # Record the current directory until Ctrl+C
    oplog-recorder

    # Record a specific workspace
    oplog-recorder --workspace ~/src/my-project
")]
struct Cli {
    /// Workspace root to record (overrides OPLOG_WORKSPACE).
    #[arg(short, long)]
    workspace: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging();

    info!("Starting OpLog Recorder");

    let config = Config::from_env().context("Failed to load configuration")?;

    let root = resolve_workspace(cli.workspace.or_else(|| config.workspace.clone()))?;

    info!(
        workspace = %root.display(),
        artifact = %config.artifact_name,
        "Configuration loaded"
    );

    let (events_tx, events_rx) = mpsc::channel(config.buffer_size);

    let _watcher = WorkspaceWatcher::new(root.clone(), events_tx).context(format!(
        "Failed to initialize workspace watcher for {}",
        root.display()
    ))?;

    let vcs = Arc::new(GitCli::new(root.clone()));
    let mut session = Session::new(root, vcs, Arc::new(TracingNotifier))
        .with_artifact_name(config.artifact_name)
        .with_ignore_file(config.ignore_file);

    session.start(events_rx).await?;

    info!("Recording. Press Ctrl+C to stop.");

    wait_for_shutdown().await;

    info!("Shutdown signal received");

    session.stop().await?;

    Ok(())
}

/// Resolves the workspace root from the override or the current directory.
fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    let root = match workspace {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    // Canonicalize so watch events relativize cleanly against the root.
    root.canonicalize()
        .context(format!("Workspace root not found: {}", root.display()))
}

/// Initializes the logging subsystem.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
