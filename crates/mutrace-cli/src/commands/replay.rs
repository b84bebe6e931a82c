//! Replay command
//!
//! Usage: mutrace replay <SNAPSHOT_JSON> <EVENTS_JSONL> --incident <ID>
//!
//! Feeds a recorded snapshot and channel frames through the live viewer,
//! then closes the channel and prints the final view.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Args;
use mutrace_core::config::EngineConfig;
use mutrace_core::errors::MutraceError;
use mutrace_core::merge::ConnectionPhase;
use mutrace_core::{Incident, Post, Severity};
use mutrace_engine::{IncidentView, MemorySource, Viewer, ViewerHandle};

use super::{load_posts, CliResult};

const REPLAY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSON array of posts served as the bulk snapshot
    pub snapshot: PathBuf,

    /// One raw channel frame per line
    pub events: PathBuf,

    /// Incident the snapshot and frames belong to
    #[arg(long)]
    pub incident: String,
}

pub fn execute(args: ReplayArgs, config: &EngineConfig) -> CliResult<()> {
    let snapshot = load_posts(&args.snapshot)?;
    let events = std::fs::read_to_string(&args.events).map_err(|e| MutraceError::Io {
        path: args.events.display().to_string(),
        reason: e.to_string(),
    })?;
    let frames: Vec<String> = events
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let view = runtime.block_on(replay(&args.incident, snapshot, frames, config))?;

    print!("{}", render_summary(&view));
    Ok(())
}

/// Drive one incident from selection through every frame to channel close
pub async fn replay(
    incident_id: &str,
    snapshot: Vec<Post>,
    frames: Vec<String>,
    config: &EngineConfig,
) -> CliResult<IncidentView> {
    let source = Arc::new(MemorySource::with_channel_capacity(
        config.session.channel_capacity,
    ));
    source.insert_incident(
        Incident {
            id: incident_id.to_string(),
            title: String::new(),
            severity: Severity::Low,
            created_at: Utc::now(),
        },
        snapshot,
    )?;

    let (handle, task) = Viewer::spawn(source.clone(), config.clone());
    handle.select(incident_id).await?;
    wait_until(&handle, |view| view.is_live()).await?;

    for frame in frames {
        source.publish(incident_id, frame).await?;
    }
    // Closing after the last frame makes the disconnect the final queued event.
    source.close_channels(incident_id)?;
    let view = wait_until(&handle, |view| view.phase == ConnectionPhase::Disconnected).await?;

    handle.shutdown().await?;
    task.await?;
    Ok(view)
}

async fn wait_until<F>(handle: &ViewerHandle, mut predicate: F) -> CliResult<IncidentView>
where
    F: FnMut(&IncidentView) -> bool,
{
    let mut rx = handle.subscribe();
    let waited = tokio::time::timeout(
        REPLAY_TIMEOUT,
        rx.wait_for(|view| view.as_ref().is_some_and(&mut predicate)),
    )
    .await
    .map_err(|_| "timed out waiting for the viewer")?;
    let view = waited?;
    (*view).clone().ok_or_else(|| "viewer published no incident".into())
}

pub fn render_summary(view: &IncidentView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "incident {}", view.incident_id);
    let _ = writeln!(out, "posts {}", view.posts.len());
    let _ = writeln!(out, "roots {}", view.forest.roots().len());
    let _ = writeln!(out, "max depth {}", view.forest.max_depth());
    let _ = writeln!(out, "orphans {}", view.report.orphans.join(","));
    let _ = writeln!(out, "cycles {}", view.report.cycles.join(","));
    let _ = writeln!(out, "dropped frames {}", view.dropped_messages);
    for (parent, child) in view.forest.edges() {
        let _ = writeln!(out, "edge {} -> {}", parent, child);
    }
    out
}
