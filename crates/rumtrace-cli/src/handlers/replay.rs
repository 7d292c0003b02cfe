use crate::types::OutputFormat;
use crate::views;
use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use rumtrace_engine::SessionEngine;
use rumtrace_runtime::{Config, read_feed};
use rumtrace_types::Session;
use serde::Serialize;
use std::path::Path;

/// What a replay produced, as printed by the CLI
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub signals: usize,
    pub dropped: usize,
    /// Unsampled sessions, left out of `sessions`
    pub unsampled: usize,
    /// Closed sessions first, then the open one
    pub sessions: Vec<Session>,
}

pub fn handle(config: &Config, file: &Path, format: OutputFormat) -> Result<()> {
    let signals = read_feed(file)
        .with_context(|| format!("Failed to read signal feed: {}", file.display()))?;

    let mut engine = SessionEngine::new(config.engine_config()).with_sampler(config.sampler());
    let replay = rumtrace_engine::replay(&mut engine, &signals);

    let (sampled, unsampled): (Vec<&Session>, Vec<&Session>) = replay
        .all_sessions()
        .into_iter()
        .partition(|session| session.is_sampled);

    let report = ReplayReport {
        signals: signals.len(),
        dropped: replay.dropped,
        unsampled: unsampled.len(),
        sessions: sampled.into_iter().cloned().collect(),
    };
    tracing::info!(
        signals = report.signals,
        sessions = report.sessions.len(),
        dropped = report.dropped,
        "replay finished"
    );

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Plain => {
            let color = std::io::stdout().is_terminal();
            print!("{}", views::render_replay(&report, color));
        }
    }
    Ok(())
}
