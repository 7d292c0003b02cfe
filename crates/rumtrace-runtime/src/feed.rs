use rumtrace_types::{TimedSignal, parse_feed};
use std::path::Path;

use crate::Result;

/// Read a JSONL signal feed from disk.
pub fn read_feed(path: &Path) -> Result<Vec<TimedSignal>> {
    let content = std::fs::read_to_string(path)?;
    let signals = parse_feed(&content)?;
    tracing::debug!(path = %path.display(), signals = signals.len(), "signal feed loaded");
    Ok(signals)
}
