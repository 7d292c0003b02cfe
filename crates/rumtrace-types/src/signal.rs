use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AppState, ProcessLaunch, ViewKind};
use crate::error::{Error, Result};

/// Discrete input consumed by the lifecycle engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    /// Process launch descriptor (once per process)
    ProcessLaunch(ProcessLaunch),
    /// Observation begins
    SdkReady,
    AppStateChanged {
        state: AppState,
    },
    ViewStart {
        name: String,
        #[serde(default)]
        kind: ViewKind,
    },
    ViewStop,
    Action,
    ResourceStart,
    ResourceStop,
    LongTask,
    Error,
    /// Explicit stop of the current session
    SessionStop,
    /// No-op injected by an external ticker to re-evaluate the timeout
    TimeoutTick,
}

/// Application event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ViewStart,
    ViewStop,
    Action,
    ResourceStart,
    ResourceStop,
    LongTask,
    Error,
}

impl EventKind {
    /// Telemetry-only events, as opposed to view lifecycle.
    pub fn is_telemetry(self) -> bool {
        !matches!(self, EventKind::ViewStart | EventKind::ViewStop)
    }
}

impl Signal {
    pub fn view_start(name: impl Into<String>, kind: ViewKind) -> Self {
        Signal::ViewStart {
            name: name.into(),
            kind,
        }
    }

    pub fn app_state(state: AppState) -> Self {
        Signal::AppStateChanged { state }
    }

    /// Event kind for application events; `None` for lifecycle/control signals.
    pub fn event_kind(&self) -> Option<EventKind> {
        match self {
            Signal::ViewStart { .. } => Some(EventKind::ViewStart),
            Signal::ViewStop => Some(EventKind::ViewStop),
            Signal::Action => Some(EventKind::Action),
            Signal::ResourceStart => Some(EventKind::ResourceStart),
            Signal::ResourceStop => Some(EventKind::ResourceStop),
            Signal::LongTask => Some(EventKind::LongTask),
            Signal::Error => Some(EventKind::Error),
            Signal::ProcessLaunch(_)
            | Signal::SdkReady
            | Signal::AppStateChanged { .. }
            | Signal::SessionStop
            | Signal::TimeoutTick => None,
        }
    }
}

/// A signal with the timestamp it was observed at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSignal {
    pub at: DateTime<Utc>,
    pub signal: Signal,
}

impl TimedSignal {
    pub fn new(at: DateTime<Utc>, signal: Signal) -> Self {
        Self { at, signal }
    }
}

/// Parse a JSONL signal feed.
///
/// Blank lines and lines starting with `#` are skipped. Timestamps must be
/// non-decreasing.
pub fn parse_feed(content: &str) -> Result<Vec<TimedSignal>> {
    let mut signals: Vec<TimedSignal> = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed: TimedSignal = serde_json::from_str(line).map_err(|source| {
            Error::InvalidSignal {
                line: index + 1,
                source,
            }
        })?;

        if let Some(previous) = signals.last()
            && parsed.at < previous.at
        {
            return Err(Error::OutOfOrder { line: index + 1 });
        }

        signals.push(parsed);
    }

    Ok(signals)
}
