use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the synthetic view covering the launch window
pub const APPLICATION_LAUNCH_VIEW_NAME: &str = "ApplicationLaunch";

/// Name of the synthetic view absorbing background telemetry
pub const BACKGROUND_VIEW_NAME: &str = "Background";

/// Where a view came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Synthesized to cover the launch window before the first real view
    ApplicationLaunch,
    /// Synthesized to absorb telemetry while the app is in background
    Background,
    /// Started explicitly by the host application
    #[default]
    Manual,
    /// Started by automatic UI instrumentation
    Automatic,
}

impl ViewKind {
    pub fn is_synthetic(self) -> bool {
        matches!(self, ViewKind::ApplicationLaunch | ViewKind::Background)
    }
}

/// Name and kind of a view, without timing.
///
/// Used to restart the view that was open when a session closed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewIdentity {
    pub name: String,
    pub kind: ViewKind,
}

impl ViewIdentity {
    pub fn new(name: impl Into<String>, kind: ViewKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn application_launch() -> Self {
        Self::new(APPLICATION_LAUNCH_VIEW_NAME, ViewKind::ApplicationLaunch)
    }

    pub fn background() -> Self {
        Self::new(BACKGROUND_VIEW_NAME, ViewKind::Background)
    }
}

/// A single view visit inside a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub id: Uuid,
    pub name: String,
    pub kind: ViewKind,
    pub start_time: DateTime<Utc>,

    /// Set once when the view is stopped or superseded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    /// Timestamp of the latest signal absorbed by this view
    pub last_activity: DateTime<Utc>,

    pub action_count: u32,
    pub resource_count: u32,
    pub long_task_count: u32,
    pub error_count: u32,
}

impl View {
    pub fn new(identity: ViewIdentity, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: identity.name,
            kind: identity.kind,
            start_time,
            end_time: None,
            last_activity: start_time,
            action_count: 0,
            resource_count: 0,
            long_task_count: 0,
            error_count: 0,
        }
    }

    pub fn identity(&self) -> ViewIdentity {
        ViewIdentity::new(self.name.clone(), self.kind)
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Closed: `end - start`. Open: up to the latest absorbed signal.
    pub fn duration(&self) -> Duration {
        self.end_time.unwrap_or(self.last_activity) - self.start_time
    }

    /// Duration as seen at `now`; closed views ignore `now`.
    pub fn duration_at(&self, now: DateTime<Utc>) -> Duration {
        self.end_time.unwrap_or(now) - self.start_time
    }

    pub fn event_count(&self) -> u32 {
        self.action_count + self.resource_count + self.long_task_count + self.error_count
    }
}
