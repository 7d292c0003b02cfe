use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::view::View;

/// Why a session began. Set exactly once, at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precondition {
    UserAppLaunch,
    BackgroundLaunch,
    Prewarm,
    InactivityTimeout,
    ExplicitStop,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosureReason {
    InactivityTimeout,
    ExplicitStop,
}

impl ClosureReason {
    /// Precondition carried by the session that follows this closure.
    pub fn successor_precondition(self) -> Precondition {
        match self {
            ClosureReason::InactivityTimeout => Precondition::InactivityTimeout,
            ClosureReason::ExplicitStop => Precondition::ExplicitStop,
        }
    }
}

/// Synthetic application-start marker of a user launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStart {
    /// Process launch time
    pub timestamp: DateTime<Utc>,
    /// Time from process launch until observation began
    pub startup_time_ms: i64,
}

impl ApplicationStart {
    pub fn startup_time(&self) -> Duration {
        Duration::milliseconds(self.startup_time_ms)
    }
}

/// A user session and the views it tracked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub precondition: Precondition,
    pub start_time: DateTime<Utc>,

    /// Terminal once set; a closed session never reopens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<ClosureReason>,

    /// Timestamp of the latest activity, drives the inactivity timeout
    pub last_activity: DateTime<Utc>,

    pub is_sampled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_start: Option<ApplicationStart>,

    /// Ordered by start time; at most the last one is open
    pub views: Vec<View>,
}

impl Session {
    pub fn new(
        id: Uuid,
        precondition: Precondition,
        start_time: DateTime<Utc>,
        is_sampled: bool,
    ) -> Self {
        Self {
            id,
            precondition,
            start_time,
            end_time: None,
            end_reason: None,
            last_activity: start_time,
            is_sampled,
            application_start: None,
            views: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn open_view(&self) -> Option<&View> {
        self.views.last().filter(|v| v.is_open())
    }

    /// Closed: `end - start`. Open: up to the latest activity.
    pub fn duration(&self) -> Duration {
        self.end_time.unwrap_or(self.last_activity) - self.start_time
    }

    pub fn duration_at(&self, now: DateTime<Utc>) -> Duration {
        self.end_time.unwrap_or(now) - self.start_time
    }

    pub fn view_names(&self) -> Vec<&str> {
        self.views.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn action_count(&self) -> u32 {
        self.views.iter().map(|v| v.action_count).sum()
    }

    pub fn event_count(&self) -> u32 {
        self.views.iter().map(|v| v.event_count()).sum()
    }
}
