use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application state as reported by the platform lifecycle notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    Active,
    Inactive,
    Background,
}

impl AppState {
    /// `active` and `inactive` both count as foreground for attribution.
    pub fn is_foreground(self) -> bool {
        !matches!(self, AppState::Background)
    }
}

/// How the OS brought the process up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchKind {
    /// The user tapped the app icon (or equivalent)
    UserLaunch,
    /// The OS prewarmed the process ahead of an expected launch
    OsPrewarm,
    /// The process was started in background (push, fetch, location, ...)
    BackgroundLaunch,
}

/// Process launch descriptor, supplied once per process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessLaunch {
    pub launch_time: DateTime<Utc>,
    pub was_prewarmed: bool,
    pub initial_app_state: AppState,
}

impl ProcessLaunch {
    pub fn user_launch(launch_time: DateTime<Utc>) -> Self {
        Self {
            launch_time,
            was_prewarmed: false,
            initial_app_state: AppState::Inactive,
        }
    }

    pub fn os_prewarm(launch_time: DateTime<Utc>) -> Self {
        Self {
            launch_time,
            was_prewarmed: true,
            initial_app_state: AppState::Background,
        }
    }

    pub fn background_launch(launch_time: DateTime<Utc>) -> Self {
        Self {
            launch_time,
            was_prewarmed: false,
            initial_app_state: AppState::Background,
        }
    }

    /// Classify the descriptor. Prewarming wins over the initial state.
    pub fn kind(&self) -> LaunchKind {
        if self.was_prewarmed {
            LaunchKind::OsPrewarm
        } else if self.initial_app_state == AppState::Background {
            LaunchKind::BackgroundLaunch
        } else {
            LaunchKind::UserLaunch
        }
    }
}
