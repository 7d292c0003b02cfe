use chrono::Duration;

/// Default inactivity timeout: 15 minutes
pub const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 15 * 60;

/// Timing and attribution knobs consumed by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Inactivity gap that closes a session
    pub session_timeout: Duration,

    /// Open sessions and Background views for telemetry received in background
    pub track_background_events: bool,

    /// Let long tasks open a Background view as well
    pub track_background_long_tasks: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_timeout: Duration::seconds(DEFAULT_SESSION_TIMEOUT_SECS),
            track_background_events: false,
            track_background_long_tasks: false,
        }
    }
}

impl EngineConfig {
    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    pub fn with_background_events(mut self, enabled: bool) -> Self {
        self.track_background_events = enabled;
        self
    }

    pub fn with_background_long_tasks(mut self, enabled: bool) -> Self {
        self.track_background_long_tasks = enabled;
        self
    }
}
