use chrono::{DateTime, Duration, TimeZone, Utc};
use rumtrace_engine::{Disposition, EngineConfig, MemorySink, SessionEngine};
use rumtrace_types::{AppState, LaunchKind, ProcessLaunch, Session, Signal, ViewKind};

/// Sequential driver for the lifecycle engine with a fake clock.
///
/// Each call sends one signal at the current fake time. Time only moves
/// through [`TestApp::advance`].
///
/// # Example
///
/// ```
/// use rumtrace_testing::TestApp;
///
/// let mut app = TestApp::user_launch();
/// app.advance(1.1).sdk_ready().advance(1.2).become_active();
///
/// let sessions = app.recorded_sessions();
/// assert_eq!(sessions.len(), 1);
/// ```
pub struct TestApp {
    engine: SessionEngine,
    sink: MemorySink,
    launch: ProcessLaunch,
    now: DateTime<Utc>,
    last_disposition: Option<Disposition>,
}

impl TestApp {
    pub fn user_launch() -> Self {
        Self::launch(LaunchKind::UserLaunch, EngineConfig::default())
    }

    pub fn os_prewarm() -> Self {
        Self::launch(LaunchKind::OsPrewarm, EngineConfig::default())
    }

    pub fn background_launch() -> Self {
        Self::launch(LaunchKind::BackgroundLaunch, EngineConfig::default())
    }

    pub fn launch(kind: LaunchKind, config: EngineConfig) -> Self {
        crate::init_tracing();

        let launch_time = Utc
            .with_ymd_and_hms(2025, 1, 1, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let launch = match kind {
            LaunchKind::UserLaunch => ProcessLaunch::user_launch(launch_time),
            LaunchKind::OsPrewarm => ProcessLaunch::os_prewarm(launch_time),
            LaunchKind::BackgroundLaunch => ProcessLaunch::background_launch(launch_time),
        };

        let sink = MemorySink::new();
        let engine = SessionEngine::new(config)
            .with_launch(launch)
            .with_sink(sink.clone());

        Self {
            engine,
            sink,
            launch,
            now: launch_time,
            last_disposition: None,
        }
    }

    pub fn launch_time(&self) -> DateTime<Utc> {
        self.launch.launch_time
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Seconds elapsed since process launch.
    pub fn elapsed(&self) -> Duration {
        self.now - self.launch.launch_time
    }

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    /// Disposition of the most recent signal.
    pub fn last_disposition(&self) -> Option<Disposition> {
        self.last_disposition
    }

    // ------------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------------

    /// Move the fake clock forward by `seconds` (millisecond resolution).
    pub fn advance(&mut self, seconds: f64) -> &mut Self {
        self.advance_by(Duration::milliseconds((seconds * 1000.0).round() as i64))
    }

    pub fn advance_by(&mut self, delta: Duration) -> &mut Self {
        self.now += delta;
        self
    }

    // ------------------------------------------------------------------------
    // Signals
    // ------------------------------------------------------------------------

    pub fn send(&mut self, signal: Signal) -> &mut Self {
        let outcome = self.engine.handle(signal, self.now);
        self.last_disposition = Some(outcome.disposition);
        self
    }

    pub fn sdk_ready(&mut self) -> &mut Self {
        self.send(Signal::SdkReady)
    }

    pub fn become_active(&mut self) -> &mut Self {
        self.send(Signal::app_state(AppState::Active))
    }

    pub fn resign_active(&mut self) -> &mut Self {
        self.send(Signal::app_state(AppState::Inactive))
    }

    pub fn enter_background(&mut self) -> &mut Self {
        self.send(Signal::app_state(AppState::Background))
    }

    pub fn enter_foreground(&mut self) -> &mut Self {
        self.send(Signal::app_state(AppState::Inactive))
    }

    pub fn start_view(&mut self, name: &str) -> &mut Self {
        self.send(Signal::view_start(name, ViewKind::Manual))
    }

    pub fn start_automatic_view(&mut self, name: &str) -> &mut Self {
        self.send(Signal::view_start(name, ViewKind::Automatic))
    }

    pub fn stop_view(&mut self) -> &mut Self {
        self.send(Signal::ViewStop)
    }

    pub fn action(&mut self) -> &mut Self {
        self.send(Signal::Action)
    }

    pub fn start_resource(&mut self) -> &mut Self {
        self.send(Signal::ResourceStart)
    }

    pub fn stop_resource(&mut self) -> &mut Self {
        self.send(Signal::ResourceStop)
    }

    pub fn long_task(&mut self) -> &mut Self {
        self.send(Signal::LongTask)
    }

    pub fn error(&mut self) -> &mut Self {
        self.send(Signal::Error)
    }

    pub fn stop_session(&mut self) -> &mut Self {
        self.send(Signal::SessionStop)
    }

    pub fn tick(&mut self) -> &mut Self {
        self.send(Signal::TimeoutTick)
    }

    // ------------------------------------------------------------------------
    // Observations
    // ------------------------------------------------------------------------

    /// Sessions emitted to the sink, followed by the open session if it is sampled.
    pub fn recorded_sessions(&self) -> Vec<Session> {
        let mut sessions = self.sink.sessions();
        if let Some(open) = self.engine.current_session()
            && open.is_sampled
        {
            sessions.push(open);
        }
        sessions
    }

    /// Only the sessions that were closed and emitted.
    pub fn emitted_sessions(&self) -> Vec<Session> {
        self.sink.sessions()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.engine.current_session()
    }
}
