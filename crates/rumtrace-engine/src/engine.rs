use chrono::{DateTime, Utc};
use rumtrace_types::{
    AppState, ClosureReason, EventKind, LaunchKind, Precondition, ProcessLaunch, Session, Signal,
    ViewIdentity, ViewKind,
};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::off_view::{self, OffViewContext, OffViewDecision};
use crate::outcome::{Disposition, DropReason, HandleOutcome, SessionContext};
use crate::sampler::{AlwaysSample, Sampler};
use crate::session_scope::SessionScope;
use crate::sink::{NullSink, SessionSink};

/// Session lifecycle engine.
///
/// Consumes timestamped signals one at a time, opens and closes sessions,
/// and attributes telemetry to views. Every call is a synchronous state
/// transition; callers sharing an engine across threads must serialize
/// access (see `rumtrace-runtime`).
pub struct SessionEngine {
    config: EngineConfig,
    sampler: Box<dyn Sampler>,
    sink: Box<dyn SessionSink>,

    launch: Option<ProcessLaunch>,
    app_state: AppState,
    has_been_active: bool,
    ready_at: Option<DateTime<Utc>>,

    current: Option<SessionScope>,
    last_closure: Option<ClosureReason>,
    resumable_view: Option<ViewIdentity>,
}

impl SessionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sampler: Box::new(AlwaysSample),
            sink: Box::new(NullSink),
            launch: None,
            // without a descriptor assume the common case of a user launch
            app_state: AppState::Inactive,
            has_been_active: false,
            ready_at: None,
            current: None,
            last_closure: None,
            resumable_view: None,
        }
    }

    pub fn with_sampler(mut self, sampler: impl Sampler + 'static) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    pub fn with_sink(mut self, sink: impl SessionSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_launch(mut self, launch: ProcessLaunch) -> Self {
        self.apply_launch(launch);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn app_state(&self) -> AppState {
        self.app_state
    }

    pub fn is_ready(&self) -> bool {
        self.ready_at.is_some()
    }

    /// Snapshot of the open session, if any.
    pub fn current_session(&self) -> Option<Session> {
        self.current.as_ref().map(SessionScope::snapshot)
    }

    /// Identifiers of the open session and view.
    pub fn current_context(&self) -> Option<SessionContext> {
        self.current.as_ref().map(SessionScope::context)
    }

    /// Consume one signal observed at `at`.
    pub fn handle(&mut self, signal: Signal, at: DateTime<Utc>) -> HandleOutcome {
        let mut closed = Vec::new();

        if let Some(kind) = signal.event_kind() {
            let in_order = self.accepts(at);
            debug_assert!(in_order, "{:?} at {} precedes the open view's start", kind, at);
            if !in_order {
                warn!(event = ?kind, %at, "signal precedes the open view's start; ignored");
                return HandleOutcome {
                    closed,
                    disposition: Disposition::Dropped(DropReason::OutOfOrder),
                };
            }
        }

        if let Some(session) = self.expire(at) {
            closed.push(session);
        }

        let disposition = match signal {
            Signal::ProcessLaunch(launch) => {
                self.apply_launch(launch);
                Disposition::Applied
            }
            Signal::SdkReady => {
                self.on_ready(at);
                Disposition::Applied
            }
            Signal::AppStateChanged { state } => {
                self.on_app_state(state, at);
                Disposition::Applied
            }
            Signal::SessionStop => {
                if let Some(session) = self.stop_session(at) {
                    closed.push(session);
                }
                Disposition::Applied
            }
            Signal::TimeoutTick => Disposition::Applied,
            Signal::ViewStart { name, kind } => self.on_view_start(name, kind, at),
            Signal::ViewStop => self.on_view_stop(at),
            Signal::ResourceStop => self.on_resource_stop(at),
            Signal::Action => self.on_telemetry(EventKind::Action, at),
            Signal::ResourceStart => self.on_telemetry(EventKind::ResourceStart, at),
            Signal::LongTask => self.on_telemetry(EventKind::LongTask, at),
            Signal::Error => self.on_telemetry(EventKind::Error, at),
        };

        if let Disposition::Dropped(reason) = disposition {
            trace!(%reason, %at, "signal dropped");
        }

        HandleOutcome {
            closed,
            disposition,
        }
    }

    // ========================================================================
    // Lifecycle signals
    // ========================================================================

    fn apply_launch(&mut self, launch: ProcessLaunch) {
        if self.launch.is_some() {
            warn!("process launch descriptor received twice; keeping the first");
            return;
        }
        if self.ready_at.is_none() {
            self.app_state = launch.initial_app_state;
        }
        self.launch = Some(launch);
    }

    fn on_ready(&mut self, at: DateTime<Utc>) {
        if self.ready_at.is_some() {
            warn!(%at, "observation already started");
            return;
        }
        self.ready_at = Some(at);

        if self.current.is_some() {
            return;
        }
        let Some(window) =
            off_view::launch_window(self.launch.as_ref(), self.app_state, self.has_been_active, at)
        else {
            debug!(%at, "ready in background, no session yet");
            return;
        };

        let mut scope = self.open_session(Precondition::UserAppLaunch, window.start);
        scope.start_view(ViewIdentity::application_launch(), window.start);
        if let Some(marker) = window.application_start {
            scope.record_application_start(marker);
        }
        scope.touch(at);
        self.current = Some(scope);
    }

    fn on_app_state(&mut self, state: AppState, at: DateTime<Utc>) {
        debug!(from = ?self.app_state, to = ?state, %at, "app state changed");
        self.app_state = state;
        if state == AppState::Active {
            self.has_been_active = true;
        }
        if let Some(scope) = self.current.as_mut() {
            scope.touch(at);
        }
    }

    fn stop_session(&mut self, at: DateTime<Utc>) -> Option<Session> {
        let scope = self.current.take()?;
        Some(self.close(scope, ClosureReason::ExplicitStop, at))
    }

    fn expire(&mut self, at: DateTime<Utc>) -> Option<Session> {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|scope| scope.is_expired(at, self.config.session_timeout));
        if !expired {
            return None;
        }
        let scope = self.current.take()?;
        Some(self.close(scope, ClosureReason::InactivityTimeout, at))
    }

    // ========================================================================
    // Application events
    // ========================================================================

    fn on_view_start(
        &mut self,
        name: String,
        kind: ViewKind,
        at: DateTime<Utc>,
    ) -> Disposition {
        if !self.is_ready() {
            return Disposition::Dropped(DropReason::NotReady);
        }

        let kind = if kind.is_synthetic() {
            warn!(?kind, name = %name, "synthetic view kind requested by caller; tracked as manual");
            ViewKind::Manual
        } else {
            kind
        };

        let scope = self.ensure_session(at);
        let view_id = scope.start_view(ViewIdentity::new(name, kind), at);
        Disposition::Attributed {
            session_id: scope.id(),
            view_id,
        }
    }

    fn on_view_stop(&mut self, at: DateTime<Utc>) -> Disposition {
        if !self.is_ready() {
            return Disposition::Dropped(DropReason::NotReady);
        }

        let Some(scope) = self.current.as_mut() else {
            // the view the user left must not come back in the next session
            self.resumable_view = None;
            return Disposition::Dropped(DropReason::NoActiveView);
        };

        match scope.stop_view(at) {
            Some(view_id) => Disposition::Attributed {
                session_id: scope.id(),
                view_id,
            },
            None => Disposition::Dropped(DropReason::NoActiveView),
        }
    }

    fn on_resource_stop(&mut self, at: DateTime<Utc>) -> Disposition {
        if !self.is_ready() {
            return Disposition::Dropped(DropReason::NotReady);
        }

        let Some(scope) = self.current.as_mut() else {
            return Disposition::Dropped(DropReason::NoActiveView);
        };
        match scope.attribute(EventKind::ResourceStop, at) {
            Some(view_id) => Disposition::Attributed {
                session_id: scope.id(),
                view_id,
            },
            None => Disposition::Dropped(DropReason::NoActiveView),
        }
    }

    fn on_telemetry(&mut self, kind: EventKind, at: DateTime<Utc>) -> Disposition {
        if !self.is_ready() {
            return Disposition::Dropped(DropReason::NotReady);
        }

        if let Some(scope) = self.current.as_mut()
            && let Some(view_id) = scope.attribute(kind, at)
        {
            return Disposition::Attributed {
                session_id: scope.id(),
                view_id,
            };
        }

        let context = OffViewContext {
            app_state: self.app_state,
            event: kind,
            is_initial_session: self.last_closure.is_none(),
            session_has_views: self
                .current
                .as_ref()
                .is_some_and(|scope| scope.views().has_tracked_views()),
            resumable: self.resumable_view.as_ref(),
            track_background_events: self.config.track_background_events,
            track_background_long_tasks: self.config.track_background_long_tasks,
        };

        let identity = match off_view::decide(&context) {
            OffViewDecision::Open(identity) => identity,
            OffViewDecision::Drop(reason) => return Disposition::Dropped(reason),
        };

        let scope = self.ensure_session(at);
        scope.start_view(identity, at);
        match scope.attribute(kind, at) {
            Some(view_id) => Disposition::Attributed {
                session_id: scope.id(),
                view_id,
            },
            None => Disposition::Dropped(DropReason::NoActiveView),
        }
    }

    // ========================================================================
    // Session bookkeeping
    // ========================================================================

    fn accepts(&self, at: DateTime<Utc>) -> bool {
        self.current
            .as_ref()
            .is_none_or(|scope| scope.views().accepts(at))
    }

    fn ensure_session(&mut self, at: DateTime<Utc>) -> &mut SessionScope {
        let scope = match self.current.take() {
            Some(scope) => scope,
            None => {
                let precondition = self.next_precondition();
                self.open_session(precondition, at)
            }
        };
        self.current.insert(scope)
    }

    /// Successors follow the previous closure; the first session follows the launch.
    fn next_precondition(&self) -> Precondition {
        if let Some(reason) = self.last_closure {
            return reason.successor_precondition();
        }
        match self.launch.map(|launch| launch.kind()) {
            Some(LaunchKind::UserLaunch) => Precondition::UserAppLaunch,
            Some(LaunchKind::OsPrewarm) => Precondition::Prewarm,
            Some(LaunchKind::BackgroundLaunch) => Precondition::BackgroundLaunch,
            None if self.app_state.is_foreground() => Precondition::UserAppLaunch,
            None => Precondition::BackgroundLaunch,
        }
    }

    fn open_session(&mut self, precondition: Precondition, at: DateTime<Utc>) -> SessionScope {
        let id = Uuid::new_v4();
        let is_sampled = self.sampler.sample(&id);
        self.resumable_view = None;

        debug!(
            session_id = %id,
            ?precondition,
            sampled = is_sampled,
            %at,
            "session opened"
        );
        SessionScope::new(id, precondition, at, is_sampled)
    }

    fn close(&mut self, scope: SessionScope, reason: ClosureReason, at: DateTime<Utc>) -> Session {
        self.resumable_view = scope.resumable_view();
        self.last_closure = Some(reason);

        let session = scope.close(reason, at);
        debug!(
            session_id = %session.id,
            ?reason,
            views = session.views.len(),
            sampled = session.is_sampled,
            "session closed"
        );

        if session.is_sampled {
            self.sink.emit(&session);
        }
        session
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use chrono::{Duration, TimeZone};

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::milliseconds(ms)
    }

    fn ready_engine(launch: ProcessLaunch, config: EngineConfig) -> (SessionEngine, MemorySink) {
        let sink = MemorySink::new();
        let mut engine = SessionEngine::new(config)
            .with_launch(launch)
            .with_sink(sink.clone());
        engine.handle(Signal::SdkReady, launch.launch_time);
        (engine, sink)
    }

    #[test]
    fn test_events_before_ready_are_dropped() {
        let mut engine = SessionEngine::default().with_launch(ProcessLaunch::user_launch(t(0)));
        let outcome = engine.handle(Signal::Action, t(10));

        assert_eq!(outcome.disposition.drop_reason(), Some(DropReason::NotReady));
        assert!(engine.current_session().is_none());
    }

    #[test]
    fn test_second_launch_descriptor_is_ignored() {
        let mut engine = SessionEngine::default().with_launch(ProcessLaunch::os_prewarm(t(0)));
        engine.handle(Signal::ProcessLaunch(ProcessLaunch::user_launch(t(5))), t(5));
        engine.handle(Signal::SdkReady, t(6));

        assert_eq!(engine.app_state(), AppState::Background);
        assert!(engine.current_session().is_none());
    }

    #[test]
    fn test_view_start_opens_session_in_background() {
        let (mut engine, _) =
            ready_engine(ProcessLaunch::background_launch(t(0)), EngineConfig::default());

        let outcome = engine.handle(Signal::view_start("Map", ViewKind::Manual), t(100));
        assert!(matches!(outcome.disposition, Disposition::Attributed { .. }));

        let session = engine.current_session().unwrap();
        assert_eq!(session.precondition, Precondition::BackgroundLaunch);
        assert_eq!(session.view_names(), vec!["Map"]);
    }

    #[test]
    fn test_synthetic_kind_from_caller_is_tracked_as_manual() {
        let (mut engine, _) = ready_engine(ProcessLaunch::user_launch(t(0)), EngineConfig::default());
        engine.handle(
            Signal::view_start("Fake", ViewKind::Background),
            t(100),
        );

        let session = engine.current_session().unwrap();
        assert_eq!(session.views.last().map(|v| v.kind), Some(ViewKind::Manual));
    }

    #[test]
    fn test_unsampled_session_is_not_emitted() {
        let sink = MemorySink::new();
        let mut engine = SessionEngine::default()
            .with_launch(ProcessLaunch::user_launch(t(0)))
            .with_sampler(|_: &Uuid| false)
            .with_sink(sink.clone());

        engine.handle(Signal::SdkReady, t(100));
        engine.handle(Signal::Action, t(200));
        let outcome = engine.handle(Signal::SessionStop, t(300));

        assert_eq!(outcome.closed.len(), 1);
        assert!(!outcome.closed[0].is_sampled);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_timeout_tick_closes_expired_session_without_activity() {
        let config = EngineConfig::default().with_session_timeout(Duration::seconds(10));
        let (mut engine, sink) = ready_engine(ProcessLaunch::user_launch(t(0)), config);

        engine.handle(Signal::view_start("Home", ViewKind::Manual), t(1_000));
        let early = engine.handle(Signal::TimeoutTick, t(10_999));
        assert!(early.closed.is_empty());
        assert!(engine.current_session().is_some());

        let late = engine.handle(Signal::TimeoutTick, t(11_000));
        assert_eq!(late.closed.len(), 1);
        assert_eq!(late.closed[0].end_time, Some(t(1_000)));
        assert!(engine.current_session().is_none());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_current_context_follows_views() {
        let (mut engine, _) = ready_engine(ProcessLaunch::user_launch(t(0)), EngineConfig::default());
        let outcome = engine.handle(Signal::view_start("Home", ViewKind::Manual), t(50));

        let Disposition::Attributed { session_id, view_id } = outcome.disposition else {
            panic!("expected attribution, got {:?}", outcome.disposition);
        };
        let context = engine.current_context().unwrap();
        assert_eq!(context.session_id, session_id);
        assert_eq!(context.view_id, Some(view_id));

        engine.handle(Signal::ViewStop, t(60));
        assert_eq!(engine.current_context().unwrap().view_id, None);
    }

    #[test]
    fn test_resource_stop_never_opens_a_session() {
        let (mut engine, _) = ready_engine(ProcessLaunch::os_prewarm(t(0)), EngineConfig::default());
        engine.handle(Signal::app_state(AppState::Active), t(100));

        let outcome = engine.handle(Signal::ResourceStop, t(200));
        assert_eq!(outcome.disposition.drop_reason(), Some(DropReason::NoActiveView));
        assert!(engine.current_session().is_none());
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_out_of_order_event_is_ignored_in_release() {
        let (mut engine, _) = ready_engine(ProcessLaunch::user_launch(t(0)), EngineConfig::default());
        engine.handle(Signal::view_start("Home", ViewKind::Manual), t(1_000));

        let outcome = engine.handle(Signal::Action, t(500));
        assert_eq!(outcome.disposition.drop_reason(), Some(DropReason::OutOfOrder));
        assert_eq!(engine.current_session().unwrap().action_count(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "precedes the open view's start")]
    fn test_out_of_order_event_fails_fast_in_debug() {
        let (mut engine, _) = ready_engine(ProcessLaunch::user_launch(t(0)), EngineConfig::default());
        engine.handle(Signal::view_start("Home", ViewKind::Manual), t(1_000));
        engine.handle(Signal::Action, t(500));
    }
}
