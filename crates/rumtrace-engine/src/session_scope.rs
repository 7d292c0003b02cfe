use chrono::{DateTime, Duration, Utc};
use rumtrace_types::{
    ApplicationStart, ClosureReason, EventKind, Precondition, Session, ViewIdentity, ViewKind,
};
use uuid::Uuid;

use crate::outcome::SessionContext;
use crate::view_scope::ViewScope;

/// The open session: identity, timing and its views.
#[derive(Debug, Clone)]
pub struct SessionScope {
    id: Uuid,
    precondition: Precondition,
    start_time: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    is_sampled: bool,
    application_start: Option<ApplicationStart>,
    views: ViewScope,
}

impl SessionScope {
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
            last_activity: start_time,
            is_sampled,
            application_start: None,
            views: ViewScope::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn precondition(&self) -> Precondition {
        self.precondition
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn is_sampled(&self) -> bool {
        self.is_sampled
    }

    pub fn views(&self) -> &ViewScope {
        &self.views
    }

    /// `true` once the gap since the last activity reaches `timeout`.
    pub fn is_expired(&self, at: DateTime<Utc>, timeout: Duration) -> bool {
        at - self.last_activity >= timeout
    }

    /// Record activity at `at` on the session and its open view.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_activity = self.last_activity.max(at);
        self.views.touch(at);
    }

    pub fn start_view(&mut self, identity: ViewIdentity, at: DateTime<Utc>) -> Uuid {
        self.last_activity = self.last_activity.max(at);
        self.views.start_view(identity, at)
    }

    pub fn stop_view(&mut self, at: DateTime<Utc>) -> Option<Uuid> {
        let stopped = self.views.stop_view(at)?;
        self.last_activity = self.last_activity.max(at);
        Some(stopped)
    }

    pub fn attribute(&mut self, kind: EventKind, at: DateTime<Utc>) -> Option<Uuid> {
        let view_id = self.views.attribute(kind, at)?;
        self.last_activity = self.last_activity.max(at);
        Some(view_id)
    }

    /// Attach the application-start marker; it counts as an action on the open view.
    pub fn record_application_start(&mut self, marker: ApplicationStart) {
        self.application_start = Some(marker);
        self.views.attribute(EventKind::Action, marker.timestamp);
    }

    /// View to restart in the next session, if the open one is worth resuming.
    pub fn resumable_view(&self) -> Option<ViewIdentity> {
        self.views
            .open_view()
            .filter(|v| v.kind != ViewKind::Background)
            .map(|v| v.identity())
    }

    pub fn context(&self) -> SessionContext {
        SessionContext {
            session_id: self.id,
            view_id: self.views.open_view().map(|v| v.id),
            is_sampled: self.is_sampled,
        }
    }

    /// Current state as an open `Session`.
    pub fn snapshot(&self) -> Session {
        let mut session = self.header();
        session.views = self.views.views().to_vec();
        session
    }

    /// Close the session. A timeout ends it at its last activity, an explicit
    /// stop at `at`.
    pub fn close(mut self, reason: ClosureReason, at: DateTime<Utc>) -> Session {
        let end = match reason {
            ClosureReason::InactivityTimeout => self.last_activity,
            ClosureReason::ExplicitStop => {
                self.touch(at);
                at.max(self.start_time)
            }
        };
        self.views.close(end);

        let mut session = self.header();
        session.end_time = Some(end);
        session.end_reason = Some(reason);
        session.views = self.views.into_views();
        session
    }

    fn header(&self) -> Session {
        let mut session = Session::new(self.id, self.precondition, self.start_time, self.is_sampled);
        session.last_activity = self.last_activity;
        session.application_start = self.application_start;
        session
    }
}
