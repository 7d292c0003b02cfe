use chrono::{DateTime, Utc};
use rumtrace_types::{EventKind, View, ViewIdentity};
use uuid::Uuid;

/// Ordered views of one session. At most the last view is open.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    views: Vec<View>,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn into_views(self) -> Vec<View> {
        self.views
    }

    pub fn open_view(&self) -> Option<&View> {
        self.views.last().filter(|v| v.is_open())
    }

    fn open_view_mut(&mut self) -> Option<&mut View> {
        self.views.last_mut().filter(|v| v.is_open())
    }

    pub fn has_tracked_views(&self) -> bool {
        !self.views.is_empty()
    }

    /// `false` when `at` precedes the open view's start.
    pub fn accepts(&self, at: DateTime<Utc>) -> bool {
        self.open_view().is_none_or(|v| at >= v.start_time)
    }

    /// Close the open view at `at` (if any) and open a new one starting at `at`.
    pub fn start_view(&mut self, identity: ViewIdentity, at: DateTime<Utc>) -> Uuid {
        if let Some(previous) = self.open_view_mut() {
            previous.end_time = Some(at);
        }

        let view = View::new(identity, at);
        let id = view.id;
        self.views.push(view);
        id
    }

    /// Stop the open view. No-op returning `None` when nothing is open.
    pub fn stop_view(&mut self, at: DateTime<Utc>) -> Option<Uuid> {
        let view = self.open_view_mut()?;
        view.last_activity = view.last_activity.max(at);
        view.end_time = Some(at);
        Some(view.id)
    }

    /// Count the event on the open view. `None` when no view is open.
    pub fn attribute(&mut self, kind: EventKind, at: DateTime<Utc>) -> Option<Uuid> {
        let view = self.open_view_mut()?;
        match kind {
            EventKind::Action => view.action_count += 1,
            EventKind::ResourceStart => view.resource_count += 1,
            EventKind::LongTask => view.long_task_count += 1,
            EventKind::Error => view.error_count += 1,
            EventKind::ResourceStop | EventKind::ViewStart | EventKind::ViewStop => {}
        }
        view.last_activity = view.last_activity.max(at);
        Some(view.id)
    }

    /// Extend the open view's activity without counting anything.
    pub fn touch(&mut self, at: DateTime<Utc>) -> Option<Uuid> {
        let view = self.open_view_mut()?;
        view.last_activity = view.last_activity.max(at);
        Some(view.id)
    }

    /// Close the open view at session end.
    pub fn close(&mut self, at: DateTime<Utc>) {
        if let Some(view) = self.open_view_mut() {
            let end = at.max(view.start_time);
            view.last_activity = view.last_activity.min(end);
            view.end_time = Some(end);
        }
    }
}
