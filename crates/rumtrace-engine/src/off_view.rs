//! Destination of telemetry that arrives while no view is open.
//!
//! Three synthetic outcomes exist:
//! - the Application-Launch view, covering the launch window of the first
//!   session of the process while it has not tracked any view yet;
//! - a Background view, absorbing background telemetry when background
//!   event tracking is on;
//! - a restart of the view that was open when the previous session closed.
//!
//! Everything else is dropped.

use chrono::{DateTime, Utc};
use rumtrace_types::{AppState, ApplicationStart, EventKind, LaunchKind, ProcessLaunch, ViewIdentity};

use crate::outcome::DropReason;

/// Inputs of the off-view decision
#[derive(Debug, Clone, Copy)]
pub struct OffViewContext<'a> {
    pub app_state: AppState,
    pub event: EventKind,
    /// No session of this process has closed yet
    pub is_initial_session: bool,
    /// `false` when no session is open yet
    pub session_has_views: bool,
    /// View that was open when the previous session closed
    pub resumable: Option<&'a ViewIdentity>,
    pub track_background_events: bool,
    pub track_background_long_tasks: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OffViewDecision {
    /// Open this view at the event timestamp and attribute the event to it
    Open(ViewIdentity),
    Drop(DropReason),
}

pub fn decide(ctx: &OffViewContext<'_>) -> OffViewDecision {
    if ctx.app_state.is_foreground() {
        if ctx.session_has_views {
            return OffViewDecision::Drop(DropReason::NoActiveView);
        }
        return match ctx.resumable {
            Some(identity) => OffViewDecision::Open(identity.clone()),
            None if ctx.is_initial_session => {
                OffViewDecision::Open(ViewIdentity::application_launch())
            }
            None => OffViewDecision::Drop(DropReason::NoActiveView),
        };
    }

    if !ctx.track_background_events {
        return OffViewDecision::Drop(DropReason::BackgroundTrackingDisabled);
    }
    if ctx.event == EventKind::LongTask && !ctx.track_background_long_tasks {
        return OffViewDecision::Drop(DropReason::BackgroundLongTask);
    }
    OffViewDecision::Open(ViewIdentity::background())
}

/// Where the first session and its Application-Launch view begin when
/// observation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchWindow {
    pub start: DateTime<Utc>,
    pub application_start: Option<ApplicationStart>,
}

/// Launch window opened at SDK readiness, or `None` while in background.
///
/// A user launch observed before the app ever became active is backdated to
/// the process launch time and carries the application-start marker. When
/// readiness comes after the app was foregrounded the earlier window is
/// unobservable, so the view starts at readiness with no marker.
pub fn launch_window(
    launch: Option<&ProcessLaunch>,
    app_state: AppState,
    has_been_active: bool,
    ready_at: DateTime<Utc>,
) -> Option<LaunchWindow> {
    if !app_state.is_foreground() {
        return None;
    }

    match launch {
        Some(launch)
            if launch.kind() == LaunchKind::UserLaunch
                && !has_been_active
                && launch.launch_time <= ready_at =>
        {
            Some(LaunchWindow {
                start: launch.launch_time,
                application_start: Some(ApplicationStart {
                    timestamp: launch.launch_time,
                    startup_time_ms: (ready_at - launch.launch_time).num_milliseconds(),
                }),
            })
        }
        _ => Some(LaunchWindow {
            start: ready_at,
            application_start: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rumtrace_types::ViewKind;

    fn ctx(app_state: AppState, event: EventKind) -> OffViewContext<'static> {
        OffViewContext {
            app_state,
            event,
            is_initial_session: true,
            session_has_views: false,
            resumable: None,
            track_background_events: false,
            track_background_long_tasks: false,
        }
    }

    #[test]
    fn test_foreground_without_views_opens_application_launch() {
        let decision = decide(&ctx(AppState::Active, EventKind::Action));
        assert_eq!(
            decision,
            OffViewDecision::Open(ViewIdentity::application_launch())
        );
    }

    #[test]
    fn test_foreground_successor_without_resumable_view_is_dropped() {
        let mut context = ctx(AppState::Active, EventKind::Action);
        context.is_initial_session = false;

        assert_eq!(
            decide(&context),
            OffViewDecision::Drop(DropReason::NoActiveView)
        );
    }

    #[test]
    fn test_foreground_restarts_resumable_view() {
        let resumable = ViewIdentity::new("Checkout", ViewKind::Manual);
        let mut context = ctx(AppState::Inactive, EventKind::Error);
        context.is_initial_session = false;
        context.resumable = Some(&resumable);

        assert_eq!(decide(&context), OffViewDecision::Open(resumable.clone()));
    }

    #[test]
    fn test_background_successor_still_opens_background_view() {
        let mut context = ctx(AppState::Background, EventKind::Action);
        context.is_initial_session = false;
        context.track_background_events = true;

        assert_eq!(
            decide(&context),
            OffViewDecision::Open(ViewIdentity::background())
        );
    }

    #[test]
    fn test_foreground_after_stopped_view_is_dropped() {
        let mut context = ctx(AppState::Active, EventKind::ResourceStart);
        context.session_has_views = true;

        assert_eq!(
            decide(&context),
            OffViewDecision::Drop(DropReason::NoActiveView)
        );
    }

    #[test]
    fn test_background_requires_tracking_flag() {
        let mut context = ctx(AppState::Background, EventKind::Action);
        assert_eq!(
            decide(&context),
            OffViewDecision::Drop(DropReason::BackgroundTrackingDisabled)
        );

        context.track_background_events = true;
        assert_eq!(
            decide(&context),
            OffViewDecision::Open(ViewIdentity::background())
        );
    }

    #[test]
    fn test_background_ignores_resumable_view() {
        let resumable = ViewIdentity::new("Checkout", ViewKind::Manual);
        let mut context = ctx(AppState::Background, EventKind::Action);
        context.track_background_events = true;
        context.resumable = Some(&resumable);

        assert_eq!(
            decide(&context),
            OffViewDecision::Open(ViewIdentity::background())
        );
    }

    #[test]
    fn test_background_long_task() {
        let mut context = ctx(AppState::Background, EventKind::LongTask);
        context.track_background_events = true;
        assert_eq!(
            decide(&context),
            OffViewDecision::Drop(DropReason::BackgroundLongTask)
        );

        context.track_background_long_tasks = true;
        assert_eq!(
            decide(&context),
            OffViewDecision::Open(ViewIdentity::background())
        );
    }

    #[test]
    fn test_launch_window_user_launch_before_active() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let ready = t0 + Duration::milliseconds(1100);
        let launch = ProcessLaunch::user_launch(t0);

        let window = launch_window(Some(&launch), AppState::Inactive, false, ready).unwrap();
        assert_eq!(window.start, t0);
        assert_eq!(
            window.application_start.map(|m| m.startup_time_ms),
            Some(1100)
        );
    }

    #[test]
    fn test_launch_window_after_active_has_no_marker() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let ready = t0 + Duration::seconds(2);

        for launch in [
            ProcessLaunch::user_launch(t0),
            ProcessLaunch::os_prewarm(t0),
            ProcessLaunch::background_launch(t0),
        ] {
            let window = launch_window(Some(&launch), AppState::Active, true, ready).unwrap();
            assert_eq!(window.start, ready);
            assert!(window.application_start.is_none());
        }
    }

    #[test]
    fn test_launch_window_in_background() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let launch = ProcessLaunch::os_prewarm(t0);
        assert!(launch_window(Some(&launch), AppState::Background, false, t0).is_none());
        assert!(launch_window(None, AppState::Background, false, t0).is_none());
    }

    #[test]
    fn test_launch_window_without_descriptor() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let window = launch_window(None, AppState::Inactive, false, t0).unwrap();
        assert_eq!(window.start, t0);
        assert!(window.application_start.is_none());
    }
}
