use rumtrace_types::Session;
use std::fmt;
use uuid::Uuid;

/// Why a signal left no trace in any session.
///
/// Drops are a normal outcome of the attribution policy, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Observation has not started yet
    NotReady,
    /// Background telemetry while background event tracking is off
    BackgroundTrackingDisabled,
    /// Long tasks never open a Background view
    BackgroundLongTask,
    /// Nothing to attach to and no synthetic view applies
    NoActiveView,
    /// Timestamp earlier than the open view's start
    OutOfOrder,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::NotReady => write!(f, "not_ready"),
            DropReason::BackgroundTrackingDisabled => write!(f, "background_tracking_disabled"),
            DropReason::BackgroundLongTask => write!(f, "background_long_task"),
            DropReason::NoActiveView => write!(f, "no_active_view"),
            DropReason::OutOfOrder => write!(f, "out_of_order"),
        }
    }
}

/// What happened to a single signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The event landed on this view
    Attributed { session_id: Uuid, view_id: Uuid },
    /// A lifecycle or control signal was applied
    Applied,
    Dropped(DropReason),
}

impl Disposition {
    pub fn is_dropped(&self) -> bool {
        matches!(self, Disposition::Dropped(_))
    }

    pub fn drop_reason(&self) -> Option<DropReason> {
        match self {
            Disposition::Dropped(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Result of handling one signal
#[derive(Debug, Clone)]
pub struct HandleOutcome {
    /// Sessions closed while handling the signal, sampled or not
    pub closed: Vec<Session>,
    pub disposition: Disposition,
}

/// Identifiers of the open session and view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub view_id: Option<Uuid>,
    pub is_sampled: bool,
}
