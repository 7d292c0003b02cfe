//! Session and view lifecycle engine.
//!
//! Feeds timestamped `Signal`s through a [`SessionEngine`], which decides
//! when sessions start, time out or stop, and which view each piece of
//! telemetry belongs to. Closed, sampled sessions are handed to a
//! [`SessionSink`].

pub mod config;
pub mod engine;
pub mod off_view;
pub mod outcome;
pub mod sampler;
pub mod session_scope;
pub mod sink;
pub mod view_scope;

pub use config::{DEFAULT_SESSION_TIMEOUT_SECS, EngineConfig};
pub use engine::SessionEngine;
pub use off_view::{LaunchWindow, OffViewContext, OffViewDecision};
pub use outcome::{Disposition, DropReason, HandleOutcome, SessionContext};
pub use sampler::{AlwaysSample, RateSampler, Sampler};
pub use session_scope::SessionScope;
pub use sink::{MemorySink, NullSink, SessionSink};
pub use view_scope::ViewScope;

use rumtrace_types::{Session, TimedSignal};

/// Sessions produced by replaying a signal feed
#[derive(Debug, Clone, Default)]
pub struct Replay {
    /// Closed sessions in closing order, sampled or not
    pub closed: Vec<Session>,
    /// Session still open after the last signal
    pub open: Option<Session>,
    /// Signals that were dropped
    pub dropped: usize,
}

impl Replay {
    /// Closed sessions followed by the open one.
    pub fn all_sessions(&self) -> Vec<&Session> {
        self.closed.iter().chain(self.open.as_ref()).collect()
    }
}

/// Drive `engine` with every signal of `signals`, in order.
pub fn replay<'a>(
    engine: &mut SessionEngine,
    signals: impl IntoIterator<Item = &'a TimedSignal>,
) -> Replay {
    let mut replay = Replay::default();

    for timed in signals {
        let outcome = engine.handle(timed.signal.clone(), timed.at);
        if outcome.disposition.is_dropped() {
            replay.dropped += 1;
        }
        replay.closed.extend(outcome.closed);
    }

    replay.open = engine.current_session();
    replay
}
