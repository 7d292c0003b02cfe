//! Custom assertions for session/view validation.
//!
//! Durations are compared with millisecond tolerance since tests express
//! time in fractional seconds.

use anyhow::{Result, bail};
use chrono::Duration;
use rumtrace_types::Session;

/// Tolerance applied by [`assert_duration`]
pub const DURATION_ACCURACY_MS: i64 = 10;

/// Assert that `actual` is within [`DURATION_ACCURACY_MS`] of `expected_secs`.
pub fn assert_duration(actual: Duration, expected_secs: f64) -> Result<()> {
    let expected_ms = (expected_secs * 1000.0).round() as i64;
    let actual_ms = actual.num_milliseconds();

    if (actual_ms - expected_ms).abs() > DURATION_ACCURACY_MS {
        bail!(
            "Expected duration {:.3}s, got {:.3}s",
            expected_secs,
            actual_ms as f64 / 1000.0
        );
    }
    Ok(())
}

/// Assert that sessions and the views inside each session never overlap.
pub fn assert_non_overlapping(sessions: &[Session]) -> Result<()> {
    for pair in sessions.windows(2) {
        let (earlier, later) = (&pair[0], &pair[1]);
        if later.start_time < earlier.start_time {
            bail!("Session {} starts before its predecessor", later.id);
        }
        match earlier.end_time {
            Some(end) if end <= later.start_time => {}
            Some(end) => bail!(
                "Session {} ends at {} after session {} starts at {}",
                earlier.id,
                end,
                later.id,
                later.start_time
            ),
            None => bail!("Session {} is open but followed by {}", earlier.id, later.id),
        }
    }

    for session in sessions {
        let session_end = session.end_time.unwrap_or(session.last_activity);
        for view in &session.views {
            if view.start_time < session.start_time {
                bail!("View {} starts before session {}", view.name, session.id);
            }
            if let Some(end) = view.end_time
                && end > session_end
            {
                bail!("View {} ends after session {}", view.name, session.id);
            }
        }
        for pair in session.views.windows(2) {
            match pair[0].end_time {
                Some(end) if end <= pair[1].start_time => {}
                _ => bail!(
                    "View {} overlaps view {} in session {}",
                    pair[0].name,
                    pair[1].name,
                    session.id
                ),
            }
        }
    }

    Ok(())
}

/// Access helpers for the expected number of sessions.
pub trait SessionsExt {
    fn take_single(&self) -> Result<&Session>;
    fn take_two(&self) -> Result<(&Session, &Session)>;
}

impl SessionsExt for [Session] {
    fn take_single(&self) -> Result<&Session> {
        match self {
            [only] => Ok(only),
            _ => bail!("Expected 1 session, got {}", self.len()),
        }
    }

    fn take_two(&self) -> Result<(&Session, &Session)> {
        match self {
            [first, second] => Ok((first, second)),
            _ => bail!("Expected 2 sessions, got {}", self.len()),
        }
    }
}

impl SessionsExt for Vec<Session> {
    fn take_single(&self) -> Result<&Session> {
        self.as_slice().take_single()
    }

    fn take_two(&self) -> Result<(&Session, &Session)> {
        self.as_slice().take_two()
    }
}
