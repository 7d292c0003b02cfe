use crate::handlers::replay::ReplayReport;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use owo_colors::OwoColorize;
use rumtrace_types::{Session, View};
use std::fmt::Write;

pub fn render_replay(report: &ReplayReport, color: bool) -> String {
    let mut out = String::new();

    for (index, session) in report.sessions.iter().enumerate() {
        render_session(&mut out, index + 1, session, color);
    }

    let _ = writeln!(
        out,
        "{} sessions, {} signals, {} dropped, {} unsampled",
        report.sessions.len(),
        report.signals,
        report.dropped,
        report.unsampled
    );
    out
}

fn render_session(out: &mut String, number: usize, session: &Session, color: bool) {
    let id = session.id.to_string();
    let short_id = &id[..8];
    let header = format!("Session {} {}", number, short_id);
    let precondition = snake(&session.precondition);

    let status = match session.end_reason {
        Some(reason) => snake(&reason),
        None => "open".to_string(),
    };

    if color {
        let _ = writeln!(
            out,
            "{}  {}  {} -> {} ({})  {}",
            header.bold(),
            precondition.cyan(),
            timestamp(session.start_time),
            timestamp(session.end_time.unwrap_or(session.last_activity)),
            seconds(session.duration()),
            status.yellow()
        );
    } else {
        let _ = writeln!(
            out,
            "{}  {}  {} -> {} ({})  {}",
            header,
            precondition,
            timestamp(session.start_time),
            timestamp(session.end_time.unwrap_or(session.last_activity)),
            seconds(session.duration()),
            status
        );
    }

    if let Some(marker) = session.application_start {
        let _ = writeln!(out, "  application start: {}", seconds(marker.startup_time()));
    }

    for view in &session.views {
        render_view(out, view);
    }
}

fn render_view(out: &mut String, view: &View) {
    let _ = writeln!(
        out,
        "  {} [{}] {}{}  actions={} resources={} long_tasks={} errors={}",
        view.name,
        snake(&view.kind),
        seconds(view.duration()),
        if view.is_open() { " (open)" } else { "" },
        view.action_count,
        view.resource_count,
        view.long_task_count,
        view.error_count
    );
}

/// Serialized (snake_case) name of a unit enum value.
fn snake<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn seconds(duration: Duration) -> String {
    format!("{:.3}s", duration.num_milliseconds() as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rumtrace_types::{ClosureReason, Precondition, ViewIdentity};
    use uuid::Uuid;

    #[test]
    fn test_render_plain_without_color() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let id = Uuid::parse_str("12345678-0000-4000-8000-000000000001").unwrap();
        let mut session = Session::new(id, Precondition::ExplicitStop, t0, true);
        let mut view = View::new(ViewIdentity::application_launch(), t0);
        view.action_count = 1;
        view.end_time = Some(t0 + Duration::milliseconds(1_250));
        session.views.push(view);
        session.end_time = Some(t0 + Duration::milliseconds(1_250));
        session.end_reason = Some(ClosureReason::InactivityTimeout);

        let report = ReplayReport {
            signals: 4,
            dropped: 1,
            unsampled: 0,
            sessions: vec![session],
        };

        let rendered = render_replay(&report, false);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines[0],
            "Session 1 12345678  explicit_stop  2025-01-01T00:00:00.000Z -> 2025-01-01T00:00:01.250Z (1.250s)  inactivity_timeout"
        );
        assert_eq!(
            lines[1],
            "  ApplicationLaunch [application_launch] 1.250s  actions=1 resources=0 long_tasks=0 errors=0"
        );
        assert_eq!(lines[2], "1 sessions, 4 signals, 1 dropped, 0 unsampled");
    }
}
