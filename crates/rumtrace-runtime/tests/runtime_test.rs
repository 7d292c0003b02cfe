use chrono::{DateTime, Duration, TimeZone, Utc};
use rumtrace_engine::MemorySink;
use rumtrace_runtime::{Clock, Config, Runtime};
use rumtrace_types::{ClosureReason, ProcessLaunch, Signal};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Clock the test moves by hand.
#[derive(Clone)]
struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
    fn new(at: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(at)))
    }

    fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
}

fn wait_for(mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + std::time::Duration::from_secs(5);
    while !done() && Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
}

#[test]
fn test_configured_tick_interval_closes_idle_session() {
    let config = Config {
        session_timeout_secs: 60,
        timeout_tick_interval_ms: 5,
        ..Config::default()
    };
    let clock = ManualClock::new(t0());
    let sink = MemorySink::new();
    let runtime = Runtime::start(
        &config,
        Some(ProcessLaunch::user_launch(t0())),
        sink.clone(),
        Arc::new(clock.clone()),
    )
    .unwrap();
    assert!(runtime.is_ticking());

    runtime.record(Signal::SdkReady);
    assert!(runtime.engine().current_session().is_some());

    clock.advance(Duration::seconds(61));
    wait_for(|| !sink.is_empty());
    runtime.shutdown();

    let sessions = sink.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].end_reason, Some(ClosureReason::InactivityTimeout));
    assert_eq!(sessions[0].end_time, Some(t0()));
}

#[test]
fn test_zero_tick_interval_disables_ticker() {
    let config = Config {
        session_timeout_secs: 60,
        timeout_tick_interval_ms: 0,
        ..Config::default()
    };
    let clock = ManualClock::new(t0());
    let sink = MemorySink::new();
    let runtime = Runtime::start(
        &config,
        Some(ProcessLaunch::user_launch(t0())),
        sink.clone(),
        Arc::new(clock.clone()),
    )
    .unwrap();
    assert!(!runtime.is_ticking());

    runtime.record(Signal::SdkReady);
    clock.advance(Duration::seconds(120));
    std::thread::sleep(std::time::Duration::from_millis(50));
    assert!(sink.is_empty());

    // expiry still happens lazily on the next signal
    let outcome = runtime.record(Signal::TimeoutTick);
    assert_eq!(outcome.closed.len(), 1);
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_start_rejects_invalid_config() {
    let config = Config {
        session_sample_rate: 150.0,
        ..Config::default()
    };
    let result = Runtime::start(
        &config,
        None,
        MemorySink::new(),
        Arc::new(ManualClock::new(t0())),
    );
    assert!(result.is_err());
}
