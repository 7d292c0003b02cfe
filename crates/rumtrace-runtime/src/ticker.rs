use rumtrace_types::Signal;
use std::sync::Arc;
use std::sync::mpsc::{RecvTimeoutError, Sender, channel};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

use crate::Result;
use crate::clock::Clock;
use crate::shared::SharedEngine;

/// Background thread injecting `TimeoutTick` so that inactive sessions are
/// closed even when no further signal arrives.
///
/// Stops when dropped.
pub struct TimeoutTicker {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl TimeoutTicker {
    pub fn start(engine: SharedEngine, clock: Arc<dyn Clock>, interval: Duration) -> Result<Self> {
        let (stop_tx, stop_rx) = channel::<()>();

        let handle = std::thread::Builder::new()
            .name("rumtrace-timeout-ticker".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let outcome = engine.handle(Signal::TimeoutTick, clock.now());
                            for session in &outcome.closed {
                                debug!(session_id = %session.id, "session expired on tick");
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("timeout ticker stopped");
            })?;

        info!(interval_ms = interval.as_millis() as u64, "timeout ticker started");
        Ok(Self {
            stop_tx,
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TimeoutTicker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rumtrace_engine::{EngineConfig, MemorySink, SessionEngine};
    use rumtrace_types::ProcessLaunch;
    use std::time::Instant;

    #[test]
    fn test_ticker_closes_inactive_session() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let sink = MemorySink::new();
        let engine = SharedEngine::new(
            SessionEngine::new(EngineConfig::default())
                .with_launch(ProcessLaunch::user_launch(t0))
                .with_sink(sink.clone()),
        );
        engine.handle(Signal::SdkReady, t0);
        assert!(engine.current_session().is_some());

        let later = t0 + chrono::Duration::hours(1);
        let clock: Arc<dyn Clock> = Arc::new(move || later);
        let ticker = TimeoutTicker::start(engine.clone(), clock, Duration::from_millis(5)).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while sink.is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        ticker.stop();

        assert_eq!(sink.len(), 1);
        assert!(engine.current_session().is_none());
    }

    #[test]
    fn test_ticker_stops_on_drop() {
        let engine = SharedEngine::new(SessionEngine::default());
        let clock: Arc<dyn Clock> = Arc::new(crate::clock::SystemClock);
        let ticker = TimeoutTicker::start(engine, clock, Duration::from_secs(60)).unwrap();
        let started = Instant::now();
        drop(ticker);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
