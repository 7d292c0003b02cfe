use chrono::{DateTime, Utc};
use rumtrace_engine::{HandleOutcome, SessionContext, SessionEngine, SessionSink};
use rumtrace_types::{ProcessLaunch, Session, Signal};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Config;

/// Engine handle shared between signal producers.
///
/// All access goes through one mutex, so each signal is applied atomically
/// and readers always see a consistent snapshot.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<SessionEngine>>,
}

impl SharedEngine {
    pub fn new(engine: SessionEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Build an engine from on-disk configuration.
    pub fn from_config(
        config: &Config,
        launch: Option<ProcessLaunch>,
        sink: impl SessionSink + 'static,
    ) -> Self {
        let mut engine = SessionEngine::new(config.engine_config())
            .with_sampler(config.sampler())
            .with_sink(sink);
        if let Some(launch) = launch {
            engine = engine.with_launch(launch);
        }
        Self::new(engine)
    }

    pub fn handle(&self, signal: Signal, at: DateTime<Utc>) -> HandleOutcome {
        self.lock().handle(signal, at)
    }

    pub fn current_session(&self) -> Option<Session> {
        self.lock().current_session()
    }

    pub fn current_context(&self) -> Option<SessionContext> {
        self.lock().current_context()
    }

    fn lock(&self) -> MutexGuard<'_, SessionEngine> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rumtrace_engine::{EngineConfig, MemorySink};
    use std::thread;

    #[test]
    fn test_concurrent_producers_are_serialized() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let engine = SharedEngine::new(
            SessionEngine::new(EngineConfig::default())
                .with_launch(ProcessLaunch::user_launch(t0)),
        );
        engine.handle(Signal::SdkReady, t0);

        let producers: Vec<_> = (0..4)
            .map(|_| {
                let engine = engine.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        engine.handle(Signal::Action, t0);
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let session = engine.current_session().unwrap();
        // 400 actions plus the application-start marker
        assert_eq!(session.action_count(), 401);
        assert_eq!(
            engine.current_context().map(|c| c.session_id),
            Some(session.id)
        );
    }

    #[test]
    fn test_from_config_applies_sampling() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let config = Config {
            session_sample_rate: 0.0,
            ..Config::default()
        };
        let sink = MemorySink::new();
        let engine = SharedEngine::from_config(
            &config,
            Some(ProcessLaunch::user_launch(t0)),
            sink.clone(),
        );

        engine.handle(Signal::SdkReady, t0);
        let outcome = engine.handle(Signal::SessionStop, t0);

        assert_eq!(outcome.closed.len(), 1);
        assert!(!outcome.closed[0].is_sampled);
        assert!(sink.is_empty());
    }
}
