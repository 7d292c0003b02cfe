use rumtrace_engine::{HandleOutcome, SessionSink};
use rumtrace_types::{ProcessLaunch, Signal};
use std::sync::Arc;
use tracing::debug;

use crate::Result;
use crate::clock::Clock;
use crate::config::Config;
use crate::shared::SharedEngine;
use crate::ticker::TimeoutTicker;

/// A configured engine plus the timeout ticker its configuration asks for.
///
/// The ticker runs only when `timeout_tick_interval_ms` is non-zero and is
/// stopped when the runtime is dropped.
pub struct Runtime {
    engine: SharedEngine,
    clock: Arc<dyn Clock>,
    ticker: Option<TimeoutTicker>,
}

impl Runtime {
    pub fn start(
        config: &Config,
        launch: Option<ProcessLaunch>,
        sink: impl SessionSink + 'static,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let engine = SharedEngine::from_config(config, launch, sink);

        let ticker = match config.tick_interval() {
            Some(interval) => Some(TimeoutTicker::start(
                engine.clone(),
                clock.clone(),
                interval,
            )?),
            None => {
                debug!("timeout ticker disabled");
                None
            }
        };

        Ok(Self {
            engine,
            clock,
            ticker,
        })
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Apply `signal` at the runtime clock's current time.
    pub fn record(&self, signal: Signal) -> HandleOutcome {
        self.engine.handle(signal, self.clock.now())
    }

    /// Stop the ticker, if any, and wait for it to exit.
    pub fn shutdown(mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
    }
}
