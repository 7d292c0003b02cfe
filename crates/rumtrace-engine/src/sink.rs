use rumtrace_types::Session;
use std::sync::{Arc, Mutex, MutexGuard};

/// Receives every sampled session once it is closed
pub trait SessionSink: Send {
    fn emit(&mut self, session: &Session);
}

/// Discards sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SessionSink for NullSink {
    fn emit(&mut self, _session: &Session) {}
}

impl<F> SessionSink for F
where
    F: FnMut(&Session) + Send,
{
    fn emit(&mut self, session: &Session) {
        self(session)
    }
}

/// Collects emitted sessions in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    sessions: Arc<Mutex<Vec<Session>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn take(&self) -> Vec<Session> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionSink for MemorySink {
    fn emit(&mut self, session: &Session) {
        self.lock().push(session.clone());
    }
}
