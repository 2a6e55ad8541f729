//! Shared helpers for registry integration tests

#![allow(dead_code)]

use sessionhold_core::{Session, SessionError, SessionHandle};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Session that counts commits and closes
pub struct CountingSession {
    name: String,
    commits: AtomicUsize,
    closes: AtomicUsize,
}

impl CountingSession {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(CountingSession {
            name: name.into(),
            commits: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        })
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl fmt::Display for CountingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CountingSession[{}]", self.name)
    }
}

impl Session for CountingSession {
    fn commit(&self) -> Result<(), SessionError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> Result<(), SessionError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Create a counting session and a handle to it
pub fn counting(name: impl Into<String>) -> (Arc<CountingSession>, SessionHandle) {
    let session = CountingSession::new(name);
    let handle = SessionHandle::from(Arc::clone(&session));
    (session, handle)
}

/// Install a test subscriber once so registry logs show with --nocapture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
