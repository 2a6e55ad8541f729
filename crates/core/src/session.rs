//! Session abstraction
//!
//! A [`Session`] is a live database session owned by whoever holds it.
//! [`SessionHandle`] is the shared, cheaply cloned reference passed around
//! the registry. Two handles refer to the same session iff they point at
//! the same allocation; value equality of the sessions plays no part.

use crate::error::SessionError;
use std::fmt;
use std::sync::Arc;

/// A live database session
///
/// Thread safety: a session may be committed or closed from any thread that
/// participates in its transaction, so implementations must be Send + Sync.
/// Both operations are synchronous and may block on I/O.
pub trait Session: fmt::Display + Send + Sync {
    /// Commit pending work on this session
    fn commit(&self) -> std::result::Result<(), SessionError>;

    /// Release the session and its underlying resources
    fn close(&self) -> std::result::Result<(), SessionError>;
}

/// Shared handle to a [`Session`]
#[derive(Clone)]
pub struct SessionHandle(Arc<dyn Session>);

impl SessionHandle {
    /// Wrap a session in a new handle
    pub fn new<S: Session + 'static>(session: S) -> Self {
        SessionHandle(Arc::new(session))
    }

    /// Wrap an already shared session
    pub fn from_arc(session: Arc<dyn Session>) -> Self {
        SessionHandle(session)
    }

    /// Whether both handles refer to the same underlying session
    pub fn same_session(&self, other: &SessionHandle) -> bool {
        // Compare data pointers only; vtable pointers for the same type
        // are not guaranteed to be unique.
        Arc::as_ptr(&self.0) as *const () == Arc::as_ptr(&other.0) as *const ()
    }

    /// Commit the underlying session
    pub fn commit(&self) -> std::result::Result<(), SessionError> {
        self.0.commit()
    }

    /// Close the underlying session
    pub fn close(&self) -> std::result::Result<(), SessionError> {
        self.0.close()
    }

    /// Borrow the shared session
    pub fn as_arc(&self) -> &Arc<dyn Session> {
        &self.0
    }
}

impl<S: Session + 'static> From<Arc<S>> for SessionHandle {
    fn from(session: Arc<S>) -> Self {
        SessionHandle(session)
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionHandle({})", self.0)
    }
}
