//! Error types for sessionhold
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::strategy::ExecutionStrategy;
use std::fmt;
use std::io;
use std::time::Instant;
use thiserror::Error;

/// Result type alias for sessionhold operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the session registry
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was absent or malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// One or more sessions failed to commit
    #[error("Commit failed: {0}")]
    CommitFailure(FailureReport),

    /// One or more sessions failed to close
    #[error("Close failed: {0}")]
    CloseFailure(FailureReport),

    /// Operation not valid in the holder's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The transaction deadline has passed
    #[error("Transaction timed out: deadline was {deadline:?}")]
    TransactionTimedOut {
        /// Deadline that was exceeded
        deadline: Instant,
    },

    /// I/O error (configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failure reported by a [`Session`](crate::Session) commit or close
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SessionError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl SessionError {
    /// Create an error with a message only
    pub fn new(message: impl Into<String>) -> Self {
        SessionError {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping a lower-level cause
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SessionError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Data access errors produced by an [`ErrorTranslator`](crate::ErrorTranslator)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataAccessError {
    /// Constraint or integrity violation
    #[error("Data integrity violation: {0}")]
    DataIntegrityViolation(String),

    /// Failure that may succeed if retried by the caller
    #[error("Transient data access failure: {0}")]
    TransientDataAccess(String),

    /// Anything the translator could not classify further
    #[error("Uncategorized data access failure: {0}")]
    Uncategorized(String),
}

/// Which session of a registry an operation failed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionTarget {
    /// The session supplied at construction
    Default,
    /// A session registered under a non-default strategy
    Secondary(ExecutionStrategy),
}

impl fmt::Display for SessionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionTarget::Default => f.write_str("default session"),
            SessionTarget::Secondary(strategy) => write!(f, "{} session", strategy),
        }
    }
}

/// A single failed commit or close
#[derive(Debug)]
pub struct SessionFailure {
    /// Session the operation failed on
    pub target: SessionTarget,
    /// Error returned by the session
    pub error: SessionError,
}

/// Every failure collected during a commit or close fan-out, in attempt order
#[derive(Debug, Default)]
pub struct FailureReport {
    failures: Vec<SessionFailure>,
}

impl FailureReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure
    pub fn push(&mut self, target: SessionTarget, error: SessionError) {
        self.failures.push(SessionFailure { target, error });
    }

    /// Whether no failures were recorded
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failures recorded
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// First failure encountered
    pub fn first(&self) -> Option<&SessionFailure> {
        self.failures.first()
    }

    /// Iterate over failures in attempt order
    pub fn iter(&self) -> impl Iterator<Item = &SessionFailure> {
        self.failures.iter()
    }

    /// Targets that failed, in attempt order
    pub fn targets(&self) -> Vec<SessionTarget> {
        self.failures.iter().map(|f| f.target).collect()
    }

    /// Consume the report, returning the failures
    pub fn into_failures(self) -> Vec<SessionFailure> {
        self.failures
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.first() {
            None => f.write_str("no session failures"),
            Some(first) => {
                write!(f, "{}: {}", first.target, first.error)?;
                if self.failures.len() > 1 {
                    write!(f, " (and {} more)", self.failures.len() - 1)?;
                }
                Ok(())
            }
        }
    }
}
