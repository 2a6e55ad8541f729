//! Error translation hook
//!
//! The registry stores a translator but never calls it; callers fetch it to
//! turn low-level [`SessionError`]s into [`DataAccessError`]s.

use crate::error::{DataAccessError, SessionError};
use std::fmt;

/// Converts session errors into the data access error hierarchy
pub trait ErrorTranslator: fmt::Debug + Send + Sync {
    /// Translate `error`, or return `None` if it is not recognized
    fn translate(&self, error: &SessionError) -> Option<DataAccessError>;
}
