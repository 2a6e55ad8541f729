//! Core types and traits for sessionhold
//!
//! This crate defines the foundational types shared by the registry layer:
//! - ExecutionStrategy: Closed set of statement execution strategies
//! - Session / SessionHandle: Opaque database session and its shared handle
//! - ErrorTranslator: Optional hook converting session errors into data access errors
//! - Error: Error type hierarchy, including per-session failure reports

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod session;
pub mod strategy;
pub mod translator;

pub use error::{
    DataAccessError, Error, FailureReport, Result, SessionError, SessionFailure, SessionTarget,
};
pub use session::{Session, SessionHandle};
pub use strategy::{display_name, ExecutionStrategy, UNKNOWN_STRATEGY_NAME};
pub use translator::ErrorTranslator;
