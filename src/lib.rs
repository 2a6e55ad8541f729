//! sessionhold - Transaction-scoped registry of database sessions
//!
//! A [`SessionRegistry`] is bound to one logical transaction. It holds the
//! session the transaction started with and any further sessions opened
//! under other [`ExecutionStrategy`]s, and commits or closes all of them
//! together when the transaction ends.
//!
//! # Quick Start
//!
//! ```ignore
//! use sessionhold::{ExecutionStrategy, SessionHandle, SessionRegistry};
//!
//! let registry = SessionRegistry::new(SessionHandle::new(session), ExecutionStrategy::Simple, None);
//!
//! // Later in the same transaction
//! if !registry.add_session(ExecutionStrategy::Batch, SessionHandle::new(batch_session)) {
//!     // Another caller registered a BATCH session first; use that one
//! }
//! let batch = registry.session_for(ExecutionStrategy::Batch);
//!
//! registry.commit()?;
//! registry.close()?;
//! ```
//!
//! # Architecture
//!
//! - `sessionhold-core`: strategies, the session abstraction, errors
//! - `sessionhold-registry`: the registry, holder state and configuration

pub use sessionhold_core::*;
pub use sessionhold_registry::*;
