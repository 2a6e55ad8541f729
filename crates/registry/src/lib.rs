//! Transaction-scoped session registry
//!
//! This crate implements the holder a transaction-synchronization layer binds
//! to one logical transaction:
//! - SessionRegistry: Default session plus lazily created per-strategy sessions
//! - SessionRegistryBuilder: Construction from possibly absent inputs
//! - HolderState: Reference counting, rollback-only and deadline bookkeeping
//! - RegistryConfig: Commit policy and defaults loaded from `sessionhold.toml`
//!
//! Commit and close fan out over every held session. Close always attempts
//! every session; commit does too unless configured to stop on the first
//! failure. Failures are collected into a [`FailureReport`].
//!
//! [`FailureReport`]: sessionhold_core::FailureReport

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod config;
pub mod holder;
pub mod registry;

pub use builder::SessionRegistryBuilder;
pub use config::{CommitPolicy, RegistryConfig, CONFIG_FILE_NAME};
pub use holder::{HolderPhase, HolderState, ResourceHolder};
pub use registry::SessionRegistry;
