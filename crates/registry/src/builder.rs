//! Builder for registries whose inputs may be absent
//!
//! Collaborators that assemble a registry from optional pieces use the
//! builder; it refuses to produce a registry without a session and a
//! strategy.
//!
//! ```ignore
//! let registry = SessionRegistry::builder()
//!     .session(handle)
//!     .strategy(ExecutionStrategy::Batch)
//!     .config(&config)
//!     .build()?;
//! ```

use crate::config::{CommitPolicy, RegistryConfig};
use crate::holder::HolderState;
use crate::registry::SessionRegistry;
use sessionhold_core::{Error, ErrorTranslator, ExecutionStrategy, Result, SessionHandle};
use std::sync::Arc;

/// Builder for [`SessionRegistry`]
#[derive(Debug, Clone, Default)]
pub struct SessionRegistryBuilder {
    session: Option<SessionHandle>,
    strategy: Option<ExecutionStrategy>,
    error_translator: Option<Arc<dyn ErrorTranslator>>,
    commit_policy: CommitPolicy,
    fallback_strategy: Option<ExecutionStrategy>,
    timeout_secs: Option<u64>,
}

impl SessionRegistryBuilder {
    /// Create a builder with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default session
    pub fn session(mut self, session: SessionHandle) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the strategy of the default session
    pub fn strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Store an error translator for callers
    pub fn error_translator(mut self, translator: Arc<dyn ErrorTranslator>) -> Self {
        self.error_translator = Some(translator);
        self
    }

    /// Set the commit policy
    pub fn commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.commit_policy = policy;
        self
    }

    /// Apply a loaded configuration
    ///
    /// The configured default strategy is only used when no strategy is set
    /// explicitly.
    pub fn config(mut self, config: &RegistryConfig) -> Self {
        self.commit_policy = config.commit_policy;
        self.fallback_strategy = Some(config.default_strategy);
        self.timeout_secs = config.timeout_secs;
        self
    }

    /// Build the registry
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the session or the strategy is missing.
    pub fn build(self) -> Result<SessionRegistry> {
        let session = self
            .session
            .ok_or_else(|| Error::InvalidArgument("session must not be absent".to_string()))?;
        let strategy = self
            .strategy
            .or(self.fallback_strategy)
            .ok_or_else(|| {
                Error::InvalidArgument("execution strategy must not be absent".to_string())
            })?;

        let state = HolderState::new();
        if let Some(secs) = self.timeout_secs {
            state.set_timeout_in_seconds(secs);
        }

        Ok(SessionRegistry::from_parts(
            session,
            strategy,
            self.error_translator,
            self.commit_policy,
            state,
        ))
    }
}
