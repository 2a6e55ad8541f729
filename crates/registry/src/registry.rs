//! Session registry bound to a single transaction
//!
//! The registry holds one default session, supplied at construction, and
//! lazily collects further sessions for other execution strategies as the
//! application asks for them during the same transaction.
//!
//! Invariants:
//! - The default session and strategy never change
//! - The secondary map never holds the default strategy
//! - Each secondary strategy maps to the first session registered for it
//!
//! The registry owns every session it stored and is the only place that
//! commits or closes them.

use crate::builder::SessionRegistryBuilder;
use crate::config::CommitPolicy;
use crate::holder::{HolderState, ResourceHolder};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use sessionhold_core::{
    DataAccessError, Error, ErrorTranslator, ExecutionStrategy, FailureReport, Result,
    SessionError, SessionHandle, SessionTarget,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Holder of every session participating in one transaction
///
/// Thread safety: all methods take `&self`; share the registry behind an
/// `Arc` between the threads of a transaction.
pub struct SessionRegistry {
    session: SessionHandle,
    strategy: ExecutionStrategy,
    error_translator: Option<Arc<dyn ErrorTranslator>>,
    /// Created on the first non-default registration
    sessions: OnceCell<DashMap<ExecutionStrategy, SessionHandle>>,
    commit_policy: CommitPolicy,
    state: HolderState,
}

impl SessionRegistry {
    /// Create a registry around a default session
    pub fn new(
        session: SessionHandle,
        strategy: ExecutionStrategy,
        error_translator: Option<Arc<dyn ErrorTranslator>>,
    ) -> Self {
        Self::from_parts(
            session,
            strategy,
            error_translator,
            CommitPolicy::default(),
            HolderState::new(),
        )
    }

    /// Create a registry from inputs that may be absent
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `session` or `strategy` is `None`.
    pub fn try_new(
        session: Option<SessionHandle>,
        strategy: Option<ExecutionStrategy>,
        error_translator: Option<Arc<dyn ErrorTranslator>>,
    ) -> Result<Self> {
        let mut builder = SessionRegistryBuilder::new();
        if let Some(session) = session {
            builder = builder.session(session);
        }
        if let Some(strategy) = strategy {
            builder = builder.strategy(strategy);
        }
        if let Some(translator) = error_translator {
            builder = builder.error_translator(translator);
        }
        builder.build()
    }

    /// Start building a registry
    pub fn builder() -> SessionRegistryBuilder {
        SessionRegistryBuilder::new()
    }

    pub(crate) fn from_parts(
        session: SessionHandle,
        strategy: ExecutionStrategy,
        error_translator: Option<Arc<dyn ErrorTranslator>>,
        commit_policy: CommitPolicy,
        state: HolderState,
    ) -> Self {
        SessionRegistry {
            session,
            strategy,
            error_translator,
            sessions: OnceCell::new(),
            commit_policy,
            state,
        }
    }

    /// The default session
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Session registered for `strategy`
    ///
    /// Returns the default session for the default strategy, and `None` for
    /// a strategy nobody registered.
    pub fn session_for(&self, strategy: ExecutionStrategy) -> Option<SessionHandle> {
        if strategy == self.strategy {
            return Some(self.session.clone());
        }
        self.sessions
            .get()?
            .get(&strategy)
            .map(|entry| entry.value().clone())
    }

    /// Register `session` under `strategy`
    ///
    /// Does nothing for the default strategy or for a strategy that already
    /// has a session; the first registration wins. Concurrent calls for the
    /// same strategy store exactly one handle.
    ///
    /// Returns `true` if the registry stored the handle and now owns it.
    /// On `false` the caller still owns `session` and should use
    /// [`session_for`](Self::session_for) to get the registered one.
    pub fn add_session(&self, strategy: ExecutionStrategy, session: SessionHandle) -> bool {
        if strategy == self.strategy {
            debug!(strategy = %strategy, "Ignoring registration under the default strategy");
            return false;
        }

        let sessions = self.sessions.get_or_init(DashMap::new);
        let stored = match sessions.entry(strategy) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(session);
                true
            }
        };

        if stored {
            debug!(strategy = %strategy, "Registered secondary session");
        } else {
            debug!(strategy = %strategy, "Strategy already has a session, keeping the first");
        }
        stored
    }

    /// Strategy of the default session
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Error translator supplied at construction
    pub fn error_translator(&self) -> Option<&Arc<dyn ErrorTranslator>> {
        self.error_translator.as_ref()
    }

    /// Translate `error` with the stored translator, if there is one
    pub fn translate_error(&self, error: &SessionError) -> Option<DataAccessError> {
        self.error_translator.as_ref()?.translate(error)
    }

    /// Commit policy in effect
    pub fn commit_policy(&self) -> CommitPolicy {
        self.commit_policy
    }

    /// Transaction bookkeeping owned by the synchronization layer
    pub fn state(&self) -> &HolderState {
        &self.state
    }

    /// Strategies with a secondary session, in order
    pub fn secondary_strategies(&self) -> Vec<ExecutionStrategy> {
        self.secondary_sessions()
            .into_iter()
            .map(|(strategy, _)| strategy)
            .collect()
    }

    /// Number of sessions held, default included
    pub fn session_count(&self) -> usize {
        1 + self.sessions.get().map_or(0, |sessions| sessions.len())
    }

    /// Commit the default session, then every secondary session
    ///
    /// With [`CommitPolicy::AttemptAll`] every session is committed even if
    /// an earlier one failed. With [`CommitPolicy::StopOnFirstFailure`] the
    /// first failure ends the fan-out.
    ///
    /// # Errors
    ///
    /// `CommitFailure` listing every failed session in attempt order.
    pub fn commit(&self) -> Result<()> {
        let stop_on_failure = self.commit_policy == CommitPolicy::StopOnFirstFailure;
        let report = self.fan_out("commit", stop_on_failure, SessionHandle::commit);
        if report.is_empty() {
            Ok(())
        } else {
            Err(Error::CommitFailure(report))
        }
    }

    /// Close the default session, then every secondary session
    ///
    /// Every session is closed even if an earlier close failed.
    ///
    /// # Errors
    ///
    /// `CloseFailure` listing every failed session in attempt order.
    pub fn close(&self) -> Result<()> {
        let report = self.fan_out("close", false, SessionHandle::close);
        if report.is_empty() {
            Ok(())
        } else {
            Err(Error::CloseFailure(report))
        }
    }

    /// Whether `session` is one of the sessions held here
    ///
    /// Compares identity, not value: a distinct session that merely looks
    /// the same is not held.
    pub fn is_holding(&self, session: &SessionHandle) -> bool {
        if self.session.same_session(session) {
            return true;
        }
        self.sessions.get().map_or(false, |sessions| {
            sessions
                .iter()
                .any(|entry| entry.value().same_session(session))
        })
    }

    /// Human-readable snapshot of the held sessions
    ///
    /// `default:<STRATEGY>:<session>` followed by `;<STRATEGY>:<session>;`
    /// entries for secondary sessions in strategy order.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Cloned secondary entries sorted by strategy
    ///
    /// Fan-out works on this snapshot so no map lock is held while a
    /// session commits or closes.
    fn secondary_sessions(&self) -> Vec<(ExecutionStrategy, SessionHandle)> {
        let mut entries: Vec<_> = match self.sessions.get() {
            Some(sessions) => sessions
                .iter()
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect(),
            None => Vec::new(),
        };
        entries.sort_by_key(|(strategy, _)| *strategy);
        entries
    }

    fn fan_out<F>(&self, operation: &str, stop_on_failure: bool, op: F) -> FailureReport
    where
        F: Fn(&SessionHandle) -> std::result::Result<(), SessionError>,
    {
        let mut report = FailureReport::new();

        if let Err(e) = op(&self.session) {
            warn!(
                operation,
                strategy = %self.strategy,
                error = %e,
                "Default session failed"
            );
            report.push(SessionTarget::Default, e);
            if stop_on_failure {
                return report;
            }
        }

        for (strategy, session) in self.secondary_sessions() {
            if let Err(e) = op(&session) {
                warn!(
                    operation,
                    strategy = %strategy,
                    error = %e,
                    "Secondary session failed"
                );
                report.push(SessionTarget::Secondary(strategy), e);
                if stop_on_failure {
                    break;
                }
            }
        }

        report
    }
}

impl ResourceHolder for SessionRegistry {
    fn reset(&self) {
        self.state.reset();
    }

    fn unbound(&self) {
        self.state.unbound();
    }

    fn is_void(&self) -> bool {
        self.state.is_void()
    }
}

impl fmt::Display for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "default:{}:{}", self.strategy.name(), self.session)?;
        let secondaries = self.secondary_sessions();
        if !secondaries.is_empty() {
            f.write_str(";")?;
            for (strategy, session) in secondaries {
                write!(f, "{}:{};", strategy.name(), session)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("strategy", &self.strategy)
            .field("session", &self.session)
            .field("secondary", &self.secondary_sessions())
            .field("has_error_translator", &self.error_translator.is_some())
            .field("commit_policy", &self.commit_policy)
            .field("state", &self.state)
            .finish()
    }
}
