//! Resource-holder bookkeeping
//!
//! Every holder bound to a transaction carries state that belongs to the
//! transaction-synchronization layer rather than to the holder itself:
//! whether it is synchronized with the transaction, whether the transaction
//! is rollback-only, an optional deadline, and a reference count of callers
//! currently using the resource.
//!
//! All fields are individually thread-safe. The holder never drives these
//! transitions on its own.
//!
//! ## Lifecycle
//!
//! ```text
//! Unbound --mark_bound()--> Bound --unbound()--> Released
//! ```

use parking_lot::Mutex;
use sessionhold_core::{Error, Result};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Lifecycle phase of a holder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HolderPhase {
    /// Constructed, not yet bound to a transaction
    Unbound = 0,
    /// Bound and accepting registrations
    Bound = 1,
    /// Unbound at transaction end
    Released = 2,
}

impl HolderPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => HolderPhase::Unbound,
            1 => HolderPhase::Bound,
            _ => HolderPhase::Released,
        }
    }
}

/// Callbacks the transaction-synchronization layer invokes on a holder
pub trait ResourceHolder {
    /// Reset transactional state so the holder can be reused
    fn reset(&self);

    /// Notify the holder that it has been unbound from the transaction
    fn unbound(&self);

    /// Whether the holder was unbound and must not be reused
    fn is_void(&self) -> bool;
}

/// Transaction bookkeeping shared by every resource holder
#[derive(Debug)]
pub struct HolderState {
    synchronized_with_transaction: AtomicBool,
    rollback_only: AtomicBool,
    deadline: Mutex<Option<Instant>>,
    reference_count: AtomicUsize,
    is_void: AtomicBool,
    phase: AtomicU8,
}

impl Default for HolderState {
    fn default() -> Self {
        Self::new()
    }
}

impl HolderState {
    /// Create state for a fresh, unbound holder
    pub fn new() -> Self {
        HolderState {
            synchronized_with_transaction: AtomicBool::new(false),
            rollback_only: AtomicBool::new(false),
            deadline: Mutex::new(None),
            reference_count: AtomicUsize::new(0),
            is_void: AtomicBool::new(false),
            phase: AtomicU8::new(HolderPhase::Unbound as u8),
        }
    }

    /// Mark the resource as synchronized with a transaction
    pub fn set_synchronized_with_transaction(&self, synchronized: bool) {
        self.synchronized_with_transaction
            .store(synchronized, Ordering::SeqCst);
    }

    /// Whether the resource is synchronized with a transaction
    pub fn is_synchronized_with_transaction(&self) -> bool {
        self.synchronized_with_transaction.load(Ordering::SeqCst)
    }

    /// Mark the transaction as rollback-only
    pub fn set_rollback_only(&self) {
        self.rollback_only.store(true, Ordering::SeqCst);
    }

    /// Clear the rollback-only flag
    pub fn reset_rollback_only(&self) {
        self.rollback_only.store(false, Ordering::SeqCst);
    }

    /// Whether the transaction is rollback-only
    pub fn is_rollback_only(&self) -> bool {
        self.rollback_only.load(Ordering::SeqCst)
    }

    /// Set a deadline `seconds` from now
    pub fn set_timeout_in_seconds(&self, seconds: u64) {
        self.set_timeout_in_millis(seconds.saturating_mul(1000));
    }

    /// Set a deadline `millis` from now
    pub fn set_timeout_in_millis(&self, millis: u64) {
        let deadline = Instant::now() + Duration::from_millis(millis);
        *self.deadline.lock() = Some(deadline);
    }

    /// Whether a deadline is set
    pub fn has_timeout(&self) -> bool {
        self.deadline.lock().is_some()
    }

    /// Current deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        *self.deadline.lock()
    }

    /// Milliseconds left until the deadline
    ///
    /// # Errors
    ///
    /// - `InvalidState` if no deadline is set
    /// - `TransactionTimedOut` if the deadline has passed; the holder is
    ///   marked rollback-only first
    pub fn time_to_live_in_millis(&self) -> Result<u64> {
        let deadline = self.deadline().ok_or_else(|| {
            Error::InvalidState("no timeout specified for this resource holder".to_string())
        })?;
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        if remaining == 0 {
            return Err(self.timed_out(deadline));
        }
        Ok(remaining)
    }

    /// Seconds left until the deadline, rounded up
    ///
    /// # Errors
    ///
    /// Same as [`time_to_live_in_millis`](Self::time_to_live_in_millis).
    pub fn time_to_live_in_seconds(&self) -> Result<u64> {
        let millis = self.time_to_live_in_millis()?;
        Ok((millis + 999) / 1000)
    }

    fn timed_out(&self, deadline: Instant) -> Error {
        self.set_rollback_only();
        tracing::warn!(?deadline, "Resource holder deadline reached, marked rollback-only");
        Error::TransactionTimedOut { deadline }
    }

    /// Increase the reference count by one
    pub fn requested(&self) {
        self.reference_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrease the reference count by one, saturating at zero
    pub fn released(&self) {
        let _ = self
            .reference_count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                Some(count.saturating_sub(1))
            });
    }

    /// Whether any caller still holds a reference
    pub fn is_open(&self) -> bool {
        self.reference_count() > 0
    }

    /// Current reference count
    pub fn reference_count(&self) -> usize {
        self.reference_count.load(Ordering::SeqCst)
    }

    /// Clear synchronization flag, rollback-only flag and deadline
    pub fn clear(&self) {
        self.synchronized_with_transaction
            .store(false, Ordering::SeqCst);
        self.rollback_only.store(false, Ordering::SeqCst);
        *self.deadline.lock() = None;
    }

    /// Clear transactional state and drop all references
    pub fn reset(&self) {
        self.clear();
        self.reference_count.store(0, Ordering::SeqCst);
    }

    /// Mark the holder as unbound: void and released
    pub fn unbound(&self) {
        self.is_void.store(true, Ordering::SeqCst);
        self.phase
            .store(HolderPhase::Released as u8, Ordering::SeqCst);
    }

    /// Whether the holder has been unbound
    pub fn is_void(&self) -> bool {
        self.is_void.load(Ordering::SeqCst)
    }

    /// Move from Unbound to Bound
    ///
    /// # Errors
    ///
    /// `InvalidState` if the holder is already bound or released.
    pub fn mark_bound(&self) -> Result<()> {
        self.phase
            .compare_exchange(
                HolderPhase::Unbound as u8,
                HolderPhase::Bound as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map(|_| ())
            .map_err(|current| {
                Error::InvalidState(format!(
                    "cannot bind holder in phase {:?}",
                    HolderPhase::from_u8(current)
                ))
            })
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> HolderPhase {
        HolderPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }
}

impl ResourceHolder for HolderState {
    fn reset(&self) {
        HolderState::reset(self);
    }

    fn unbound(&self) {
        HolderState::unbound(self);
    }

    fn is_void(&self) -> bool {
        HolderState::is_void(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = HolderState::new();
        assert!(!state.is_synchronized_with_transaction());
        assert!(!state.is_rollback_only());
        assert!(!state.has_timeout());
        assert!(!state.is_open());
        assert!(!state.is_void());
        assert_eq!(state.phase(), HolderPhase::Unbound);
    }

    #[test]
    fn test_reference_counting() {
        let state = HolderState::new();
        state.requested();
        state.requested();
        assert_eq!(state.reference_count(), 2);
        assert!(state.is_open());

        state.released();
        state.released();
        assert!(!state.is_open());

        // Never underflows
        state.released();
        assert_eq!(state.reference_count(), 0);
    }

    #[test]
    fn test_rollback_only() {
        let state = HolderState::new();
        state.set_rollback_only();
        assert!(state.is_rollback_only());
        state.reset_rollback_only();
        assert!(!state.is_rollback_only());
    }

    #[test]
    fn test_time_to_live_without_deadline() {
        let state = HolderState::new();
        assert!(matches!(
            state.time_to_live_in_millis(),
            Err(Error::InvalidState(_))
        ));
        assert!(!state.is_rollback_only());
    }

    #[test]
    fn test_time_to_live_before_deadline() {
        let state = HolderState::new();
        state.set_timeout_in_seconds(60);
        assert!(state.has_timeout());

        let millis = state.time_to_live_in_millis().unwrap();
        assert!(millis > 59_000 && millis <= 60_000);
        assert_eq!(state.time_to_live_in_seconds().unwrap(), 60);
        assert!(!state.is_rollback_only());
    }

    #[test]
    fn test_expired_deadline_marks_rollback_only() {
        let state = HolderState::new();
        state.set_timeout_in_millis(0);

        let err = state.time_to_live_in_millis().unwrap_err();
        assert!(matches!(err, Error::TransactionTimedOut { .. }));
        assert!(state.is_rollback_only());
    }

    #[test]
    fn test_clear_and_reset() {
        let state = HolderState::new();
        state.set_synchronized_with_transaction(true);
        state.set_rollback_only();
        state.set_timeout_in_seconds(5);
        state.requested();

        state.clear();
        assert!(!state.is_synchronized_with_transaction());
        assert!(!state.is_rollback_only());
        assert!(!state.has_timeout());
        assert_eq!(state.reference_count(), 1);

        state.reset();
        assert_eq!(state.reference_count(), 0);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let state = HolderState::new();
        state.mark_bound().unwrap();
        assert_eq!(state.phase(), HolderPhase::Bound);
        assert!(matches!(state.mark_bound(), Err(Error::InvalidState(_))));

        ResourceHolder::unbound(&state);
        assert_eq!(state.phase(), HolderPhase::Released);
        assert!(ResourceHolder::is_void(&state));
        assert!(state.mark_bound().is_err());
    }
}
