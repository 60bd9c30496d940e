//! Rendezvous - single-slot handoff between the delivery task and one waiter
//!
//! The transport's delivery task publishes a value; the caller that issued the
//! request waits for it with a deadline. The slot holds at most one value and
//! is emptied by the consumer that takes it. It is not a queue: a second publish
//! before a consume replaces the first.
//!
//! The slot lives behind a mutex and waiters park on a [`Notify`]. The presence
//! check and the take happen under one lock acquisition, and every wake-up
//! re-checks the slot, so stored permits and unrelated notifications cannot
//! produce a value that was not there.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Default time a status check waits for its reply
pub const DEFAULT_WAIT: Duration = Duration::from_secs(30);

/// Errors from waiting on the rendezvous
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RendezvousError {
    #[error("No value published within {0:?}")]
    TimedOut(Duration),
}

/// Single-slot rendezvous shared between one producer and one consumer
#[derive(Debug, Default)]
pub struct Rendezvous {
    slot: Mutex<Option<String>>,
    ready: Notify,
}

impl Rendezvous {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        // Nothing panics while holding the lock; a poisoned slot is still consistent
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `value` and wake the waiter, if any
    ///
    /// Never waits. Safe to call with nobody waiting: the value stays in the
    /// slot for the next consumer.
    pub fn publish(&self, value: impl Into<String>) {
        let value = value.into();
        debug!(%value, "Rendezvous::publish: called");
        let replaced = self.lock().replace(value);
        if let Some(old) = replaced {
            warn!(%old, "Rendezvous::publish: overwriting unconsumed value");
        }
        self.ready.notify_one();
    }

    /// Wait until a value is present, then take it
    ///
    /// The deadline is fixed on entry. On timeout the slot is left untouched: a
    /// value published after the deadline stays for the next consumer.
    pub async fn await_and_consume(&self, timeout: Duration) -> Result<String, RendezvousError> {
        debug!(?timeout, "Rendezvous::await_and_consume: called");
        let deadline = Instant::now() + timeout;
        loop {
            // Created before the check so a publish in between is not missed
            let notified = self.ready.notified();
            if let Some(value) = self.lock().take() {
                debug!(%value, "Rendezvous::await_and_consume: consumed");
                return Ok(value);
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                debug!(?timeout, "Rendezvous::await_and_consume: timed out");
                return Err(RendezvousError::TimedOut(timeout));
            }
        }
    }

    /// Drop any unconsumed value, returning it
    pub fn discard(&self) -> Option<String> {
        let stale = self.lock().take();
        if let Some(value) = &stale {
            debug!(%value, "Rendezvous::discard: dropped stale value");
        }
        stale
    }

    /// Whether a value is waiting to be consumed
    pub fn is_ready(&self) -> bool {
        self.lock().is_some()
    }
}
