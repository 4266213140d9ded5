use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::correlation::{CorrelationId, Reply};
use crate::utils::error::CorrelationError;

/// Resolution state of one pending correlation.
///
/// Transitions are monotonic: `Pending -> Resolved` or `Pending -> TimedOut`,
/// never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Pending,
    Resolved,
    TimedOut,
}

/// Outcome of `resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The reply fulfilled a pending request.
    Matched,
    /// The identifier was already resolved or timed out; no-op.
    AlreadyFinalized,
    /// No registration for the identifier; counted, not an error.
    Unmatched,
}

/// Outcome of `expire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    TimedOut,
    /// A reply won the race; no-op.
    AlreadyResolved,
    /// No registration for the identifier.
    Unknown,
}

#[derive(Debug)]
struct PendingEntry {
    created_at: i64,
    state: ResolutionState,
    waiter: Option<oneshot::Sender<Reply>>,
}

/// The future side of one registration.
#[derive(Debug)]
pub struct PendingReply {
    receiver: oneshot::Receiver<Reply>,
}

impl PendingReply {
    /// Waits for the reply. Returns `None` when the registration was
    /// finalized without one (expired or discarded).
    pub async fn wait(self) -> Option<Reply> {
        self.receiver.await.ok()
    }
}

/// Maps outstanding correlation identifiers to pending waiters.
///
/// The map is the only shared structure on the reply path; one mutex guards
/// it, which is what makes `resolve` and `expire` mutually exclusive per
/// identifier — exactly one of them finalizes an entry, the loser observes
/// the already-finalized state and performs no caller-visible effect.
#[derive(Debug, Default)]
pub struct CorrelationTracker {
    pending: Mutex<HashMap<CorrelationId, PendingEntry>>,
    unmatched_replies: AtomicU64,
}

impl CorrelationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `correlation_id` and returns the waiter future.
    /// At most one pending registration may exist per identifier.
    pub fn register(&self, correlation_id: &str) -> Result<PendingReply, CorrelationError> {
        let mut pending = self.pending.lock().unwrap();
        if pending.contains_key(correlation_id) {
            return Err(CorrelationError::DuplicateCorrelationId(
                correlation_id.to_string(),
            ));
        }

        let (tx, rx) = oneshot::channel();
        pending.insert(
            correlation_id.to_string(),
            PendingEntry {
                created_at: Utc::now().timestamp_millis(),
                state: ResolutionState::Pending,
                waiter: Some(tx),
            },
        );
        Ok(PendingReply { receiver: rx })
    }

    /// Matches `reply` against the pending registrations.
    ///
    /// Safe to call from the transport callback path concurrently with
    /// `expire` firing on a timer.
    pub fn resolve(&self, reply: Reply) -> Resolution {
        let mut pending = self.pending.lock().unwrap();
        match pending.get_mut(&reply.correlation_id) {
            Some(entry) if entry.state == ResolutionState::Pending => {
                entry.state = ResolutionState::Resolved;
                if let Some(waiter) = entry.waiter.take() {
                    // The caller may have bailed out already; a dropped
                    // receiver is not an error here.
                    let _ = waiter.send(reply);
                }
                Resolution::Matched
            }
            Some(entry) => {
                debug!(
                    correlation_id = %reply.correlation_id,
                    state = ?entry.state,
                    age_ms = Utc::now().timestamp_millis() - entry.created_at,
                    "reply for already finalized correlation id"
                );
                Resolution::AlreadyFinalized
            }
            None => {
                self.unmatched_replies.fetch_add(1, Ordering::Relaxed);
                warn!(correlation_id = %reply.correlation_id, "discarding unmatched reply");
                Resolution::Unmatched
            }
        }
    }

    /// Times a pending registration out, failing its waiter.
    pub fn expire(&self, correlation_id: &str) -> Expiration {
        let mut pending = self.pending.lock().unwrap();
        match pending.get_mut(correlation_id) {
            Some(entry) if entry.state == ResolutionState::Pending => {
                entry.state = ResolutionState::TimedOut;
                // Dropping the sender fails the waiter.
                entry.waiter = None;
                Expiration::TimedOut
            }
            Some(_) => {
                debug!(%correlation_id, "expire raced a reply and lost, already resolved");
                Expiration::AlreadyResolved
            }
            None => Expiration::Unknown,
        }
    }

    /// Discards a registration entirely: rollback after a failed send, or
    /// cleanup once an exchange has completed.
    pub fn remove(&self, correlation_id: &str) {
        self.pending.lock().unwrap().remove(correlation_id);
    }

    pub fn state_of(&self, correlation_id: &str) -> Option<ResolutionState> {
        self.pending
            .lock()
            .unwrap()
            .get(correlation_id)
            .map(|entry| entry.state)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Replies that arrived for identifiers never registered here.
    pub fn unmatched_replies(&self) -> u64 {
        self.unmatched_replies.load(Ordering::Relaxed)
    }
}
