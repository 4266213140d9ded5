//! The `correlation` module binds outbound requests to their replies.
//!
//! Every in-flight request is tracked by a correlation identifier; the
//! tracker resolves exactly one matching reply per request, or times the
//! request out. Unmatched replies are counted and logged, never raised —
//! they are expected under retransmission and timeout races.

pub mod tracker;

pub use tracker::{CorrelationTracker, Expiration, PendingReply, Resolution, ResolutionState};

use uuid::Uuid;

pub type CorrelationId = String;

/// An inbound reply, matched against pending requests by identifier equality.
#[derive(Debug, Clone)]
pub struct Reply {
    pub correlation_id: CorrelationId,
    pub payload: String,
    pub timestamp: i64,
}

/// Fresh correlation token, unique with negligible collision probability.
pub fn next_correlation_id() -> CorrelationId {
    format!("req-{}", Uuid::new_v4())
}
