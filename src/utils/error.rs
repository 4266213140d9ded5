//! Error types for each layer of the request/reply stack.
//!
//! Errors compose upward: transport failures convert into delivery failures,
//! and delivery/correlation/listener failures convert into coordinator
//! failures. Unmatched replies are deliberately absent here — they are
//! expected under timeout races and are counted and logged, never raised.

use thiserror::Error;

/// Failures reported by a transport implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,

    #[error("connect to '{url}' failed: {reason}")]
    ConnectFailed { url: String, reason: String },

    #[error("destination '{0}' already has an active subscription")]
    AlreadySubscribed(String),

    #[error("send to '{destination}' failed: {reason}")]
    SendFailed { destination: String, reason: String },
}

/// Failures on the guaranteed send path.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("session is not connected")]
    NotConnected,

    #[error("reply-to '{0}' is not a registered reply destination")]
    UnknownReplyDestination(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failures while opening or running a reply listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("session is not connected")]
    NotConnected,

    #[error("listener is already open")]
    AlreadyOpen,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failures registering a pending correlation.
#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error("correlation id '{0}' is already pending")]
    DuplicateCorrelationId(String),
}

/// Failures of a full request/reply exchange.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("session is not connected")]
    NotConnected,

    #[error("no reply arrived within the requested timeout")]
    Timeout,

    #[error("request cancelled: session went down while awaiting a reply")]
    Cancelled,

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Correlation(#[from] CorrelationError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}
