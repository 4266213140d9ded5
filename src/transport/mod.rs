//! The `transport` module is the seam between the request/reply core and the
//! underlying guaranteed-messaging client.
//!
//! It defines the wire frames exchanged with a broker, the `Transport` trait
//! the rest of the crate programs against, and two implementations: an
//! in-process loopback broker and an outbound WebSocket client.

pub mod loopback;
pub mod message;
pub mod websocket;

use tokio::sync::{mpsc, watch};

use crate::transport::message::{InboundMessage, OutboundMessage};
use crate::utils::error::TransportError;

/// Reserved name prefix for transient reply destinations. Destinations under
/// this prefix have no persistent identity and are never parked durably.
pub const TEMPORARY_PREFIX: &str = "#reply/";

/// Lifecycle notifications emitted by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Connecting,
    Up,
    Disconnected,
}

/// An active subscription to one destination.
///
/// Dropping the subscription (or unsubscribing) closes the receiver; the
/// transport never redelivers messages to a closed subscription.
#[derive(Debug)]
pub struct Subscription {
    pub destination: String,
    pub receiver: mpsc::UnboundedReceiver<InboundMessage>,
}

/// Abstract guaranteed-messaging client.
///
/// Connection establishment is implementation-specific (each transport has
/// its own constructor); everything after that goes through this trait so
/// the coordinator stack can run against any broker binding.
pub trait Transport: Send + Sync + 'static {
    /// Allocates a transient destination name with no persistent identity.
    /// Names are unique per call and live under a reserved prefix.
    fn create_temporary_destination(&self) -> Result<String, TransportError>;

    /// Binds an inbound flow to `destination`. At most one live subscription
    /// per destination.
    fn subscribe(&self, destination: &str) -> Result<Subscription, TransportError>;

    /// Releases the subscription for `destination`. Unsubscribing a
    /// destination that is not subscribed is a no-op.
    fn unsubscribe(&self, destination: &str) -> Result<(), TransportError>;

    /// Transmits one message. No implicit retry; failure surfaces once.
    fn send(&self, message: OutboundMessage) -> Result<(), TransportError>;

    /// Tears the connection down and drops all subscriptions. Idempotent.
    fn disconnect(&self);

    /// Watch channel carrying `{Connecting, Up, Disconnected}` notifications.
    fn events(&self) -> watch::Receiver<SessionEvent>;
}

#[cfg(test)]
mod tests;

#[cfg(test)]
mod websocket_tests;
