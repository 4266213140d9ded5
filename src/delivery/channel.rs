use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::session::Session;
use crate::transport::message::{DeliveryMode, OutboundMessage};
use crate::utils::error::DeliveryError;

/// Send-side wrapper over an established session.
///
/// Enforces the two contracts of the guaranteed send path: every message
/// goes out with persistent delivery mode, and a `reply_to` must name a
/// reply destination that was registered beforehand — the channel never
/// creates one.
pub struct DeliveryChannel {
    session: Arc<Session>,
    reply_destinations: Mutex<HashSet<String>>,
}

impl DeliveryChannel {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            reply_destinations: Mutex::new(HashSet::new()),
        }
    }

    /// Marks `destination` as a valid reply-to target. Called by the reply
    /// listener when its transient destination goes active.
    pub fn register_reply_destination(&self, destination: &str) {
        self.reply_destinations
            .lock()
            .unwrap()
            .insert(destination.to_string());
    }

    /// Removes `destination` from the valid reply-to targets. Removing an
    /// unknown destination is a no-op.
    pub fn deregister_reply_destination(&self, destination: &str) {
        self.reply_destinations.lock().unwrap().remove(destination);
    }

    /// Transmits one persistent message. Exactly one transport send per
    /// call; transport failure surfaces once, retry is the caller's policy.
    pub fn send(
        &self,
        destination: &str,
        payload: &str,
        correlation_id: Option<&str>,
        reply_to: Option<&str>,
    ) -> Result<(), DeliveryError> {
        if !self.session.is_connected() {
            return Err(DeliveryError::NotConnected);
        }

        if let Some(reply_to) = reply_to {
            let registered = self.reply_destinations.lock().unwrap();
            if !registered.contains(reply_to) {
                return Err(DeliveryError::UnknownReplyDestination(reply_to.to_string()));
            }
        }

        self.session.transport().send(OutboundMessage {
            destination: destination.to_string(),
            payload: payload.to_string(),
            delivery_mode: DeliveryMode::Persistent,
            correlation_id: correlation_id.map(str::to_string),
            reply_to: reply_to.map(str::to_string),
        })?;

        debug!(%destination, correlation_id = ?correlation_id, "persistent message sent");
        Ok(())
    }
}
