use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::correlation::{next_correlation_id, CorrelationTracker};
use crate::delivery::DeliveryChannel;
use crate::listener::ReplyListener;
use crate::session::Session;
use crate::transport::SessionEvent;
use crate::utils::error::CoordinatorError;

/// Orchestrates request/reply exchanges over one exclusively owned session.
///
/// Each `request_reply` call opens its own reply listener, binds a fresh
/// correlation identifier, sends the request with the listener's destination
/// as `reply_to`, and awaits exactly one outcome: the matching reply, a
/// timeout, or cancellation when the session goes down.
pub struct Coordinator {
    session: Arc<Session>,
    channel: Arc<DeliveryChannel>,
    tracker: Arc<CorrelationTracker>,
}

impl Coordinator {
    pub fn new(session: Arc<Session>) -> Self {
        let channel = Arc::new(DeliveryChannel::new(Arc::clone(&session)));
        Self {
            session,
            channel,
            tracker: Arc::new(CorrelationTracker::new()),
        }
    }

    /// The shared delivery channel, also used by the queue producer.
    pub fn channel(&self) -> &Arc<DeliveryChannel> {
        &self.channel
    }

    pub fn tracker(&self) -> &Arc<CorrelationTracker> {
        &self.tracker
    }

    /// Performs one full request/reply exchange.
    ///
    /// The timeout is caller-supplied per request; guaranteed-delivery round
    /// trips can legitimately take longer than best-effort messaging, so no
    /// default is baked in.
    pub async fn request_reply(
        &self,
        destination: &str,
        payload: &str,
        timeout: Duration,
    ) -> Result<String, CoordinatorError> {
        if !self.session.is_connected() {
            return Err(CoordinatorError::NotConnected);
        }

        let mut listener = ReplyListener::new(Arc::clone(&self.session));
        let resolver = Arc::clone(&self.tracker);
        let reply_to = listener.open(move |reply| {
            resolver.resolve(reply);
        })?;
        self.channel.register_reply_destination(&reply_to);

        let correlation_id = next_correlation_id();
        let pending = match self.tracker.register(&correlation_id) {
            Ok(pending) => pending,
            Err(e) => {
                self.teardown(&mut listener, &reply_to);
                return Err(e.into());
            }
        };

        // Registration and send are one logical unit: a failed send must not
        // leave a dangling pending entry behind.
        if let Err(e) = self
            .channel
            .send(destination, payload, Some(&correlation_id), Some(&reply_to))
        {
            self.tracker.remove(&correlation_id);
            self.teardown(&mut listener, &reply_to);
            return Err(e.into());
        }
        debug!(%destination, %correlation_id, "request sent, awaiting reply");

        let mut events = self.session.events();
        let outcome = tokio::select! {
            reply = pending.wait() => match reply {
                Some(reply) => {
                    info!(%correlation_id, "reply resolved");
                    Ok(reply.payload)
                }
                // The waiter failing without a reply means the registration
                // was finalized out from under us.
                None => Err(CoordinatorError::Cancelled),
            },
            _ = tokio::time::sleep(timeout) => {
                self.tracker.expire(&correlation_id);
                Err(CoordinatorError::Timeout)
            }
            _ = session_lost(&mut events) => {
                self.tracker.expire(&correlation_id);
                Err(CoordinatorError::Cancelled)
            }
        };

        self.tracker.remove(&correlation_id);
        self.teardown(&mut listener, &reply_to);
        outcome
    }

    fn teardown(&self, listener: &mut ReplyListener, reply_to: &str) {
        self.channel.deregister_reply_destination(reply_to);
        listener.close();
    }
}

/// Completes once the session transitions to `Disconnected`.
async fn session_lost(events: &mut watch::Receiver<SessionEvent>) {
    loop {
        if *events.borrow() == SessionEvent::Disconnected {
            return;
        }
        if events.changed().await.is_err() {
            return;
        }
    }
}
