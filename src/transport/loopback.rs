use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tracing::debug;
use uuid::Uuid;

use crate::persistence::QueueStore;
use crate::transport::message::{DeliveryMode, InboundMessage, OutboundMessage};
use crate::transport::{SessionEvent, Subscription, Transport, TEMPORARY_PREFIX};
use crate::utils::error::TransportError;

/// Destination-to-subscriber routing table.
#[derive(Debug, Default)]
struct Router {
    subscribers: HashMap<String, mpsc::UnboundedSender<InboundMessage>>,
}

/// In-process broker implementing `Transport`.
///
/// Routes messages to the live subscriber of each destination. Persistent
/// messages addressed to a durable queue with no subscriber are parked in the
/// `QueueStore` (when one is attached) and drained to the next subscriber;
/// everything else without a subscriber is dropped with a trace.
pub struct LoopbackTransport {
    router: Arc<Mutex<Router>>,
    store: Option<QueueStore>,
    events_tx: watch::Sender<SessionEvent>,
    events_rx: watch::Receiver<SessionEvent>,
    send_log: Mutex<Vec<OutboundMessage>>,
}

impl LoopbackTransport {
    /// Connects a loopback broker with no durable backing.
    pub fn connect() -> Self {
        Self::with_store(None)
    }

    /// Connects a loopback broker parking guaranteed messages in `store`.
    pub fn connect_with_store(store: QueueStore) -> Self {
        Self::with_store(Some(store))
    }

    fn with_store(store: Option<QueueStore>) -> Self {
        let (events_tx, events_rx) = watch::channel(SessionEvent::Connecting);
        let transport = Self {
            router: Arc::new(Mutex::new(Router::default())),
            store,
            events_tx,
            events_rx,
            send_log: Mutex::new(Vec::new()),
        };
        let _ = transport.events_tx.send(SessionEvent::Up);
        transport
    }

    /// Every message accepted for transmission, in order. Test observability.
    pub fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.send_log.lock().unwrap().clone()
    }

    fn is_up(&self) -> bool {
        *self.events_rx.borrow() == SessionEvent::Up
    }

    fn is_durable(destination: &str) -> bool {
        !destination.starts_with(TEMPORARY_PREFIX)
    }
}

impl Transport for LoopbackTransport {
    fn create_temporary_destination(&self) -> Result<String, TransportError> {
        if !self.is_up() {
            return Err(TransportError::NotConnected);
        }
        Ok(format!("{TEMPORARY_PREFIX}{}", Uuid::new_v4()))
    }

    fn subscribe(&self, destination: &str) -> Result<Subscription, TransportError> {
        if !self.is_up() {
            return Err(TransportError::NotConnected);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let mut router = self.router.lock().unwrap();
        if router.subscribers.contains_key(destination) {
            return Err(TransportError::AlreadySubscribed(destination.to_string()));
        }

        // Durable queues replay their parked backlog to the new subscriber.
        if Self::is_durable(destination) {
            if let Some(store) = &self.store {
                for stored in store.drain(destination) {
                    let _ = tx.send(InboundMessage {
                        destination: stored.destination,
                        payload: stored.payload,
                        correlation_id: stored.correlation_id,
                        reply_to: stored.reply_to,
                        timestamp: stored.timestamp,
                    });
                }
            }
        }

        router.subscribers.insert(destination.to_string(), tx);
        Ok(Subscription {
            destination: destination.to_string(),
            receiver: rx,
        })
    }

    fn unsubscribe(&self, destination: &str) -> Result<(), TransportError> {
        self.router.lock().unwrap().subscribers.remove(destination);
        Ok(())
    }

    fn send(&self, message: OutboundMessage) -> Result<(), TransportError> {
        if !self.is_up() {
            return Err(TransportError::NotConnected);
        }

        self.send_log.lock().unwrap().push(message.clone());

        let inbound = InboundMessage {
            destination: message.destination.clone(),
            payload: message.payload,
            correlation_id: message.correlation_id,
            reply_to: message.reply_to,
            timestamp: Utc::now().timestamp_millis(),
        };

        let router = self.router.lock().unwrap();
        if let Some(subscriber) = router.subscribers.get(&message.destination) {
            if subscriber.send(inbound).is_ok() {
                return Ok(());
            }
            debug!(destination = %message.destination, "subscriber channel closed");
            return Ok(());
        }
        drop(router);

        // No live subscriber: park guaranteed traffic for durable queues,
        // drop the rest with a trace.
        if message.delivery_mode == DeliveryMode::Persistent
            && Self::is_durable(&message.destination)
        {
            if let Some(store) = &self.store {
                store.park(&inbound);
                return Ok(());
            }
        }

        debug!(destination = %message.destination, "no subscriber, message dropped");
        Ok(())
    }

    fn disconnect(&self) {
        let _ = self.events_tx.send(SessionEvent::Disconnected);
        self.router.lock().unwrap().subscribers.clear();
    }

    fn events(&self) -> watch::Receiver<SessionEvent> {
        self.events_rx.clone()
    }
}
