use std::collections::HashSet;

use tempfile::tempdir;

use crate::persistence::QueueStore;
use crate::transport::loopback::LoopbackTransport;
use crate::transport::message::{DeliveryMode, OutboundMessage};
use crate::transport::{SessionEvent, Transport, TEMPORARY_PREFIX};
use crate::utils::error::TransportError;

fn outbound(destination: &str, payload: &str, mode: DeliveryMode) -> OutboundMessage {
    OutboundMessage {
        destination: destination.to_string(),
        payload: payload.to_string(),
        delivery_mode: mode,
        correlation_id: None,
        reply_to: None,
    }
}

#[tokio::test]
async fn test_subscribe_and_route_message() {
    let transport = LoopbackTransport::connect();
    let mut subscription = transport.subscribe("tutorial/requests").unwrap();

    transport
        .send(outbound(
            "tutorial/requests",
            "hello",
            DeliveryMode::NonPersistent,
        ))
        .unwrap();

    let delivered = subscription.receiver.recv().await.unwrap();
    assert_eq!(delivered.destination, "tutorial/requests");
    assert_eq!(delivered.payload, "hello");
}

#[test]
fn test_double_subscribe_is_rejected() {
    let transport = LoopbackTransport::connect();
    let _first = transport.subscribe("tutorial/requests").unwrap();

    let err = transport.subscribe("tutorial/requests").unwrap_err();
    assert!(matches!(err, TransportError::AlreadySubscribed(_)));
}

#[test]
fn test_unsubscribe_is_idempotent() {
    let transport = LoopbackTransport::connect();
    let _subscription = transport.subscribe("tutorial/requests").unwrap();

    transport.unsubscribe("tutorial/requests").unwrap();
    transport.unsubscribe("tutorial/requests").unwrap();
    // The destination can be subscribed again afterwards
    assert!(transport.subscribe("tutorial/requests").is_ok());
}

#[test]
fn test_temporary_destinations_are_unique_and_prefixed() {
    let transport = LoopbackTransport::connect();

    let names: HashSet<_> = (0..20)
        .map(|_| transport.create_temporary_destination().unwrap())
        .collect();
    assert_eq!(names.len(), 20);
    assert!(names.iter().all(|n| n.starts_with(TEMPORARY_PREFIX)));
}

#[test]
fn test_nonpersistent_send_without_subscriber_is_dropped() {
    let transport = LoopbackTransport::connect();
    transport
        .send(outbound("tutorial/queue", "gone", DeliveryMode::NonPersistent))
        .unwrap();
    // Nothing to observe beyond the send being accepted; the message is
    // dropped with a trace.
    assert_eq!(transport.sent_messages().len(), 1);
}

#[tokio::test]
async fn test_persistent_send_is_parked_and_drained_on_subscribe() {
    let dir = tempdir().unwrap();
    let store = QueueStore::open(dir.path().to_str().unwrap(), None).unwrap();
    let transport = LoopbackTransport::connect_with_store(store);

    transport
        .send(outbound("tutorial/queue", "parked", DeliveryMode::Persistent))
        .unwrap();

    // The backlog is replayed to the first subscriber
    let mut subscription = transport.subscribe("tutorial/queue").unwrap();
    let delivered = subscription.receiver.recv().await.unwrap();
    assert_eq!(delivered.payload, "parked");

    // And only to the first
    drop(subscription);
    transport.unsubscribe("tutorial/queue").unwrap();
    let mut again = transport.subscribe("tutorial/queue").unwrap();
    assert!(again.receiver.try_recv().is_err());
}

#[test]
fn test_persistent_send_to_temporary_destination_is_not_parked() {
    let dir = tempdir().unwrap();
    let store = QueueStore::open(dir.path().to_str().unwrap(), None).unwrap();
    let transport = LoopbackTransport::connect_with_store(store.clone());

    let temp = transport.create_temporary_destination().unwrap();
    transport
        .send(outbound(&temp, "transient", DeliveryMode::Persistent))
        .unwrap();

    assert!(store.drain(&temp).is_empty());
}

#[test]
fn test_disconnect_emits_event_and_blocks_sends() {
    let transport = LoopbackTransport::connect();
    let events = transport.events();
    assert_eq!(*events.borrow(), SessionEvent::Up);

    transport.disconnect();
    assert_eq!(*events.borrow(), SessionEvent::Disconnected);

    let err = transport
        .send(outbound("tutorial/queue", "late", DeliveryMode::Persistent))
        .unwrap_err();
    assert!(matches!(err, TransportError::NotConnected));
    assert!(transport.subscribe("tutorial/queue").is_err());
    assert!(transport.create_temporary_destination().is_err());
}

#[tokio::test]
async fn test_disconnect_closes_subscriptions() {
    let transport = LoopbackTransport::connect();
    let mut subscription = transport.subscribe("tutorial/requests").unwrap();

    transport.disconnect();
    assert!(subscription.receiver.recv().await.is_none());
}
