use std::sync::Arc;

use super::DeliveryChannel;
use crate::config::Settings;
use crate::session::Session;
use crate::transport::loopback::LoopbackTransport;
use crate::transport::message::DeliveryMode;
use crate::utils::error::DeliveryError;

fn channel_over_loopback() -> (Arc<LoopbackTransport>, Arc<Session>, DeliveryChannel) {
    let transport = Arc::new(LoopbackTransport::connect());
    let session = Arc::new(
        Session::connect(Settings::default().session, transport.clone()).unwrap(),
    );
    let channel = DeliveryChannel::new(session.clone());
    (transport, session, channel)
}

#[test]
fn test_send_marks_message_persistent() {
    let (transport, _session, channel) = channel_over_loopback();

    channel
        .send("tutorial/queue", "Sample Message", None, None)
        .unwrap();

    let sent = transport.sent_messages();
    assert_eq!(sent.len(), 1, "exactly one transport send");
    assert_eq!(sent[0].destination, "tutorial/queue");
    assert_eq!(sent[0].delivery_mode, DeliveryMode::Persistent);
}

#[test]
fn test_send_requires_connected_session() {
    let (_transport, session, channel) = channel_over_loopback();
    session.disconnect();

    let err = channel
        .send("tutorial/queue", "too late", None, None)
        .unwrap_err();
    assert!(matches!(err, DeliveryError::NotConnected));
}

#[test]
fn test_send_rejects_unregistered_reply_to() {
    let (_transport, _session, channel) = channel_over_loopback();

    let err = channel
        .send("tutorial/requests", "req", Some("req-1"), Some("#reply/ghost"))
        .unwrap_err();
    assert!(matches!(err, DeliveryError::UnknownReplyDestination(_)));
}

#[test]
fn test_send_accepts_registered_reply_to() {
    let (transport, _session, channel) = channel_over_loopback();

    channel.register_reply_destination("#reply/mine");
    channel
        .send("tutorial/requests", "req", Some("req-1"), Some("#reply/mine"))
        .unwrap();

    let sent = transport.sent_messages();
    assert_eq!(sent[0].reply_to.as_deref(), Some("#reply/mine"));
    assert_eq!(sent[0].correlation_id.as_deref(), Some("req-1"));
}

#[test]
fn test_deregistered_reply_to_is_rejected_again() {
    let (_transport, _session, channel) = channel_over_loopback();

    channel.register_reply_destination("#reply/mine");
    channel.deregister_reply_destination("#reply/mine");

    let err = channel
        .send("tutorial/requests", "req", Some("req-2"), Some("#reply/mine"))
        .unwrap_err();
    assert!(matches!(err, DeliveryError::UnknownReplyDestination(_)));
}
