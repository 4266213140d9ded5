use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tungstenite::protocol::Message as WsMessage;

use crate::config::{SessionSettings, Settings};
use crate::coordinator::Coordinator;
use crate::session::Session;
use crate::transport::message::{DeliveryMode, WireMessage};
use crate::transport::websocket::WsTransport;
use crate::transport::{SessionEvent, Transport};
use crate::utils::error::TransportError;

/// Minimal in-test broker: accepts one client, acknowledges subscriptions
/// internally, and echoes every message carrying a reply-to back to that
/// destination with the same correlation id.
async fn run_echo_broker(listener: TcpListener) {
    let (stream, _) = listener.accept().await.expect("broker accept");
    let ws_stream = accept_async(stream).await.expect("broker handshake");
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    while let Some(Ok(frame)) = ws_receiver.next().await {
        if !frame.is_text() {
            continue;
        }
        let parsed: WireMessage =
            serde_json::from_str(frame.to_text().unwrap()).expect("broker frame parse");
        match parsed {
            WireMessage::Message {
                payload,
                correlation_id,
                reply_to: Some(reply_to),
                ..
            } => {
                let reply = WireMessage::Message {
                    destination: reply_to,
                    payload: format!("Echo: {payload}"),
                    delivery_mode: DeliveryMode::NonPersistent,
                    correlation_id,
                    reply_to: None,
                    timestamp: 0,
                };
                ws_sender
                    .send(WsMessage::text(serde_json::to_string(&reply).unwrap()))
                    .await
                    .expect("broker send");
            }
            // Connect, Subscribe, Unsubscribe and replyless messages need no
            // broker-side action in this fixture.
            _ => {}
        }
    }
}

async fn start_broker() -> SessionSettings {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(run_echo_broker(listener));

    let mut settings = Settings::default().session;
    settings.url = format!("ws://{addr}");
    settings
}

#[tokio::test]
async fn test_ws_connect_reports_up() {
    let settings = start_broker().await;
    let transport = WsTransport::connect(&settings).await.expect("connect");
    assert_eq!(*transport.events().borrow(), SessionEvent::Up);

    transport.disconnect();
    assert_eq!(*transport.events().borrow(), SessionEvent::Disconnected);
}

#[tokio::test]
async fn test_ws_connect_refused_is_an_error() {
    let mut settings = Settings::default().session;
    // Bind-then-drop to get a port nothing is listening on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    settings.url = format!("ws://{}", listener.local_addr().unwrap());
    drop(listener);

    assert!(WsTransport::connect(&settings).await.is_err());
}

#[tokio::test]
async fn test_ws_request_reply_round_trip() {
    let settings = start_broker().await;
    let transport = Arc::new(WsTransport::connect(&settings).await.expect("connect"));
    let session = Arc::new(Session::connect(settings, transport).unwrap());
    let coordinator = Coordinator::new(Arc::clone(&session));

    let reply = coordinator
        .request_reply("tutorial/requests", "Sample Request", Duration::from_secs(5))
        .await
        .expect("round trip");
    assert_eq!(reply, "Echo: Sample Request");

    session.disconnect();
}

#[tokio::test]
async fn test_ws_failed_subscribe_leaves_no_route_behind() {
    let transport = WsTransport::with_writer_gone();

    let err = transport.subscribe("tutorial/requests").unwrap_err();
    assert!(matches!(err, TransportError::SendFailed { .. }));

    // A retry must fail the same way, not report a subscription that was
    // never established
    let err = transport.subscribe("tutorial/requests").unwrap_err();
    assert!(matches!(err, TransportError::SendFailed { .. }));
}

#[tokio::test]
async fn test_ws_send_after_disconnect_fails() {
    let settings = start_broker().await;
    let transport = WsTransport::connect(&settings).await.expect("connect");
    transport.disconnect();

    assert!(transport.subscribe("tutorial/requests").is_err());
    assert!(transport.create_temporary_destination().is_err());
}
