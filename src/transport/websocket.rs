use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::config::SessionSettings;
use crate::transport::message::{InboundMessage, OutboundMessage, WireMessage};
use crate::transport::{SessionEvent, Subscription, Transport, TEMPORARY_PREFIX};
use crate::utils::error::TransportError;

type Routes = Arc<Mutex<HashMap<String, mpsc::UnboundedSender<InboundMessage>>>>;

/// Outbound WebSocket binding of the `Transport` seam.
///
/// A writer task drains an unbounded frame queue into the sink and a reader
/// task routes parsed `message` frames to per-destination subscription
/// channels. When the stream ends or errors, the session watch flips to
/// `Disconnected` so outstanding requests cancel promptly.
pub struct WsTransport {
    outbound: mpsc::UnboundedSender<WireMessage>,
    routes: Routes,
    events_tx: Arc<watch::Sender<SessionEvent>>,
    events_rx: watch::Receiver<SessionEvent>,
}

impl WsTransport {
    /// Connects to the broker at `settings.url` and announces the session
    /// credentials with a `connect` frame.
    ///
    /// `Up` on the event watch means transport-level connectivity, not
    /// authentication: the broker does not acknowledge the `connect` frame,
    /// and rejected credentials surface later as a stream close.
    pub async fn connect(settings: &SessionSettings) -> Result<Self, TransportError> {
        let (ws_stream, _) =
            connect_async(settings.url.as_str())
                .await
                .map_err(|e| TransportError::ConnectFailed {
                    url: settings.url.clone(),
                    reason: e.to_string(),
                })?;

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<WireMessage>();
        let (events_tx, events_rx) = watch::channel(SessionEvent::Connecting);
        let events_tx = Arc::new(events_tx);
        let routes: Routes = Arc::new(Mutex::new(HashMap::new()));

        // Writer task: frame queue -> sink
        let writer_events = Arc::clone(&events_tx);
        tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                let text = match serde_json::to_string(&frame) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("failed to serialize outbound frame: {e}");
                        continue;
                    }
                };
                if let Err(e) = ws_sender.send(WsMessage::text(text)).await {
                    warn!("websocket send failed: {e}");
                    let _ = writer_events.send(SessionEvent::Disconnected);
                    break;
                }
            }
        });

        // Reader task: stream -> per-destination subscription channels
        let reader_routes = Arc::clone(&routes);
        let reader_events = Arc::clone(&events_tx);
        tokio::spawn(async move {
            while let Some(Ok(frame)) = ws_receiver.next().await {
                if !frame.is_text() {
                    continue;
                }
                let text = frame.to_text().unwrap_or_default();
                match serde_json::from_str::<WireMessage>(text) {
                    Ok(WireMessage::Message {
                        destination,
                        payload,
                        correlation_id,
                        reply_to,
                        timestamp,
                        ..
                    }) => {
                        let routes = reader_routes.lock().unwrap();
                        match routes.get(&destination) {
                            Some(subscriber) => {
                                let _ = subscriber.send(InboundMessage {
                                    destination: destination.clone(),
                                    payload,
                                    correlation_id,
                                    reply_to,
                                    timestamp,
                                });
                            }
                            None => {
                                debug!(%destination, "frame for destination without subscription")
                            }
                        }
                    }
                    Ok(_) => debug!("ignoring control frame from broker"),
                    Err(e) => warn!("invalid broker frame: {e} | {text}"),
                }
            }
            info!("websocket stream closed");
            let _ = reader_events.send(SessionEvent::Disconnected);
        });

        let _ = outbound_tx.send(WireMessage::Connect {
            vpn_name: settings.vpn_name.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
        });
        let _ = events_tx.send(SessionEvent::Up);

        Ok(Self {
            outbound: outbound_tx,
            routes,
            events_tx,
            events_rx,
        })
    }

    /// A transport whose writer task has already exited while the session
    /// watch still reads `Up`, so frame enqueues fail.
    #[cfg(test)]
    pub(crate) fn with_writer_gone() -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        drop(outbound_rx);
        let (events_tx, events_rx) = watch::channel(SessionEvent::Up);
        Self {
            outbound: outbound_tx,
            routes: Arc::new(Mutex::new(HashMap::new())),
            events_tx: Arc::new(events_tx),
            events_rx,
        }
    }

    fn is_up(&self) -> bool {
        *self.events_rx.borrow() == SessionEvent::Up
    }

    fn enqueue(&self, frame: WireMessage, destination: &str) -> Result<(), TransportError> {
        self.outbound
            .send(frame)
            .map_err(|_| TransportError::SendFailed {
                destination: destination.to_string(),
                reason: "writer task gone".to_string(),
            })
    }
}

impl Transport for WsTransport {
    fn create_temporary_destination(&self) -> Result<String, TransportError> {
        if !self.is_up() {
            return Err(TransportError::NotConnected);
        }
        // Client-unique name under the reserved transient prefix; the broker
        // treats the whole prefix as non-durable.
        Ok(format!("{TEMPORARY_PREFIX}{}", Uuid::new_v4()))
    }

    fn subscribe(&self, destination: &str) -> Result<Subscription, TransportError> {
        if !self.is_up() {
            return Err(TransportError::NotConnected);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut routes = self.routes.lock().unwrap();
            if routes.contains_key(destination) {
                return Err(TransportError::AlreadySubscribed(destination.to_string()));
            }
            routes.insert(destination.to_string(), tx);
        }

        if let Err(e) = self.enqueue(
            WireMessage::Subscribe {
                destination: destination.to_string(),
            },
            destination,
        ) {
            // The broker never saw this subscription; drop the route so a
            // retry is not rejected as already subscribed.
            self.routes.lock().unwrap().remove(destination);
            return Err(e);
        }

        Ok(Subscription {
            destination: destination.to_string(),
            receiver: rx,
        })
    }

    fn unsubscribe(&self, destination: &str) -> Result<(), TransportError> {
        let removed = self.routes.lock().unwrap().remove(destination).is_some();
        if removed && self.is_up() {
            self.enqueue(
                WireMessage::Unsubscribe {
                    destination: destination.to_string(),
                },
                destination,
            )?;
        }
        Ok(())
    }

    fn send(&self, message: OutboundMessage) -> Result<(), TransportError> {
        if !self.is_up() {
            return Err(TransportError::NotConnected);
        }

        let destination = message.destination.clone();
        self.enqueue(
            WireMessage::Message {
                destination: message.destination,
                payload: message.payload,
                delivery_mode: message.delivery_mode,
                correlation_id: message.correlation_id,
                reply_to: message.reply_to,
                timestamp: Utc::now().timestamp_millis(),
            },
            &destination,
        )
    }

    fn disconnect(&self) {
        let _ = self.events_tx.send(SessionEvent::Disconnected);
        self.routes.lock().unwrap().clear();
    }

    fn events(&self) -> watch::Receiver<SessionEvent> {
        self.events_rx.clone()
    }
}
