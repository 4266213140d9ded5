use serde::{Deserialize, Serialize};

/// Durability contract for an outbound message.
///
/// `Persistent` messages must survive a broker restart; `NonPersistent` is
/// best-effort and may be dropped when no subscriber is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    Persistent,
    NonPersistent,
}

/// Frames exchanged with the broker, serialized as tagged JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireMessage {
    #[serde(rename = "connect")]
    Connect {
        vpn_name: String,
        username: String,
        password: String,
    },

    #[serde(rename = "subscribe")]
    Subscribe { destination: String },

    #[serde(rename = "unsubscribe")]
    Unsubscribe { destination: String },

    #[serde(rename = "message")]
    Message {
        destination: String,
        payload: String,
        delivery_mode: DeliveryMode,
        correlation_id: Option<String>,
        reply_to: Option<String>,
        timestamp: i64,
    },
}

/// A message handed to the transport for transmission.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub destination: String,
    pub payload: String,
    pub delivery_mode: DeliveryMode,
    pub correlation_id: Option<String>,
    pub reply_to: Option<String>,
}

/// A message delivered by the transport to a subscription.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub destination: String,
    pub payload: String,
    pub correlation_id: Option<String>,
    pub reply_to: Option<String>,
    /// Unix timestamp in milliseconds, stamped at transmission.
    pub timestamp: i64,
}
