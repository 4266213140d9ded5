use std::sync::Arc;

use tracing::info;

use crate::delivery::DeliveryChannel;
use crate::utils::error::DeliveryError;

/// Fire-and-forget producer for durable queues.
///
/// The degenerate case of the coordinator: no reply listener, no correlation
/// tracking — one persistent send through the shared delivery channel.
pub struct QueueProducer {
    channel: Arc<DeliveryChannel>,
}

impl QueueProducer {
    pub fn new(channel: Arc<DeliveryChannel>) -> Self {
        Self { channel }
    }

    /// Sends one persistent message to `destination`.
    pub fn send_once(&self, destination: &str, payload: &str) -> Result<(), DeliveryError> {
        self.channel.send(destination, payload, None, None)?;
        info!(%destination, "queue message sent");
        Ok(())
    }
}
