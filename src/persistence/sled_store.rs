use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sled::Db;
use tracing::warn;

use crate::transport::message::InboundMessage;

/// A guaranteed message parked for a durable queue with no live subscriber.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoredMessage {
    pub destination: String,
    pub payload: String,
    pub correlation_id: Option<String>,
    pub reply_to: Option<String>,
    pub timestamp: i64,
}

/// Embedded store holding one sled tree per durable destination.
///
/// Keys are `[timestamp_ms | sequence]` so entries drain in arrival order and
/// two messages parked in the same millisecond never collide.
#[derive(Clone)]
pub struct QueueStore {
    db: Db,
    ttl_seconds: Option<i64>,
    sequence: Arc<AtomicU64>,
}

impl QueueStore {
    pub fn open(path: &str, ttl_seconds: Option<i64>) -> Result<Self, sled::Error> {
        let db = sled::open(path)?;
        Ok(Self {
            db,
            ttl_seconds,
            sequence: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Parks one message under its destination's tree.
    pub fn park(&self, message: &InboundMessage) {
        let stored = StoredMessage {
            destination: message.destination.clone(),
            payload: message.payload.clone(),
            correlation_id: message.correlation_id.clone(),
            reply_to: message.reply_to.clone(),
            timestamp: message.timestamp,
        };

        let serialized = match serde_json::to_vec(&stored) {
            Ok(data) => data,
            Err(e) => {
                warn!("failed to serialize parked message: {e}");
                return;
            }
        };

        let tree = match self.db.open_tree(&stored.destination) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(destination = %stored.destination, "failed to open queue tree: {e}");
                return;
            }
        };

        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&stored.timestamp.to_be_bytes());
        key[8..].copy_from_slice(&self.sequence.fetch_add(1, Ordering::Relaxed).to_be_bytes());
        if let Err(e) = tree.insert(key, serialized) {
            warn!(destination = %stored.destination, "failed to park message: {e}");
        }
    }

    /// Replays and clears every non-expired message parked for `destination`.
    /// Each parked message is drained at most once.
    pub fn drain(&self, destination: &str) -> Vec<StoredMessage> {
        self.cleanup_expired(destination);

        let tree = match self.db.open_tree(destination) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(destination = %destination, "failed to open queue tree: {e}");
                return Vec::new();
            }
        };

        let entries: Vec<_> = tree.iter().filter_map(|res| res.ok()).collect();
        let mut drained = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            if let Ok(stored) = serde_json::from_slice::<StoredMessage>(&value) {
                drained.push(stored);
            }
            let _ = tree.remove(key);
        }
        drained
    }

    fn cleanup_expired(&self, destination: &str) {
        if let Some(ttl) = self.ttl_seconds {
            let now = Utc::now().timestamp_millis();
            let expiry_time = now - ttl * 1000;

            let tree = match self.db.open_tree(destination) {
                Ok(tree) => tree,
                Err(_) => return,
            };
            let expired_keys: Vec<_> = tree
                .iter()
                .filter_map(|res| res.ok())
                .filter_map(|(key, _)| {
                    if key.len() == 16 {
                        let ts = i64::from_be_bytes(key[..8].try_into().unwrap());
                        if ts < expiry_time { Some(key) } else { None }
                    } else {
                        None
                    }
                })
                .collect();

            for key in expired_keys {
                let _ = tree.remove(key);
            }
        }
    }
}

impl std::fmt::Debug for QueueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueStore")
            .field("db", &"sled::Db")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}
