//! The `persistence` module backs the guaranteed-delivery contract of the
//! in-process broker.
//!
//! Persistent messages sent to a durable queue with no live subscriber are
//! parked in an embedded `sled` store and replayed to the next subscriber,
//! so durability survives the sender going away.

pub mod sled_store;

pub use sled_store::{QueueStore, StoredMessage};
