//! The `listener` module owns the lifecycle of one transient reply
//! destination and the inbound flow bound to it.
//!
//! Opening the listener completes before any request referencing its
//! destination may be sent — subscribing after sending is a protocol
//! ordering bug with a message-loss window, and the API makes it
//! unrepresentable by only handing the destination out once the listener
//! is active.

pub mod reply_listener;

pub use reply_listener::{ListenerState, ReplyListener};
