//! The `coordinator` module orchestrates one guaranteed request/reply
//! exchange end to end, and carries the degenerate fire-and-forget queue
//! producer that shares the same session and delivery channel.

pub mod engine;
pub mod producer;

pub use engine::Coordinator;
pub use producer::QueueProducer;
