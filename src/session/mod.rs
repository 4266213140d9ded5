//! The `session` module owns the lifecycle of one authenticated broker
//! connection.
//!
//! A `Session` is constructed over an already-connected transport, exposes
//! the connection state derived from transport lifecycle events, and is
//! owned exclusively by one coordinator for the duration of a run.

pub mod broker_session;

pub use broker_session::{Session, SessionState};

#[cfg(test)]
mod tests;
