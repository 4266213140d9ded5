//! # ReplyQ
//!
//! `replyq` is a guaranteed request/reply coordination library built with Rust.
//! It binds outbound requests to transient reply destinations, tracks
//! correlation identifiers, and resolves exactly one matching reply per
//! request — or times it out — on top of an abstract guaranteed-messaging
//! transport.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `config`: Typed configuration for the broker session and request defaults.
//! - `session`: Lifecycle of one authenticated broker connection.
//! - `transport`: The messaging seam — wire frames, the `Transport` trait, and
//!   the loopback and WebSocket implementations.
//! - `delivery`: The guaranteed send path enforcing persistent delivery.
//! - `correlation`: Pending-request tracking and reply resolution.
//! - `listener`: Ownership of one transient reply destination and its flow.
//! - `coordinator`: The single-call request/reply exchange and the
//!   fire-and-forget queue producer.
//! - `persistence`: Sled-backed parking of guaranteed messages for the
//!   in-process broker.
//! - `utils`: Shared error types and logging setup.

pub mod config;
pub mod coordinator;
pub mod correlation;
pub mod delivery;
pub mod listener;
pub mod persistence;
pub mod session;
pub mod transport;
pub mod utils;
