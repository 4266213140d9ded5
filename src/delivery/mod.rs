//! The `delivery` module is the guaranteed send path.
//!
//! Every message leaving through the `DeliveryChannel` is marked for
//! persistent delivery; callers cannot downgrade durability.

pub mod channel;

pub use channel::DeliveryChannel;

#[cfg(test)]
mod tests;
