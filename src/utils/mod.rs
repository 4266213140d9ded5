//! The `utils` module provides shared infrastructure used across the
//! `replyq` crate: the error taxonomy and logging initialization.

pub mod error;
pub mod logging;
