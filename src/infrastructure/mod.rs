//! Infrastructure layer for the subscription probe
//!
//! Adapters around the external pieces: the event-store container, the
//! client SDK and the logging stack.

pub mod client;
pub mod container;
pub mod log_messages;
pub mod telemetry;

pub use client::*;
pub use container::*;
