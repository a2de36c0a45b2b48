//! Application services that drive a probe run
//!
//! This module wires settings, the container and the client handles
//! together and runs the subscription fan-out against them.

pub mod app;
pub mod probe;

pub use app::Application;
pub use probe::{ProbeReport, SubscriptionProbe};
