//! Log message constants for the probe
//!
//! This module centralizes the messages logged by the probe so the wording
//! stays consistent between the library, the binary and the tests. Variable
//! data is attached as structured tracing fields, never interpolated.

/// Application startup and lifecycle messages
pub mod application {
    pub const STARTING: &str = "Starting subscription probe";
    pub const PROCESS_ID: &str = "Probe process started";
    pub const FINISHED: &str = "Subscription probe finished";
    pub const FAILED: &str = "Subscription probe failed";
}

/// Container lifecycle messages
pub mod container {
    pub const STARTING: &str = "Starting event store container";
    pub const READY: &str = "Event store container is ready";
}

/// Client connection messages
pub mod client {
    pub const CONNECTING: &str = "Creating event store client";
    pub const SUBSCRIPTION_CONFIRMED: &str = "Subscription confirmed by server";
    pub const SKIPPED_EVENT: &str = "Ignoring subscription event received before confirmation";
}

/// Probe fan-out messages
pub mod probe {
    pub const STARTED: &str = "Spawning subscription workers";
    pub const WORKER_FINISHED: &str = "Worker finished all iterations";
    pub const SUBSCRIPTION_TIMED_OUT: &str = "Subscription was not confirmed before the deadline";
    pub const SUBSCRIPTION_FAILED: &str = "Subscription setup failed";
    pub const ABORTING_WORKERS: &str = "Aborting remaining workers after first failure";
    pub const RELEASING_SUBSCRIPTIONS: &str = "Releasing held subscriptions";
}
