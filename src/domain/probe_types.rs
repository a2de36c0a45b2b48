//! Type-safe parameters for a subscription probe run

use nutype::nutype;
use serde::Deserialize;
use std::time::Duration;

/// Number of workers subscribing concurrently
#[nutype(
    validate(greater = 0),
    derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)
)]
pub struct WorkerCount(usize);

/// Number of sequential subscribe calls each worker performs
#[nutype(
    validate(greater = 0),
    derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)
)]
pub struct IterationsPerWorker(usize);

/// Deadline for a single subscription to be confirmed by the server
#[nutype(
    validate(predicate = |d| !d.is_zero()),
    derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)
)]
pub struct SetupTimeout(Duration);

impl SetupTimeout {
    pub fn from_millis(millis: u64) -> Result<Self, SetupTimeoutError> {
        Self::try_new(Duration::from_millis(millis))
    }
}

/// Name of the stream every worker subscribes to
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 255),
    derive(Debug, Clone, PartialEq, Eq, Hash, AsRef, Display)
)]
pub struct StreamName(String);

/// How client connections are distributed over workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    /// Every worker subscribes through the same client
    #[display("shared")]
    Shared,
    /// Each worker owns its client and therefore its own TCP connection
    #[display("per_worker")]
    PerWorker,
}

/// What happens to a subscription once the server confirmed it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionLifecycle {
    /// Keep it open until the whole run is over
    #[display("hold")]
    Hold,
    /// Drop it right away
    #[display("release")]
    Release,
}

/// Everything a probe run needs to know
#[derive(Debug, Clone)]
pub struct ProbePlan {
    pub workers: WorkerCount,
    pub iterations_per_worker: IterationsPerWorker,
    pub setup_timeout: SetupTimeout,
    pub stream: StreamName,
    pub lifecycle: SubscriptionLifecycle,
}

impl ProbePlan {
    /// Total number of subscriptions a successful run confirms
    pub fn expected_subscriptions(&self) -> u64 {
        (self.workers.into_inner() as u64)
            .saturating_mul(self.iterations_per_worker.into_inner() as u64)
    }
}
