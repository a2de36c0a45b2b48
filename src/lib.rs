//! Subscription probe - reproduces subscription stalls against a live event store
//!
//! The probe starts a single-node event store in a container, opens many
//! concurrent stream subscriptions against it and fails on the first one that
//! is not confirmed in time. Subscriptions multiplexed over one shared client
//! connection stall once the connection is saturated; one connection per
//! worker does not.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::{Application, ProbeReport, SubscriptionProbe};
pub use error::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionMode, SubscriptionLifecycle};
    use std::time::Duration;

    #[test]
    fn test_report_and_errors_are_reachable_from_the_crate_root() {
        let report = ProbeReport {
            mode: ConnectionMode::PerWorker,
            lifecycle: SubscriptionLifecycle::Hold,
            workers: 5,
            iterations_per_worker: 100,
            confirmed: 500,
            held: 500,
            elapsed: Duration::from_millis(250),
        };
        let failure: Result<ProbeReport> = Err(Error::application("stalled"));

        assert_eq!(report.clone(), report);
        assert!(failure.is_err());
    }
}
