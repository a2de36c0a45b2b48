//! Concurrent subscription fan-out raced against a per-subscription deadline
//!
//! Every worker performs its subscribe calls one after the other. Each call
//! must be confirmed within the setup timeout. The first worker that times
//! out or fails stops the whole run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::{
    domain::{ConnectionMode, ProbePlan, SubscriptionLifecycle},
    error::{Error, Result},
    infrastructure::{log_messages, SubscriptionSource, WorkerConnections},
};

/// Outcome of a probe run in which no subscription stalled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub mode: ConnectionMode,
    pub lifecycle: SubscriptionLifecycle,
    pub workers: usize,
    pub iterations_per_worker: usize,
    /// Global count of subscriptions the server confirmed
    pub confirmed: u64,
    /// Subscriptions still open when the last worker finished
    pub held: usize,
    pub elapsed: Duration,
}

pub struct SubscriptionProbe {
    plan: ProbePlan,
    confirmed: Arc<AtomicU64>,
}

impl SubscriptionProbe {
    pub fn new(plan: ProbePlan) -> Self {
        Self {
            plan,
            confirmed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscriptions confirmed so far in the current or last run
    pub fn confirmed(&self) -> u64 {
        self.confirmed.load(Ordering::SeqCst)
    }

    /// Fan out the workers and wait for all of them, or for the first failure
    #[instrument(
        skip(self, connections),
        fields(
            mode = %connections.mode(),
            workers = self.plan.workers.into_inner(),
            iterations = self.plan.iterations_per_worker.into_inner()
        )
    )]
    pub async fn run<S: SubscriptionSource>(
        &self,
        connections: &WorkerConnections<S>,
    ) -> Result<ProbeReport> {
        let workers = self.plan.workers.into_inner();
        if let WorkerConnections::PerWorker(sources) = connections {
            if sources.len() != workers {
                return Err(Error::invalid_setting(
                    "harness.workers",
                    format!("{workers} workers but {} connections", sources.len()),
                ));
            }
        }

        self.confirmed.store(0, Ordering::SeqCst);
        let start = Instant::now();
        let mut tasks = JoinSet::new();

        info!(stream = %self.plan.stream, "{}", log_messages::probe::STARTED);

        for index in 0..workers {
            let source = connections
                .for_worker(index)
                .ok_or_else(|| Error::application(format!("no connection for worker {index}")))?;
            let worker = Worker {
                index,
                plan: self.plan.clone(),
                confirmed: Arc::clone(&self.confirmed),
            };
            tasks.spawn(worker.run(source));
        }

        let mut held = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined.map_err(|e| Error::WorkerPanicked(e.to_string()))? {
                Ok(subscriptions) => held.extend(subscriptions),
                Err(error) => {
                    warn!(%error, "{}", log_messages::probe::ABORTING_WORKERS);
                    tasks.abort_all();
                    return Err(error);
                }
            }
        }

        let report = ProbeReport {
            mode: connections.mode(),
            lifecycle: self.plan.lifecycle,
            workers,
            iterations_per_worker: self.plan.iterations_per_worker.into_inner(),
            confirmed: self.confirmed(),
            held: held.len(),
            elapsed: start.elapsed(),
        };

        debug!(held = report.held, "{}", log_messages::probe::RELEASING_SUBSCRIPTIONS);
        drop(held);

        Ok(report)
    }
}

struct Worker {
    index: usize,
    plan: ProbePlan,
    confirmed: Arc<AtomicU64>,
}

impl Worker {
    async fn run<S: SubscriptionSource>(self, source: Arc<S>) -> Result<Vec<S::Subscription>> {
        let deadline = self.plan.setup_timeout.into_inner();
        let mut held = Vec::new();

        for iteration in 0..self.plan.iterations_per_worker.into_inner() {
            let subscription = match timeout(deadline, source.subscribe(&self.plan.stream)).await {
                Ok(Ok(subscription)) => subscription,
                Ok(Err(error)) => {
                    warn!(
                        worker = self.index,
                        iteration,
                        %error,
                        "{}",
                        log_messages::probe::SUBSCRIPTION_FAILED
                    );
                    return Err(Error::SubscriptionSetup {
                        worker: self.index,
                        iteration,
                        source: Box::new(error),
                    });
                }
                Err(_) => {
                    let confirmed = self.confirmed.load(Ordering::SeqCst);
                    warn!(
                        worker = self.index,
                        iteration,
                        confirmed,
                        "{}",
                        log_messages::probe::SUBSCRIPTION_TIMED_OUT
                    );
                    return Err(Error::SubscriptionTimeout {
                        worker: self.index,
                        iteration,
                        confirmed,
                    });
                }
            };

            self.confirmed.fetch_add(1, Ordering::SeqCst);
            match self.plan.lifecycle {
                SubscriptionLifecycle::Hold => held.push(subscription),
                SubscriptionLifecycle::Release => drop(subscription),
            }
        }

        debug!(worker = self.index, "{}", log_messages::probe::WORKER_FINISHED);
        Ok(held)
    }
}
