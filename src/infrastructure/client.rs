//! Event store client handles and the subscription seam the probe runs against

use async_trait::async_trait;
use eventstore::{
    Client, ClientSettings, StreamPosition, SubscribeToStreamOptions, Subscription,
    SubscriptionEvent,
};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

use crate::{
    domain::{ConnectionMode, StreamName, WorkerCount},
    error::{Error, Result},
    infrastructure::log_messages,
};

/// Something that can open a live subscription on a stream
///
/// `subscribe` resolves only once the server has confirmed the subscription.
/// The returned handle keeps it open for as long as it is alive.
#[async_trait]
pub trait SubscriptionSource: Send + Sync + 'static {
    type Subscription: Send + 'static;

    async fn subscribe(&self, stream: &StreamName) -> Result<Self::Subscription>;
}

/// One `eventstore` client, i.e. one multiplexed gRPC connection
#[derive(Clone)]
pub struct EventStoreClient {
    client: Client,
}

impl EventStoreClient {
    pub fn connect(connection_string: &str) -> Result<Self> {
        debug!(connection_string, "{}", log_messages::client::CONNECTING);

        let settings: ClientSettings = connection_string
            .parse()
            .map_err(|e| Error::ConnectionString(format!("{connection_string}: {e}")))?;
        let client = Client::new(settings)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl SubscriptionSource for EventStoreClient {
    type Subscription = Subscription;

    #[instrument(skip(self), fields(stream = %stream))]
    async fn subscribe(&self, stream: &StreamName) -> Result<Subscription> {
        let options = SubscribeToStreamOptions::default().start_from(StreamPosition::End);
        let mut subscription = self
            .client
            .subscribe_to_stream(stream.as_ref(), &options)
            .await;

        loop {
            match subscription.next_subscription_event().await? {
                SubscriptionEvent::Confirmed(subscription_id) => {
                    trace!(
                        subscription_id = %subscription_id,
                        "{}",
                        log_messages::client::SUBSCRIPTION_CONFIRMED
                    );
                    return Ok(subscription);
                }
                SubscriptionEvent::EventAppeared(_) => {
                    trace!("{}", log_messages::client::SKIPPED_EVENT);
                }
                _ => {}
            }
        }
    }
}

/// How the workers of one probe run reach the server
pub enum WorkerConnections<S> {
    Shared(Arc<S>),
    PerWorker(Vec<Arc<S>>),
}

impl<S> WorkerConnections<S> {
    pub fn mode(&self) -> ConnectionMode {
        match self {
            Self::Shared(_) => ConnectionMode::Shared,
            Self::PerWorker(_) => ConnectionMode::PerWorker,
        }
    }

    pub fn connection_count(&self) -> usize {
        match self {
            Self::Shared(_) => 1,
            Self::PerWorker(sources) => sources.len(),
        }
    }

    /// Connection worker `worker` subscribes through
    pub fn for_worker(&self, worker: usize) -> Option<Arc<S>> {
        match self {
            Self::Shared(source) => Some(Arc::clone(source)),
            Self::PerWorker(sources) => sources.get(worker).cloned(),
        }
    }
}

/// Create the client handles for `workers` workers in the requested mode
pub fn connect_workers(
    connection_string: &str,
    mode: ConnectionMode,
    workers: WorkerCount,
) -> Result<WorkerConnections<EventStoreClient>> {
    match mode {
        ConnectionMode::Shared => Ok(WorkerConnections::Shared(Arc::new(
            EventStoreClient::connect(connection_string)?,
        ))),
        ConnectionMode::PerWorker => (0..workers.into_inner())
            .map(|_| EventStoreClient::connect(connection_string).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map(WorkerConnections::PerWorker),
    }
}

/// In-memory subscription source for testing
#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{OwnedSemaphorePermit, Semaphore};

    #[derive(Debug, Clone, Copy)]
    enum Fault {
        Fail,
        Panic,
    }

    /// A connection that multiplexes at most `max_streams` live subscriptions
    ///
    /// Further subscribe calls wait for a slot, which is how a saturated
    /// shared connection behaves from the caller's side.
    pub struct BoundedSubscriptionSource {
        streams: Arc<Semaphore>,
        calls: AtomicUsize,
        fault: Option<(usize, Fault)>,
    }

    impl BoundedSubscriptionSource {
        pub fn new(max_streams: usize) -> Self {
            Self {
                streams: Arc::new(Semaphore::new(max_streams)),
                calls: AtomicUsize::new(0),
                fault: None,
            }
        }

        /// Make the `call`-th subscribe call (zero based) fail
        pub fn failing_on(mut self, call: usize) -> Self {
            self.fault = Some((call, Fault::Fail));
            self
        }

        /// Make the `call`-th subscribe call (zero based) panic
        pub fn panicking_on(mut self, call: usize) -> Self {
            self.fault = Some((call, Fault::Panic));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn open_streams(&self, max_streams: usize) -> usize {
            max_streams - self.streams.available_permits()
        }
    }

    #[async_trait]
    impl SubscriptionSource for BoundedSubscriptionSource {
        type Subscription = OwnedSemaphorePermit;

        async fn subscribe(&self, _stream: &StreamName) -> Result<OwnedSemaphorePermit> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fault {
                Some((at, Fault::Fail)) if at == call => {
                    return Err(Error::application("connection reset by server"));
                }
                Some((at, Fault::Panic)) if at == call => panic!("stream multiplexer crashed"),
                _ => {}
            }

            Arc::clone(&self.streams)
                .acquire_owned()
                .await
                .map_err(|_| Error::application("connection closed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::BoundedSubscriptionSource;
    use super::*;

    #[test]
    fn test_shared_connections_hand_out_the_same_source() {
        let connections = WorkerConnections::Shared(Arc::new(BoundedSubscriptionSource::new(1)));

        let first = connections.for_worker(0).unwrap();
        let last = connections.for_worker(4).unwrap();

        assert!(Arc::ptr_eq(&first, &last));
        assert_eq!(connections.mode(), ConnectionMode::Shared);
        assert_eq!(connections.connection_count(), 1);
    }

    #[test]
    fn test_per_worker_connections_are_distinct() {
        let connections = WorkerConnections::PerWorker(vec![
            Arc::new(BoundedSubscriptionSource::new(1)),
            Arc::new(BoundedSubscriptionSource::new(1)),
        ]);

        let first = connections.for_worker(0).unwrap();
        let second = connections.for_worker(1).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(connections.for_worker(2).is_none());
        assert_eq!(connections.mode(), ConnectionMode::PerWorker);
        assert_eq!(connections.connection_count(), 2);
    }

    #[test]
    fn test_malformed_connection_string_is_rejected() {
        let result = EventStoreClient::connect("not a connection string");
        assert!(matches!(result, Err(Error::ConnectionString(_))));
    }

    #[tokio::test]
    async fn test_bounded_source_holds_a_slot_per_live_subscription() {
        let source = BoundedSubscriptionSource::new(2);
        let stream = StreamName::try_new("somestream").unwrap();

        let first = source.subscribe(&stream).await.unwrap();
        let _second = source.subscribe(&stream).await.unwrap();
        assert_eq!(source.open_streams(2), 2);

        drop(first);
        assert_eq!(source.open_streams(2), 1);
        assert_eq!(source.calls(), 2);
    }
}
