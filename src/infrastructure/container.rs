//! Single-node event store running in a throwaway container

use testcontainers::{
    core::{wait::HttpWaitStrategy, IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tracing::{info, instrument};

use crate::config::ContainerSettings;
use crate::error::Result;
use crate::infrastructure::log_messages;

/// Handle to a running event store. Dropping it stops and removes the container.
pub struct EventStoreContainer {
    container: ContainerAsync<GenericImage>,
    host: String,
    mapped_port: u16,
}

impl EventStoreContainer {
    /// Start the container and wait until both `/gossip` and `/stats` answer 200
    #[instrument(skip(settings), fields(network = %settings.network))]
    pub async fn start(settings: &ContainerSettings) -> Result<Self> {
        let image = settings.image();
        let environment = settings.server_environment();
        let port = environment.http_port();

        info!(image = %image, port, "{}", log_messages::container::STARTING);

        let mut request = GenericImage::new(image.repository, image.tag)
            .with_exposed_port(port.tcp())
            .with_wait_for(readiness_probe("/gossip", port))
            .with_wait_for(readiness_probe("/stats", port))
            .with_network(settings.network.clone())
            .with_startup_timeout(settings.startup_timeout());

        for (name, value) in environment.variables() {
            request = request.with_env_var(name, value);
        }
        if let Some(name) = &settings.container_name {
            request = request.with_container_name(name.clone());
        }

        let container = request.start().await?;
        let host = container.get_host().await?.to_string();
        let mapped_port = container.get_host_port_ipv4(port.tcp()).await?;

        info!(
            container_id = container.id(),
            host = %host,
            mapped_port,
            "{}",
            log_messages::container::READY
        );

        Ok(Self {
            container,
            host,
            mapped_port,
        })
    }

    pub fn id(&self) -> &str {
        self.container.id()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn mapped_port(&self) -> u16 {
        self.mapped_port
    }

    pub fn connection_string(&self) -> String {
        connection_string(&self.host, self.mapped_port)
    }
}

/// Insecure gRPC connection string for a node reachable at `host:port`
pub fn connection_string(host: &str, port: u16) -> String {
    format!("esdb://{host}:{port}?tls=false")
}

fn readiness_probe(path: &str, port: u16) -> WaitFor {
    WaitFor::http(
        HttpWaitStrategy::new(path)
            .with_port(port.tcp())
            .with_expected_status_code(200_u16),
    )
}
