use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::domain::{
    ConnectionMode, ImageReference, IterationsPerWorker, ProbePlan, ServerEnvironment,
    SetupTimeout, StreamName, SubscriptionLifecycle, WorkerCount,
};
use crate::error::{Error, Result};

pub const ENV_PREFIX: &str = "SUBSCRIPTION_PROBE";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub container: ContainerSettings,
    pub harness: HarnessSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContainerSettings {
    pub image_repository: String,
    pub image_tag: Option<String>,
    pub network: String,
    pub container_name: Option<String>,
    pub http_port: u16,
    pub startup_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HarnessSettings {
    pub workers: usize,
    pub iterations_per_worker: usize,
    pub setup_timeout_ms: u64,
    pub stream_name: String,
    pub connection_mode: ConnectionMode,
    pub lifecycle: SubscriptionLifecycle,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Settings {
    pub fn new() -> std::result::Result<Self, ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// Load defaults, then the file layers found in `dir`, then the environment
    pub fn load_from(dir: &Path) -> std::result::Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let layer = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let config = Config::builder()
            .set_default("container.image_repository", "eventstore/eventstore")?
            .set_default("container.network", "customNetwork")?
            .set_default("container.http_port", 2113)?
            .set_default("container.startup_timeout_secs", 120)?
            .set_default("harness.workers", 5)?
            .set_default("harness.iterations_per_worker", 100)?
            .set_default("harness.setup_timeout_ms", 1000)?
            .set_default("harness.stream_name", "somestream")?
            .set_default("harness.connection_mode", "per_worker")?
            .set_default("harness.lifecycle", "hold")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&layer("default")).required(false))
            .add_source(File::with_name(&layer(&environment)).required(false))
            .add_source(File::with_name(&layer("local")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl ContainerSettings {
    pub fn image(&self) -> ImageReference {
        match &self.image_tag {
            Some(tag) => ImageReference::new(self.image_repository.clone(), tag.clone()),
            None => ImageReference::for_host(self.image_repository.clone()),
        }
    }

    pub fn server_environment(&self) -> ServerEnvironment {
        ServerEnvironment::new(self.http_port)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }
}

impl HarnessSettings {
    /// Validate the raw numbers into a plan the probe can run
    pub fn probe_plan(&self) -> Result<ProbePlan> {
        Ok(ProbePlan {
            workers: WorkerCount::try_new(self.workers)
                .map_err(|e| Error::invalid_setting("harness.workers", e))?,
            iterations_per_worker: IterationsPerWorker::try_new(self.iterations_per_worker)
                .map_err(|e| Error::invalid_setting("harness.iterations_per_worker", e))?,
            setup_timeout: SetupTimeout::from_millis(self.setup_timeout_ms)
                .map_err(|e| Error::invalid_setting("harness.setup_timeout_ms", e))?,
            stream: StreamName::try_new(self.stream_name.clone())
                .map_err(|e| Error::invalid_setting("harness.stream_name", e))?,
            lifecycle: self.lifecycle,
        })
    }
}
