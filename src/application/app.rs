use crate::application::probe::{ProbeReport, SubscriptionProbe};
use crate::config::Settings;
use crate::infrastructure::{connect_workers, log_messages, EventStoreContainer};
use crate::Result;
use tracing::{info, instrument};

/// Main application struct that coordinates all components
pub struct Application {
    settings: Settings,
}

impl Application {
    #[instrument]
    pub fn new() -> Result<Self> {
        let settings = Settings::new()?;
        Ok(Self { settings })
    }

    pub fn from_settings(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start a fresh event store, fan out the subscriptions and tear it down again
    #[instrument(skip(self))]
    pub async fn run(self) -> Result<ProbeReport> {
        let plan = self.settings.harness.probe_plan()?;
        let mode = self.settings.harness.connection_mode;

        info!(
            %mode,
            lifecycle = %plan.lifecycle,
            "{}",
            log_messages::application::STARTING
        );

        let container = EventStoreContainer::start(&self.settings.container).await?;
        let connections = connect_workers(&container.connection_string(), mode, plan.workers)?;

        let probe = SubscriptionProbe::new(plan);
        let report = probe.run(&connections).await?;

        info!(
            confirmed = report.confirmed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "{}",
            log_messages::application::FINISHED
        );

        drop(connections);
        drop(container);

        Ok(report)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
