use anyhow::Result;
use subscription_probe::config::Settings;
use subscription_probe::infrastructure::{log_messages, telemetry};
use subscription_probe::Application;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;
    telemetry::init_tracing(&settings.logging);

    info!(pid = std::process::id(), "{}", log_messages::application::PROCESS_ID);

    match Application::from_settings(settings).run().await {
        Ok(report) => {
            info!(
                confirmed = report.confirmed,
                held = report.held,
                "Test passed with global counter at: {}",
                report.confirmed
            );
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "{}", log_messages::application::FAILED);
            Err(err.into())
        }
    }
}
