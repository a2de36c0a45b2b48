use thiserror::Error;

/// Subscription probe error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid setting {field}: {reason}")]
    InvalidSetting { field: String, reason: String },

    #[error("Container error: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("Invalid connection string: {0}")]
    ConnectionString(String),

    #[error("Event store error: {0}")]
    EventStore(#[from] eventstore::Error),

    #[error("timeout at worker: {worker}, iteration: {iteration}, global counter: {confirmed}")]
    SubscriptionTimeout {
        worker: usize,
        iteration: usize,
        confirmed: u64,
    },

    #[error("error setting up subscription at worker: {worker}, iteration: {iteration}: {source}")]
    SubscriptionSetup {
        worker: usize,
        iteration: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Worker task failed: {0}")]
    WorkerPanicked(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Application error: {0}")]
    Application(String),
}

impl Error {
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application(message.into())
    }

    pub fn invalid_setting(field: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidSetting {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// True when the failure is a stalled subscription rather than a hard error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::SubscriptionTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_worker_iteration_and_counter() {
        let error = Error::SubscriptionTimeout {
            worker: 3,
            iteration: 20,
            confirmed: 100,
        };

        assert_eq!(
            error.to_string(),
            "timeout at worker: 3, iteration: 20, global counter: 100"
        );
        assert!(error.is_timeout());
    }

    #[test]
    fn test_setup_error_keeps_its_source() {
        let error = Error::SubscriptionSetup {
            worker: 1,
            iteration: 7,
            source: Box::new(Error::application("connection refused")),
        };

        assert!(!error.is_timeout());
        assert!(error.to_string().contains("connection refused"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_io_errors_convert_with_question_mark() {
        fn read_missing() -> Result<String> {
            Ok(std::fs::read_to_string(
                "/nonexistent/subscription_probe/config.toml",
            )?)
        }

        let error = read_missing().unwrap_err();
        assert!(matches!(error, Error::Io(_)));
        assert!(error.to_string().starts_with("IO error: "));
    }

    #[test]
    fn test_invalid_setting_formats_field_and_reason() {
        let error = Error::invalid_setting("harness.workers", "must be greater than zero");
        assert_eq!(
            error.to_string(),
            "Invalid setting harness.workers: must be greater than zero"
        );
    }
}
