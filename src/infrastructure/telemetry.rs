//! Tracing subscriber setup

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, LoggingSettings};

/// Filter from `RUST_LOG` when set, otherwise from the configured level
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level))
}

/// Install the global subscriber. Later calls are ignored so tests can call it freely.
pub fn init_tracing(settings: &LoggingSettings) {
    let filter = env_filter(settings);
    let result = match settings.format {
        LogFormat::Json => fmt().json().with_env_filter(filter).try_init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).try_init(),
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_does_not_panic() {
        let settings = LoggingSettings {
            level: "debug".to_string(),
            format: LogFormat::Json,
        };

        init_tracing(&settings);
        init_tracing(&settings);
    }
}
