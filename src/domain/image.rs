//! Container image and server environment for the single-node event store

use std::fmt;

/// Tag used on 64-bit ARM hosts
pub const ARM64_TAG: &str = "24.2.0-alpha-arm64v8";

/// Tag used everywhere else
pub const DEFAULT_TAG: &str = "24.2.0-buster-slim";

/// Repository and tag of the event-store image to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub repository: String,
    pub tag: String,
}

impl ImageReference {
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// Pick the tag that has a build for the given CPU architecture
    pub fn for_arch(repository: impl Into<String>, arch: &str) -> Self {
        let tag = match arch {
            "aarch64" | "arm64" => ARM64_TAG,
            _ => DEFAULT_TAG,
        };
        Self::new(repository, tag)
    }

    pub fn for_host(repository: impl Into<String>) -> Self {
        Self::for_arch(repository, std::env::consts::ARCH)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// Environment that turns the image into an insecure single node with projections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEnvironment {
    http_port: u16,
}

impl ServerEnvironment {
    pub fn new(http_port: u16) -> Self {
        Self { http_port }
    }

    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub fn variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("EVENTSTORE_CLUSTER_SIZE", "1".to_string()),
            ("EVENTSTORE_RUN_PROJECTIONS", "All".to_string()),
            ("EVENTSTORE_START_STANDARD_PROJECTIONS", "true".to_string()),
            ("EVENTSTORE_HTTP_PORT", self.http_port.to_string()),
            ("EVENTSTORE_INSECURE", "true".to_string()),
        ]
    }
}
