//! Portainer connection configuration.

use serde::Deserialize;

/// HTTP transport settings.
///
/// No timeout is applied unless one is configured.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// TCP connect timeout in milliseconds.
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
}

/// `[portainer]` section of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortainerConfig {
    /// Base URL of the Portainer instance.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    /// Read from `PORTAINER_PASSWORD`, never from the file.
    #[serde(skip)]
    pub password: Option<String>,
    /// Portainer environment (endpoint) hosting the swarm.
    #[serde(default)]
    pub environment_id: Option<i64>,
    #[serde(default)]
    pub http: HttpConfig,
}
