//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML config file.

use serde::{Deserialize, Serialize};

/// Root configuration for the multiplexer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MuxConfig {
    /// Upstream session servers, queried in parallel.
    pub servers: Vec<ServerConfig>,

    /// Enable debug logging.
    pub debug: bool,

    /// Bind address (e.g., "0.0.0.0:8080").
    pub listen: String,

    /// Prometheus exporter settings.
    pub metrics: MetricsConfig,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            debug: false,
            listen: "0.0.0.0:8080".to_string(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// One upstream Yggdrasil session server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Display name for logs. Defaults to the prefix.
    #[serde(default)]
    pub name: Option<String>,

    /// API root, e.g. "https://sessionserver.mojang.com".
    #[serde(default)]
    pub prefix: String,

    /// Outbound proxy URL.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl ServerConfig {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            name: None,
            prefix: prefix.into(),
            proxy: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Name used in logs and errors.
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.prefix.trim_end_matches('/').to_string(),
        }
    }
}

/// Metrics exporter configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Serve `/metrics` on the main listener.
    pub enabled: bool,
}
