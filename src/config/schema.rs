//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! healthchecker. All types derive Serde traits for deserialization from
//! config files; every field has a default so an empty file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the healthchecker.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HealthcheckerConfig {
    /// Logging settings.
    pub log: LogConfig,

    /// Listener settings.
    pub server: ServerConfig,

    /// HTTP status codes reported for each aggregate verdict.
    pub http_status: HttpStatusConfig,

    /// Settings shared by every upstream check.
    pub healthcheck: HealthcheckConfig,

    /// Geth execution client.
    pub geth: UpstreamConfig,

    /// Reth execution client.
    pub reth: UpstreamConfig,

    /// Lighthouse consensus client.
    pub lighthouse: UpstreamConfig,

    /// Optimism rollup node.
    pub op_node: OpNodeConfig,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Human-readable output.
    Dev,
    /// JSON lines.
    #[default]
    Prod,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub mode: LogMode,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            mode: LogMode::Prod,
        }
    }
}

/// Listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// HTTP status codes reported for each aggregate verdict.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpStatusConfig {
    pub ok: u16,
    pub warning: u16,
    pub error: u16,
}

impl Default for HttpStatusConfig {
    fn default() -> Self {
        Self {
            ok: 200,
            warning: 202,
            error: 500,
        }
    }
}

/// Settings shared by every upstream check.
///
/// Durations use the human-readable form (`"1s"`, `"750ms"`, `"2m"`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthcheckConfig {
    /// Maximum duration of a single upstream check.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Re-use the last report for this long (0 disables).
    #[serde(with = "humantime_serde")]
    pub cache_cool_off: Duration,

    /// Report unhealthy when the latest block is older than this (0 disables).
    #[serde(with = "humantime_serde")]
    pub block_age_threshold: Duration,
}

impl HealthcheckConfig {
    /// `None` when the block age check is disabled.
    pub fn block_age_limit(&self) -> Option<Duration> {
        (!self.block_age_threshold.is_zero()).then_some(self.block_age_threshold)
    }
}

impl Default for HealthcheckConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            cache_cool_off: Duration::from_millis(750),
            block_age_threshold: Duration::ZERO,
        }
    }
}

/// Upstream endpoint. An absent base URL disables the check.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: Option<String>,
}

/// Optimism rollup node endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OpNodeConfig {
    /// RPC endpoint of the op-node. An absent base URL disables the check.
    pub base_url: Option<String>,

    /// Number of L1 blocks the verifier keeps behind the L1 head before
    /// deriving L2 data.
    pub confirmation_distance: u64,
}
