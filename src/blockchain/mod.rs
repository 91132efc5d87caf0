//! Upstream node adapters.
//!
//! # Data Flow
//! ```text
//! HealthcheckerConfig (base URLs, thresholds)
//!     → build_monitors (one Monitor per configured upstream)
//!     → client.rs (JSON-RPC / REST over a shared reqwest pool)
//!     → execution.rs | lighthouse.rs | op_node.rs (parse + classify)
//!     → CheckResult
//! ```
//!
//! # Design Decisions
//! - Every fault is converted into a `CheckError` at the adapter boundary
//! - Sync payloads are parsed into tagged enums and matched exhaustively
//! - Which not-synced states are tolerated is decided here, not in the core

pub mod client;
pub mod execution;
pub mod lighthouse;
pub mod op_node;
pub mod types;

use std::sync::Arc;

pub use client::UpstreamClient;
pub use execution::{ExecutionClient, ExecutionMonitor};
pub use lighthouse::LighthouseMonitor;
pub use op_node::OpNodeMonitor;
pub use types::{BlockchainError, BlockchainResult};

use crate::config::HealthcheckerConfig;
use crate::health::Monitor;

/// Create one monitor per configured upstream, in the order geth,
/// lighthouse, op-node, reth.
pub fn build_monitors(config: &HealthcheckerConfig) -> BlockchainResult<Vec<Arc<dyn Monitor>>> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("node-healthchecker/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let threshold = config.healthcheck.block_age_limit();

    let mut monitors: Vec<Arc<dyn Monitor>> = Vec::new();

    if let Some(url) = config.geth.base_url.as_deref() {
        let client = UpstreamClient::new(http.clone(), "geth", url)?;
        monitors.push(Arc::new(ExecutionMonitor::new(ExecutionClient::Geth, client, threshold)));
    }

    if let Some(url) = config.lighthouse.base_url.as_deref() {
        let client = UpstreamClient::new(http.clone(), "lighthouse", url)?;
        monitors.push(Arc::new(LighthouseMonitor::new(client, threshold)));
    }

    if let Some(url) = config.op_node.base_url.as_deref() {
        let client = UpstreamClient::new(http.clone(), "op-node", url)?;
        monitors.push(Arc::new(OpNodeMonitor::new(
            client,
            config.op_node.confirmation_distance,
            threshold,
        )));
    }

    if let Some(url) = config.reth.base_url.as_deref() {
        let client = UpstreamClient::new(http.clone(), "reth", url)?;
        monitors.push(Arc::new(ExecutionMonitor::new(ExecutionClient::Reth, client, threshold)));
    }

    for monitor in &monitors {
        tracing::info!(source = monitor.source(), "Healthcheck enabled");
    }

    Ok(monitors)
}
