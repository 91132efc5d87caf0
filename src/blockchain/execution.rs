//! Execution client checks (geth, reth).
//!
//! # Checks
//! - `eth_syncing` must report not-syncing
//! - when a block age threshold is set, the `latest` block must be recent
//!
//! Both clients speak the same JSON-RPC dialect; reth additionally reports
//! per-stage progress while syncing, which ends up in the message.

use std::fmt::Write as _;
use std::time::Duration;

use alloy::primitives::U64;
use alloy::rpc::types::{SyncInfo, SyncStatus};
use futures_util::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;

use crate::blockchain::client::UpstreamClient;
use crate::blockchain::types::{check_block_age, Finding};
use crate::health::{CheckError, CheckResult, Monitor};

/// Which execution client is behind the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionClient {
    Geth,
    Reth,
}

impl ExecutionClient {
    pub fn source(&self) -> &'static str {
        match self {
            ExecutionClient::Geth => "geth",
            ExecutionClient::Reth => "reth",
        }
    }
}

/// Reply to `eth_syncing`. Some nodes answer a bare `true` while syncing
/// before they can report progress.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SyncingReply {
    Flag(bool),
    Status(SyncStatus),
}

/// The bits of `eth_getBlockByNumber` we care about.
#[derive(Debug, Deserialize)]
struct LatestBlock {
    timestamp: U64,
}

/// Healthcheck for an execution client.
pub struct ExecutionMonitor {
    kind: ExecutionClient,
    client: UpstreamClient,
    block_age_threshold: Option<Duration>,
}

impl ExecutionMonitor {
    pub fn new(kind: ExecutionClient, client: UpstreamClient, block_age_threshold: Option<Duration>) -> Self {
        Self {
            kind,
            client,
            block_age_threshold,
        }
    }

    async fn inspect(&self) -> Finding {
        let reply: SyncingReply = self.client.rpc_call("eth_syncing", json!([])).await?;
        classify_syncing_reply(&reply)?;

        if let Some(threshold) = self.block_age_threshold {
            let block: LatestBlock = self
                .client
                .rpc_call("eth_getBlockByNumber", json!(["latest", false]))
                .await?;
            let timestamp = block.timestamp.to::<u64>();
            check_block_age(
                format!("latest block's timestamp '{}'", timestamp),
                timestamp,
                threshold,
            )?;
        }

        Ok(None)
    }
}

impl Monitor for ExecutionMonitor {
    fn source(&self) -> &str {
        self.kind.source()
    }

    fn check(&self) -> BoxFuture<'_, CheckResult> {
        Box::pin(async move { CheckResult::from_finding(self.source(), self.inspect().await) })
    }
}

/// Any syncing state is a failure.
fn classify_syncing_reply(reply: &SyncingReply) -> Result<(), CheckError> {
    match reply {
        SyncingReply::Flag(false) | SyncingReply::Status(SyncStatus::None) => Ok(()),
        SyncingReply::Flag(true) => Err(CheckError::Syncing("still syncing".into())),
        SyncingReply::Status(SyncStatus::Info(info)) => Err(CheckError::Syncing(describe_sync(info))),
    }
}

fn describe_sync(info: &SyncInfo) -> String {
    let mut message = format!(
        "still syncing (current: {}, highest: {})",
        info.current_block, info.highest_block
    );

    if let Some(stages) = info.stages.as_ref().filter(|s| !s.is_empty()) {
        let stages: Vec<String> = stages
            .iter()
            .enumerate()
            .map(|(idx, stage)| format!("{}({})={}", stage.name, idx, stage.block))
            .collect();
        let _ = write!(message, ": {}", stages.join(", "));
    }

    message
}
