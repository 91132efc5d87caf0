//! Optimism rollup node check.
//!
//! # Checks
//! - `optimism_syncStatus`: the derivation L1 block must not trail the L1
//!   head by more than the confirmation distance
//! - being ahead of the L1 head by exactly one block is normal (the head
//!   is refreshed lazily); further ahead is reported as a warning
//! - when a block age threshold is set, the unsafe L2 head must be recent

use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;

use crate::blockchain::client::UpstreamClient;
use crate::blockchain::types::{check_block_age, Finding};
use crate::health::{CheckError, CheckResult, Monitor};

const SOURCE: &str = "op-node";

/// Snapshot of the op-node driver. Unset or missing refs are zeroed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyncStatus {
    /// L1 block the derivation process last idled at.
    pub current_l1: BlockRef,
    /// Perceived head of the L1 chain, no confirmation distance.
    pub head_l1: BlockRef,
    /// Absolute tip of the L2 chain.
    pub unsafe_l2: BlockRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlockRef {
    pub hash: String,
    pub number: u64,
    pub timestamp: u64,
}

/// Healthcheck for an op-node.
pub struct OpNodeMonitor {
    client: UpstreamClient,
    confirmation_distance: u64,
    block_age_threshold: Option<Duration>,
}

impl OpNodeMonitor {
    pub fn new(client: UpstreamClient, confirmation_distance: u64, block_age_threshold: Option<Duration>) -> Self {
        Self {
            client,
            confirmation_distance,
            block_age_threshold,
        }
    }

    async fn inspect(&self) -> Finding {
        let status: SyncStatus = self.client.rpc_call("optimism_syncStatus", json!([])).await?;
        classify(&status, self.confirmation_distance, self.block_age_threshold)
    }
}

impl Monitor for OpNodeMonitor {
    fn source(&self) -> &str {
        SOURCE
    }

    fn check(&self) -> BoxFuture<'_, CheckResult> {
        Box::pin(async move { CheckResult::from_finding(SOURCE, self.inspect().await) })
    }
}

fn classify(status: &SyncStatus, confirmation_distance: u64, block_age_threshold: Option<Duration>) -> Finding {
    let current = &status.current_l1;
    let head = &status.head_l1;

    if current.number > head.number {
        let dist = current.number - head.number;
        if dist == 1 {
            return Ok(None);
        }
        return Ok(Some(CheckError::Syncing(format!(
            "current l1 block (number: {}, hash: {}) is greater than head (number: {}, hash: {}) by {}",
            current.number, current.hash, head.number, head.hash, dist
        ))));
    }

    let dist = head.number - current.number;
    if dist > confirmation_distance {
        return Err(CheckError::Syncing(format!(
            "current l1 block (number: {}, hash: {}) is behind the l1 head (number: {}, hash: {}) for more than confirmation distance: {} > {}",
            current.number, current.hash, head.number, head.hash, dist, confirmation_distance
        )));
    }

    if let Some(threshold) = block_age_threshold {
        check_block_age(
            format!("latest l2 unsafe timestamp {}", status.unsafe_l2.timestamp),
            status.unsafe_l2.timestamp,
            threshold,
        )?;
    }

    Ok(None)
}
