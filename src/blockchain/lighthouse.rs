//! Lighthouse consensus client check.
//!
//! # Checks
//! - `GET lighthouse/syncing` must report `Synced`; `BackFillSyncing` is
//!   tolerated with a warning, since that is where the node lands right
//!   after a checkpoint sync
//! - when a block age threshold is set, the execution payload of the beacon
//!   head must be recent

use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::Deserialize;

use crate::blockchain::client::UpstreamClient;
use crate::blockchain::types::{check_block_age, Finding};
use crate::health::{CheckError, CheckResult, Monitor};

const SOURCE: &str = "lighthouse";

#[derive(Debug, Deserialize)]
struct Data<T> {
    data: T,
}

/// Sync state as reported by `lighthouse/syncing`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum SyncState {
    /// Up to date with all known peers.
    Synced,
    /// No useful peers are connected.
    Stalled,
    /// Finished a finalized chain, choosing what to sync next.
    SyncTransition,
    /// Downloading historical blocks behind a trusted checkpoint.
    BackFillSyncing { completed: u64, remaining: u64 },
    /// Long-range sync over a finalized chain.
    SyncingFinalized { start_slot: String, target_slot: String },
    /// Long-range sync over one or many head chains.
    SyncingHead { start_slot: String, target_slot: String },
}

impl SyncState {
    /// States that are not synced but still acceptable.
    pub fn is_tolerated(&self) -> bool {
        matches!(self, SyncState::BackFillSyncing { .. })
    }

    fn describe(&self) -> String {
        match self {
            SyncState::Synced | SyncState::Stalled | SyncState::SyncTransition => {
                format!("is not in synced state: {:?}", self)
            }
            SyncState::BackFillSyncing { completed, remaining } => format!(
                "is in 'BackFillSyncing' state (completed: {}, remaining: {})",
                completed, remaining
            ),
            SyncState::SyncingFinalized {
                start_slot,
                target_slot,
            } => format!(
                "is in 'SyncingFinalized' state (start_slot: '{}', target_slot: '{}')",
                start_slot, target_slot
            ),
            SyncState::SyncingHead {
                start_slot,
                target_slot,
            } => format!(
                "is in 'SyncingHead' state (start_slot: '{}', target_slot: '{}')",
                start_slot, target_slot
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BeaconBlock {
    message: BeaconBlockMessage,
}

#[derive(Debug, Deserialize)]
struct BeaconBlockMessage {
    slot: String,
    body: BeaconBlockBody,
}

#[derive(Debug, Deserialize)]
struct BeaconBlockBody {
    execution_payload: ExecutionPayload,
}

#[derive(Debug, Deserialize)]
struct ExecutionPayload {
    timestamp: String,
}

/// Healthcheck for a lighthouse beacon node.
pub struct LighthouseMonitor {
    client: UpstreamClient,
    block_age_threshold: Option<Duration>,
}

impl LighthouseMonitor {
    pub fn new(client: UpstreamClient, block_age_threshold: Option<Duration>) -> Self {
        Self {
            client,
            block_age_threshold,
        }
    }

    async fn inspect(&self) -> Finding {
        let state: Data<SyncState> = self.client.get_json("lighthouse/syncing").await?;
        if let Some(warning) = classify_sync_state(&state.data)? {
            return Ok(Some(warning));
        }

        if let Some(threshold) = self.block_age_threshold {
            let head: Data<BeaconBlock> = self.client.get_json("eth/v2/beacon/blocks/head").await?;
            check_head_age(&head.data, threshold)?;
        }

        Ok(None)
    }
}

impl Monitor for LighthouseMonitor {
    fn source(&self) -> &str {
        SOURCE
    }

    fn check(&self) -> BoxFuture<'_, CheckResult> {
        Box::pin(async move { CheckResult::from_finding(SOURCE, self.inspect().await) })
    }
}

fn classify_sync_state(state: &SyncState) -> Finding {
    match state {
        SyncState::Synced => Ok(None),
        tolerated if tolerated.is_tolerated() => Ok(Some(CheckError::Syncing(tolerated.describe()))),
        other => Err(CheckError::Syncing(other.describe())),
    }
}

fn check_head_age(head: &BeaconBlock, threshold: Duration) -> Result<(), CheckError> {
    let payload = &head.message.body.execution_payload;
    let timestamp: u64 = payload.timestamp.parse().map_err(|e| CheckError::Malformed {
        body: payload.timestamp.clone(),
        reason: format!("invalid execution payload timestamp: {}", e),
    })?;

    check_block_age(
        format!(
            "beacon head timestamp '{}' (slot '{}')",
            payload.timestamp, head.message.slot
        ),
        timestamp,
        threshold,
    )
}
