//! Shared adapter types and error definitions.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::health::CheckError;

/// Errors that can occur while setting up the upstream monitors.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Base URL of an upstream does not parse.
    #[error("invalid {upstream} base url '{url}': {reason}")]
    InvalidBaseUrl {
        upstream: &'static str,
        url: String,
        reason: String,
    },

    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Result type for monitor setup.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// What a check found: `Ok(None)` healthy, `Ok(Some(_))` warning,
/// `Err(_)` failure.
pub type Finding = Result<Option<CheckError>, CheckError>;

/// Fail when a block produced at `timestamp_secs` is older than `threshold`.
pub fn check_block_age(what: String, timestamp_secs: u64, threshold: Duration) -> Result<(), CheckError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let age = now.saturating_sub(Duration::from_secs(timestamp_secs));

    if age > threshold {
        return Err(CheckError::StaleBlock {
            what,
            age: Duration::from_secs(age.as_secs()),
            threshold,
        });
    }
    Ok(())
}
