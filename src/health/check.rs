//! Check results and the monitor contract.
//!
//! A [`Monitor`] checks one upstream and reports a [`CheckResult`]. Monitors
//! never fail out-of-band: transport faults, malformed payloads, syncing
//! states and staleness are all returned as data.

use std::time::Duration;

use futures_util::future::BoxFuture;
use thiserror::Error;

/// Why a check failed or warned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// Connection, DNS or protocol failure talking to the upstream.
    #[error("request failed: {0}")]
    Transport(String),

    /// Upstream answered with a non-success HTTP status.
    #[error("unexpected HTTP status '{status}': {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Upstream answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Upstream payload could not be parsed.
    #[error("failed to parse response '{body}': {reason}")]
    Malformed { body: String, reason: String },

    /// Upstream reports that it is not in sync (or is in a tolerated
    /// transitional state, when carried by a warning).
    #[error("{0}")]
    Syncing(String),

    /// Latest observed block is older than the configured threshold.
    #[error("{what} is too old: {age:?} > {threshold:?}")]
    StaleBlock {
        what: String,
        age: Duration,
        threshold: Duration,
    },

    /// The check did not reply within the per-check timeout.
    #[error("healthcheck timed out after {0:?}")]
    Timeout(Duration),

    /// The check panicked.
    #[error("healthcheck panicked: {0}")]
    Panicked(String),

    /// The check task was cancelled before it produced a result.
    #[error("healthcheck task was cancelled")]
    Cancelled,
}

/// Classification of a single result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Healthy,
    Warning,
    Failure,
}

/// Outcome of one monitor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Stable identifier of the upstream (e.g. "geth").
    pub source: String,
    /// `false` is a hard failure regardless of `err`.
    pub ok: bool,
    /// Set on failures; set on `ok` results to signal a warning.
    pub err: Option<CheckError>,
}

impl CheckResult {
    pub fn healthy(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ok: true,
            err: None,
        }
    }

    /// Degraded but acceptable.
    pub fn warning(source: impl Into<String>, err: CheckError) -> Self {
        Self {
            source: source.into(),
            ok: true,
            err: Some(err),
        }
    }

    pub fn failure(source: impl Into<String>, err: CheckError) -> Self {
        Self {
            source: source.into(),
            ok: false,
            err: Some(err),
        }
    }

    /// Build a result from a finding: `Ok(None)` is healthy, `Ok(Some(_))` a
    /// warning and `Err(_)` a failure.
    pub fn from_finding(
        source: impl Into<String>,
        finding: Result<Option<CheckError>, CheckError>,
    ) -> Self {
        match finding {
            Ok(None) => Self::healthy(source),
            Ok(Some(warning)) => Self::warning(source, warning),
            Err(err) => Self::failure(source, err),
        }
    }

    pub fn status(&self) -> CheckStatus {
        match (self.ok, &self.err) {
            (false, _) => CheckStatus::Failure,
            (true, Some(_)) => CheckStatus::Warning,
            (true, None) => CheckStatus::Healthy,
        }
    }

    /// Human-readable line for the report, prefixed with the source.
    pub fn message(&self) -> String {
        match &self.err {
            Some(err) => format!("{}: {}", self.source, err),
            None if self.ok => format!("{}: healthy", self.source),
            None => format!("{}: unhealthy", self.source),
        }
    }
}

/// A healthcheck for one upstream.
///
/// Implementations must label every result with [`Monitor::source`] and must
/// not panic; the aggregator isolates panics anyway, but reports them as
/// failures.
pub trait Monitor: Send + Sync {
    /// Stable identifier of the upstream.
    fn source(&self) -> &str;

    /// Check the upstream once.
    ///
    /// The future may be dropped at any await point when the per-check
    /// timeout expires or the inbound request goes away.
    fn check(&self) -> BoxFuture<'_, CheckResult>;
}
