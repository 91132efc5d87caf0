//! Concurrent fan-out over all configured monitors.
//!
//! # Responsibilities
//! - Run every monitor in its own task, bounded by the per-check timeout
//! - Turn timeouts and panics into failure results for the right source
//! - Always drain every task: one result per monitor, never fewer
//!
//! # Design Decisions
//! - No short-circuit on the first failure; the report lists every
//!   unhealthy upstream
//! - Tasks live in a `JoinSet`, so dropping an evaluation (client went
//!   away) aborts every in-flight check
//! - Results come back in completion order

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};

use crate::health::check::{CheckError, CheckResult, Monitor};

/// Errors constructing an [`Aggregator`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("per-check timeout must be greater than zero")]
    ZeroTimeout,
}

/// Runs all monitors of one evaluation cycle.
pub struct Aggregator {
    monitors: Vec<Arc<dyn Monitor>>,
    timeout: Duration,
}

impl Aggregator {
    /// Create an aggregator. A zero timeout is rejected instead of producing
    /// checks that expire instantly.
    pub fn new(monitors: Vec<Arc<dyn Monitor>>, timeout: Duration) -> Result<Self, AggregatorError> {
        if timeout.is_zero() {
            return Err(AggregatorError::ZeroTimeout);
        }
        Ok(Self { monitors, timeout })
    }

    /// Run every monitor concurrently and collect exactly one result per
    /// monitor, in completion order.
    pub async fn evaluate(&self) -> Vec<CheckResult> {
        let mut tasks = JoinSet::new();
        let mut sources = HashMap::with_capacity(self.monitors.len());
        for monitor in &self.monitors {
            let source = monitor.source().to_string();
            let handle = tasks.spawn(run_check(Arc::clone(monitor), source.clone(), self.timeout));
            sources.insert(handle.id(), source);
        }

        let mut results = Vec::with_capacity(self.monitors.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, result)) => results.push(result),
                Err(e) => {
                    let source = sources.remove(&e.id()).unwrap_or_else(|| "unknown".to_string());
                    results.push(task_failure(source, e));
                }
            }
        }

        debug_assert_eq!(results.len(), self.monitors.len());
        results
    }
}

async fn run_check(monitor: Arc<dyn Monitor>, source: String, timeout: Duration) -> CheckResult {
    // `check()` itself may panic before returning a future.
    let check = AssertUnwindSafe(async move { monitor.check().await }).catch_unwind();

    match tokio::time::timeout(timeout, check).await {
        Ok(Ok(result)) => {
            tracing::debug!(
                source = %result.source,
                ok = result.ok,
                error = ?result.err,
                "Healthcheck finished"
            );
            result
        }
        Ok(Err(panic)) => {
            let reason = panic_message(panic.as_ref());
            tracing::error!(source = %source, reason = %reason, "Healthcheck panicked");
            CheckResult::failure(source, CheckError::Panicked(reason))
        }
        Err(_) => {
            tracing::debug!(source = %source, timeout = ?timeout, "Healthcheck timed out");
            CheckResult::failure(source, CheckError::Timeout(timeout))
        }
    }
}

/// Failure result for a task that did not return one.
fn task_failure(source: String, error: JoinError) -> CheckResult {
    if error.is_panic() {
        let reason = panic_message(error.into_panic().as_ref());
        tracing::error!(source = %source, reason = %reason, "Healthcheck task panicked");
        CheckResult::failure(source, CheckError::Panicked(reason))
    } else {
        tracing::error!(source = %source, error = %error, "Healthcheck task was cancelled");
        CheckResult::failure(source, CheckError::Cancelled)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
