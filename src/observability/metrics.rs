//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define healthcheck metrics (ok/nok counts, flips, up gauge)
//! - Install the Prometheus recorder and render the scrape payload
//!
//! # Metrics
//! - `node_healthchecker_healthcheck_ok_count` (counter): successful checks by source
//! - `node_healthchecker_healthcheck_nok_count` (counter): unsuccessful checks by source
//! - `node_healthchecker_healthcheck_flip_count` (counter): ok ↔ nok transitions by source
//! - `node_healthchecker_healthcheck_up` (gauge): 1=healthy, 0=unhealthy, by source
//!
//! # Design Decisions
//! - Recording goes through the `HealthMetrics` trait, handed to the server,
//!   so the health core never touches the global recorder directly
//! - The recorder is installed at most once per process

use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

const OK_COUNT: &str = "node_healthchecker_healthcheck_ok_count";
const NOK_COUNT: &str = "node_healthchecker_healthcheck_nok_count";
const FLIP_COUNT: &str = "node_healthchecker_healthcheck_flip_count";
const UP: &str = "node_healthchecker_healthcheck_up";

static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Sink for per-source healthcheck metrics.
pub trait HealthMetrics: Send + Sync {
    /// One check finished for `source`.
    fn record_check(&self, source: &str, ok: bool);

    /// The health of `source` changed since the previous check.
    fn record_flip(&self, source: &str);
}

/// Records into the process-wide `metrics` recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusMetrics;

impl HealthMetrics for PrometheusMetrics {
    fn record_check(&self, source: &str, ok: bool) {
        let name = if ok { OK_COUNT } else { NOK_COUNT };
        metrics::counter!(name, "source" => source.to_string()).increment(1);
        metrics::gauge!(UP, "source" => source.to_string()).set(if ok { 1.0 } else { 0.0 });
    }

    fn record_flip(&self, source: &str) {
        metrics::counter!(FLIP_COUNT, "source" => source.to_string()).increment(1);
    }
}

/// Install the Prometheus recorder (once) and return the handle used to
/// render `/metrics`. Returns `None` if another recorder was installed first.
pub fn init_metrics() -> Option<PrometheusHandle> {
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                describe_metrics();
                Some(handle)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Prometheus recorder");
                None
            }
        })
        .clone()
}

fn describe_metrics() {
    metrics::describe_counter!(OK_COUNT, "count of successful healthchecks");
    metrics::describe_counter!(NOK_COUNT, "count of unsuccessful healthchecks");
    metrics::describe_counter!(
        FLIP_COUNT,
        "count healthchecks that changed from ok to nok and vice versa"
    );
    metrics::describe_gauge!(UP, "healthcheck status");
}
