//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! health core and http layer produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (per-source counters and gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON in prod)
//!     → /metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the access log and handler spans
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LoggingError};
pub use metrics::{init_metrics, HealthMetrics, PrometheusMetrics};
