//! Health aggregation core.
//!
//! # Data Flow
//! ```text
//! GET / (http layer)
//!     → service.rs (one evaluation cycle)
//!         → cache.rs (reuse outcome inside the cool-off window)
//!         → aggregator.rs (fan out to every Monitor, bounded by timeout)
//!         → state.rs (per-source flip detection) + metrics
//!         → status.rs (errors/warnings → HTTP status)
//! ```
//!
//! # Design Decisions
//! - Every failure is data: monitors return `CheckResult`, timeouts and
//!   panics are converted by the aggregator
//! - Exactly one result per monitor per cycle
//! - Shared state (cache entry, flip map) is owned by the service instance,
//!   each behind its own lock

pub mod aggregator;
pub mod cache;
pub mod check;
pub mod service;
pub mod state;
pub mod status;

pub use aggregator::{Aggregator, AggregatorError};
pub use cache::CoolOffCache;
pub use check::{CheckError, CheckResult, CheckStatus, Monitor};
pub use service::{HealthService, Report};
pub use state::FlipTracker;
pub use status::{Outcome, StatusMapper, Verdict};
