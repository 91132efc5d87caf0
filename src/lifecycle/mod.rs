//! Process lifecycle.
//!
//! # Data Flow
//! ```text
//! SIGINT / SIGTERM (signals.rs)
//!     → Shutdown::trigger (shutdown.rs)
//!     → HTTP server stops accepting, drains in-flight requests
//!     → main returns
//! ```
//!
//! # Design Decisions
//! - Upstreams are fixed at startup, so there is no reload signal
//! - A second signal is not special-cased; the drain is bounded by the
//!   request timeout anyway

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
