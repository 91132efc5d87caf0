//! Node healthchecker library.
//!
//! Aggregates the sync-status checks of blockchain clients (geth, reth,
//! lighthouse, op-node) into one HTTP endpoint for load balancers and
//! orchestrators.

pub mod blockchain;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::HealthcheckerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
