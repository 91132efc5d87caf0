//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI flags / env vars override individual values (main.rs)
//!     → validation.rs (semantic checks)
//!     → HealthcheckerConfig (validated, immutable)
//!     → handed by value to the server and the upstream monitors
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; upstreams are fixed at startup
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    HealthcheckConfig, HealthcheckerConfig, HttpStatusConfig, LogConfig, LogMode, OpNodeConfig,
    ServerConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
