//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeout > 0, status codes in range)
//! - Check that upstream URLs and the listen address parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HealthcheckerConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::HealthcheckerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {upstream} base url '{url}': {reason}")]
    InvalidBaseUrl {
        upstream: &'static str,
        url: String,
        reason: String,
    },

    #[error("healthcheck timeout must be greater than zero")]
    ZeroTimeout,

    #[error("invalid http status for '{verdict}': {code}")]
    InvalidHttpStatus { verdict: &'static str, code: u16 },

    #[error("invalid listen address '{0}'")]
    InvalidListenAddress(String),

    #[error("invalid log level '{0}'")]
    InvalidLogLevel(String),
}

/// Check the configuration for semantic errors.
pub fn validate_config(config: &HealthcheckerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let upstreams = [
        ("geth", config.geth.base_url.as_deref()),
        ("reth", config.reth.base_url.as_deref()),
        ("lighthouse", config.lighthouse.base_url.as_deref()),
        ("op-node", config.op_node.base_url.as_deref()),
    ];
    for (upstream, base_url) in upstreams {
        if let Some(url) = base_url {
            if let Err(reason) = check_base_url(url) {
                errors.push(ValidationError::InvalidBaseUrl {
                    upstream,
                    url: url.to_string(),
                    reason,
                });
            }
        }
    }

    if config.healthcheck.timeout.is_zero() {
        errors.push(ValidationError::ZeroTimeout);
    }

    let statuses = [
        ("ok", config.http_status.ok),
        ("warning", config.http_status.warning),
        ("error", config.http_status.error),
    ];
    for (verdict, code) in statuses {
        if !(100..=599).contains(&code) {
            errors.push(ValidationError::InvalidHttpStatus { verdict, code });
        }
    }

    if config.server.listen_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidListenAddress(
            config.server.listen_address.clone(),
        ));
    }

    if EnvFilter::try_new(&config.log.level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.log.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(raw: &str) -> Result<(), String> {
    let url = url::Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}
