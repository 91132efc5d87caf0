//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::HealthcheckerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<HealthcheckerConfig, ConfigError> {
    let config: HealthcheckerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<HealthcheckerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogMode;
    use std::time::Duration;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [log]
            level = "debug"
            mode = "dev"

            [server]
            listen_address = "127.0.0.1:9000"

            [http_status]
            warning = 200

            [healthcheck]
            timeout = "2500ms"
            cache_cool_off = "0s"
            block_age_threshold = "1m"

            [geth]
            base_url = "http://127.0.0.1:8545"

            [op_node]
            base_url = "http://127.0.0.1:9545"
            confirmation_distance = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.log.mode, LogMode::Dev);
        assert_eq!(config.server.listen_address, "127.0.0.1:9000");
        assert_eq!(config.http_status.ok, 200);
        assert_eq!(config.http_status.warning, 200);
        assert_eq!(config.http_status.error, 500);
        assert_eq!(config.healthcheck.timeout, Duration::from_millis(2500));
        assert_eq!(config.healthcheck.cache_cool_off, Duration::ZERO);
        assert_eq!(config.healthcheck.block_age_limit(), Some(Duration::from_secs(60)));
        assert_eq!(config.geth.base_url.as_deref(), Some("http://127.0.0.1:8545"));
        assert!(config.lighthouse.base_url.is_none());
        assert_eq!(config.op_node.confirmation_distance, 4);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.healthcheck.timeout, Duration::from_secs(1));
        assert_eq!(config.healthcheck.cache_cool_off, Duration::from_millis(750));
        assert!(config.healthcheck.block_age_limit().is_none());
    }

    #[test]
    fn test_validation_failure_is_reported() {
        let err = parse_config("[healthcheck]\ntimeout = \"0s\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("timeout must be greater than zero"));
    }

    #[test]
    fn test_unparseable_duration() {
        let err = parse_config("[healthcheck]\ntimeout = \"soon\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("does-not-exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
