//! node-healthchecker
//!
//! Aggregates complex health-checks of a blockchain node into a simple
//! HTTP endpoint.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!    GET /            │              NODE HEALTHCHECKER              │
//!   ──────────────────┼─▶ http ─▶ HealthService ─▶ cool-off cache   │
//!                     │                                  │           │
//!                     │                                  ▼           │
//!                     │                             Aggregator ──────┼──▶ geth
//!                     │                          (one task per       ├──▶ lighthouse
//!                     │                           monitor, timeout)  ├──▶ op-node
//!                     │                                  │           ├──▶ reth
//!                     │                                  ▼           │
//!   ◀─────────────────┼── status + numbered body ◀─ status mapper   │
//!                     │          flip tracker + metrics ─▶ /metrics  │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;

use node_healthchecker::config::{
    load_config, validate_config, ConfigError, HealthcheckerConfig, LogMode,
};
use node_healthchecker::lifecycle::{wait_for_signal, Shutdown};
use node_healthchecker::observability::init_logging;
use node_healthchecker::HttpServer;

#[derive(Parser)]
#[command(name = "node-healthchecker", version)]
#[command(about = "Aggregates complex health-checks of a blockchain node into a simple http endpoint", long_about = None)]
struct Cli {
    /// TOML config file; flags and env vars override its values
    #[arg(long, global = true, env = "NODE_HEALTHCHECKER_CONFIG")]
    config: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Logging mode (dev, prod)
    #[arg(long, global = true, env = "LOG_MODE")]
    log_mode: Option<LogMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run node-healthchecker server
    Serve(ServeArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Report unhealthy when the latest block is older than this duration (0s disables)
    #[arg(long, env = "NODE_HEALTHCHECKER_HEALTHCHECK_BLOCK_AGE_THRESHOLD", value_parser = humantime::parse_duration)]
    healthcheck_block_age_threshold: Option<Duration>,

    /// Re-use healthcheck results for this duration (0s disables)
    #[arg(long, env = "NODE_HEALTHCHECKER_HEALTHCHECK_CACHE_COOL_OFF", value_parser = humantime::parse_duration)]
    healthcheck_cache_cool_off: Option<Duration>,

    /// Maximum duration of a single healthcheck
    #[arg(long, env = "NODE_HEALTHCHECKER_HEALTHCHECK_TIMEOUT", value_parser = humantime::parse_duration)]
    healthcheck_timeout: Option<Duration>,

    /// Base url of geth's HTTP-RPC endpoint
    #[arg(long, env = "NODE_HEALTHCHECKER_HEALTHCHECK_GETH_BASE_URL")]
    healthcheck_geth_base_url: Option<String>,

    /// Base url of lighthouse's HTTP-API endpoint
    #[arg(long, env = "NODE_HEALTHCHECKER_HEALTHCHECK_LIGHTHOUSE_BASE_URL")]
    healthcheck_lighthouse_base_url: Option<String>,

    /// Base url of op-node's RPC endpoint
    #[arg(long, env = "NODE_HEALTHCHECKER_HEALTHCHECK_OP_NODE_BASE_URL")]
    healthcheck_op_node_base_url: Option<String>,

    /// Number of l1 blocks op-node keeps from the l1 head before deriving l2 data
    #[arg(long, env = "NODE_HEALTHCHECKER_HEALTHCHECK_OP_NODE_CONF_DISTANCE")]
    healthcheck_op_node_conf_distance: Option<u64>,

    /// Base url of reth's HTTP-RPC endpoint
    #[arg(long, env = "NODE_HEALTHCHECKER_HEALTHCHECK_RETH_BASE_URL")]
    healthcheck_reth_base_url: Option<String>,

    /// HTTP status to report on good healthchecks
    #[arg(long, env = "NODE_HEALTHCHECKER_HTTP_STATUS_OK")]
    http_status_ok: Option<u16>,

    /// HTTP status to report on healthchecks with warnings
    #[arg(long, env = "NODE_HEALTHCHECKER_HTTP_STATUS_WARNING")]
    http_status_warning: Option<u16>,

    /// HTTP status to report on healthchecks with errors
    #[arg(long, env = "NODE_HEALTHCHECKER_HTTP_STATUS_ERROR")]
    http_status_error: Option<u16>,

    /// host:port for the server to listen on
    #[arg(long, env = "NODE_HEALTHCHECKER_SERVER_LISTEN_ADDRESS")]
    server_listen_address: Option<String>,
}

impl ServeArgs {
    fn apply(self, config: &mut HealthcheckerConfig) {
        let hc = &mut config.healthcheck;
        override_with(&mut hc.block_age_threshold, self.healthcheck_block_age_threshold);
        override_with(&mut hc.cache_cool_off, self.healthcheck_cache_cool_off);
        override_with(&mut hc.timeout, self.healthcheck_timeout);

        if self.healthcheck_geth_base_url.is_some() {
            config.geth.base_url = self.healthcheck_geth_base_url;
        }
        if self.healthcheck_lighthouse_base_url.is_some() {
            config.lighthouse.base_url = self.healthcheck_lighthouse_base_url;
        }
        if self.healthcheck_op_node_base_url.is_some() {
            config.op_node.base_url = self.healthcheck_op_node_base_url;
        }
        if self.healthcheck_reth_base_url.is_some() {
            config.reth.base_url = self.healthcheck_reth_base_url;
        }
        override_with(
            &mut config.op_node.confirmation_distance,
            self.healthcheck_op_node_conf_distance,
        );

        override_with(&mut config.http_status.ok, self.http_status_ok);
        override_with(&mut config.http_status.warning, self.http_status_warning);
        override_with(&mut config.http_status.error, self.http_status_error);

        override_with(&mut config.server.listen_address, self.server_listen_address);
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn resolve_config(cli: Cli) -> Result<(HealthcheckerConfig, Commands), ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HealthcheckerConfig::default(),
    };

    override_with(&mut config.log.level, cli.log_level);
    override_with(&mut config.log.mode, cli.log_mode);

    Ok((config, cli.command))
}

async fn serve(config: HealthcheckerConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        listen_address = %config.server.listen_address,
        timeout = ?config.healthcheck.timeout,
        cache_cool_off = ?config.healthcheck.cache_cool_off,
        block_age_threshold = ?config.healthcheck.block_age_threshold,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.server.listen_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (mut config, command) = resolve_config(cli)?;
    let Commands::Serve(args) = command;
    args.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    if let Err(e) = init_logging(&config.log) {
        eprintln!("failed to configure the logging: {}", e);
        return Err(e.into());
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "node-healthchecker starting");

    if let Err(e) = serve(config).await {
        tracing::error!(error = %e, "Failed with error");
        return Err(e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
