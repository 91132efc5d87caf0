//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the health service from config (monitors, aggregator, cache,
//!   status mapper, metrics)
//! - Create the Axum router with the health and metrics handlers
//! - Wire up middleware (request context, timeout, panic isolation)
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};

use crate::blockchain::{build_monitors, BlockchainError};
use crate::config::HealthcheckerConfig;
use crate::health::{Aggregator, AggregatorError, CoolOffCache, HealthService, Report, StatusMapper};
use crate::http::request::request_context;
use crate::observability::{init_metrics, PrometheusMetrics};

/// Errors that prevent the server from being built.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error(transparent)]
    Aggregator(#[from] AggregatorError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<HealthService>,
    pub metrics: Option<PrometheusHandle>,
}

/// HTTP server for the healthchecker.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: HealthcheckerConfig) -> Result<Self, ServerError> {
        let monitors = build_monitors(&config)?;
        if monitors.is_empty() {
            tracing::warn!("No upstreams configured, every healthcheck will report ok");
        }

        let aggregator = Aggregator::new(monitors, config.healthcheck.timeout)?;
        let cache = CoolOffCache::new(config.healthcheck.cache_cool_off);
        let service = HealthService::new(
            aggregator,
            cache,
            StatusMapper::from(config.http_status),
            Arc::new(PrometheusMetrics),
        );

        let state = AppState {
            service: Arc::new(service),
            metrics: init_metrics(),
        };

        Ok(Self::with_state(&config, state))
    }

    /// Create a server around an already assembled state.
    pub fn with_state(config: &HealthcheckerConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &HealthcheckerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(CatchPanicLayer::new())
            .layer(middleware::from_fn(request_context))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Run (or reuse) one evaluation cycle and report it.
async fn health_handler(State(state): State<AppState>) -> Report {
    state.service.report().await
}

/// Prometheus scrape endpoint.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics are not available").into_response(),
    }
}
