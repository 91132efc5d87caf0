//! Request context: request ID and access logging.
//!
//! # Responsibilities
//! - Assign a request ID (UUID v4) unless the caller sent one
//! - Run the rest of the stack inside a span carrying that ID
//! - Echo the ID back in `x-request-id`
//! - Emit one access log line per request
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Access log is written after the response is built, so it carries the
//!   final status (including timeouts and caught panics from inner layers)

use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// `axum::middleware::from_fn` handler that sets up the request context.
pub async fn request_context(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let user_agent = request
        .headers()
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let span = tracing::info_span!("http_request", request_id = %request_id);
    let mut response = next.run(request).instrument(span.clone()).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }

    span.in_scope(|| {
        tracing::info!(
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            user_agent = %user_agent,
            "{} {} {}",
            method,
            path,
            response.status().as_u16()
        );
    });

    response
}
