//! Health report rendering.
//!
//! # Body Format
//! ```text
//! 0: error: geth: still syncing (current: 16, highest: 32)
//! 1: error: op-node: healthcheck timed out after 1s
//! 2: warning: lighthouse: is in 'BackFillSyncing' state (completed: 10, remaining: 90)
//! ```
//! Errors first, then warnings, one index sequence across both groups. A
//! healthy report has an empty body.

use std::fmt::Write as _;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::health::{Outcome, Report, Verdict};

/// Tells whether the report was reused from the cool-off window.
pub const X_HEALTHCHECK_CACHE: &str = "x-healthcheck-cache";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Render the numbered error and warning lines.
pub fn render_body(outcome: &Outcome) -> String {
    let mut body = String::new();
    let lines = outcome
        .errors
        .iter()
        .map(|msg| ("error", msg))
        .chain(outcome.warnings.iter().map(|msg| ("warning", msg)));

    for (idx, (kind, msg)) in lines.enumerate() {
        let _ = writeln!(body, "{}: {}: {}", idx, kind, msg);
    }
    body
}

impl IntoResponse for Report {
    fn into_response(self) -> Response {
        let verdict = self.verdict();
        match verdict {
            Verdict::Error => tracing::warn!(
                verdict = verdict.as_str(),
                status = self.status,
                errors = %self.outcome.errors.join("; "),
                warnings = %self.outcome.warnings.join("; "),
                "Healthcheck encountered errors"
            ),
            Verdict::Warning => tracing::warn!(
                verdict = verdict.as_str(),
                status = self.status,
                warnings = %self.outcome.warnings.join("; "),
                "Healthcheck encountered warnings"
            ),
            Verdict::Ok => tracing::debug!(
                verdict = verdict.as_str(),
                status = self.status,
                cached = self.served_from_cache,
                "Healthcheck ok"
            ),
        }

        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = render_body(&self.outcome);
        let cache = if self.served_from_cache { "hit" } else { "miss" };

        let mut response = Response::new(Body::from(body.clone()));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        headers.insert(X_HEALTHCHECK_CACHE, HeaderValue::from_static(cache));
        if !body.is_empty() {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
        }
        response
    }
}
