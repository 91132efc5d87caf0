//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout, panic isolation)
//!     → request.rs (request ID, span, access log)
//!     → health handler → HealthService::report
//!     → response.rs (numbered body, status, cache header)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{render_body, X_HEALTHCHECK_CACHE};
pub use server::{AppState, HttpServer, ServerError};
