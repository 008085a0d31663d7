//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, filter chain, route dispatch)
//!     → handlers.rs (login/logout/root/health controllers)
//!     → middleware.rs (auth gate, idle-timeout enforcement)
//!     → proxy (requests under the protected prefix)
//! ```

pub mod handlers;
pub mod middleware;
pub mod server;
pub mod templates;

pub use server::HttpServer;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// A 302 Found redirect. Axum's `Redirect` issues 303/307; the login flow
/// uses plain 302 everywhere.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
