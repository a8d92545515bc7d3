//! API middleware components

pub mod logging;
pub mod metrics;
pub mod security;
pub mod user_auth;

pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
pub use security::security_headers_middleware;
pub use user_auth::RequireUser;

use axum::{extract::MatchedPath, http::Request};

const UNMATCHED_ROUTE: &str = "unmatched";

/// Route pattern of a request (`/password/reset/{token}`), or `unmatched`.
/// The concrete path is never used, so path parameters stay out of logs and labels.
pub(crate) fn route_path<B>(request: &Request<B>) -> &str {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or(UNMATCHED_ROUTE)
}
