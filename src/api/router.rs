use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request},
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info_span, warn, Span};

use super::health;
use super::middleware::{
    logging_middleware, metrics_middleware, route_path, security_headers_middleware,
};
use super::state::AppState;
use super::users;
use crate::config::ServerConfig;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
pub fn create_router(
    state: AppState,
    server: &ServerConfig,
    metrics: Option<PrometheusMetrics>,
    metrics_path: &str,
) -> Router {
    let mut router = Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Account API
        .nest("/api/v1/user", users::create_user_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(cors_layer(&server.cors_allowed_origins))
        .layer(TraceLayer::new_for_http().make_span_with(request_span));

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m, metrics_path));
    }

    router
}

/// Request span keyed by route pattern; the URI would expose reset tokens
fn request_span(request: &Request<Body>) -> Span {
    info_span!(
        "request",
        method = %request.method(),
        route = %route_path(request),
        version = ?request.version(),
    )
}

/// Credentialed CORS for the configured origins, or a permissive policy when none are set
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::infrastructure::auth::{CookieConfig, JwtConfig, JwtService, SessionIssuer};
    use crate::infrastructure::logging::capture::CapturedLogs;
    use crate::infrastructure::mail::LogMailer;
    use crate::infrastructure::media::InMemoryMediaStore;
    use crate::infrastructure::user::{
        AccountService, AccountSettings, Argon2Hasher, InMemoryUserRepository,
    };

    fn state() -> AppState {
        let sessions = SessionIssuer::new(
            Arc::new(JwtService::new(JwtConfig::new("router-secret", 24))),
            CookieConfig::default(),
        );
        let service = AccountService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryMediaStore::new()),
            Arc::new(LogMailer::new()),
            Arc::new(Argon2Hasher::with_params(64, 1, 1).unwrap()),
            sessions,
            AccountSettings::default(),
        );
        AppState::new(Arc::new(service))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let router = create_router(state(), &ServerConfig::default(), None, "/metrics");

        let health = router.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(
            health.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );

        let ready = router.clone().oneshot(get("/ready")).await.unwrap();
        assert_eq!(ready.status(), StatusCode::OK);

        let live = router.oneshot(get("/live")).await.unwrap();
        assert_eq!(live.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_account_routes_are_nested() {
        let router = create_router(state(), &ServerConfig::default(), None, "/metrics");

        let response = router.oneshot(get("/api/v1/user/logout")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let router = create_router(state(), &ServerConfig::default(), None, "/metrics");

        let response = router.oneshot(get("/api/v1/unknown")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reset_token_stays_out_of_logs() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();
        let router = create_router(state(), &ServerConfig::default(), None, "/metrics");
        let token = "deadbeefcafebabe0123456789abcdef01234567";
        let request = Request::builder()
            .method("PUT")
            .uri(format!("/api/v1/user/password/reset/{}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"password":"Secret123","confirmPassword":"Secret123"}"#,
            ))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let output = logs.contents();
        assert!(output.contains("/api/v1/user/password/reset/{token}"));
        assert!(!output.contains(token));
    }

    #[tokio::test]
    async fn test_configured_origins_allow_credentials() {
        let server = ServerConfig {
            cors_allowed_origins: vec!["https://dash.example.com".to_string()],
            ..Default::default()
        };
        let router = create_router(state(), &server, None, "/metrics");
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://dash.example.com")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://dash.example.com"
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }
}
