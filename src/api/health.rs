//! Health, readiness and liveness endpoints

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;
use crate::domain::DomainError;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Outcome of probing one dependency
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: &'static str,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

impl HealthCheck {
    fn from_result(name: &'static str, result: Result<(), DomainError>, started: Instant) -> Self {
        let (status, message) = match result {
            Ok(()) => (HealthStatus::Healthy, None),
            Err(e) => (HealthStatus::Unhealthy, Some(e.message().to_string())),
        };

        Self {
            name,
            status,
            message,
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// GET /health - the process is up
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION"),
        checks: None,
        latency_ms: None,
    })
}

/// GET /ready - the user store answers
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let store = HealthCheck::from_result(
        "user_store",
        state.account_service.check_store().await,
        started,
    );
    let status = store.status;

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        checks: Some(vec![store]),
        latency_ms: Some(started.elapsed().as_millis() as u64),
    };

    (status.status_code(), Json(response))
}

/// GET /live
pub async fn live_check() -> StatusCode {
    StatusCode::OK
}
