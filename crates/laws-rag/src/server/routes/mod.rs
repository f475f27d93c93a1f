//! Route handlers

pub mod query;

use axum::{extract::State, http::StatusCode, Json};

use crate::service::QueryService;
use crate::types::{HealthStatus, ReadinessStatus};

/// GET /health - liveness, independent of index state
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus::default())
}

/// GET /ready - 200 once the index is installed, 503 while it is building
pub async fn readiness(State(service): State<QueryService>) -> (StatusCode, Json<ReadinessStatus>) {
    let status = service.readiness();
    let code = if status.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}
