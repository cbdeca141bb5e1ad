//! Liveness and readiness probes

use super::correlation_id;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use ferrea_core::{AggregateHealth, HealthStatus};
use serde::Serialize;

/// Readiness response
#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: HealthStatus,
}

/// Process liveness only; never touches a provider
pub async fn ready() -> Json<ReadyResponse> {
    Json(ReadyResponse {
        ready: HealthStatus::Healthy,
    })
}

/// Fan a health check out to every provider; 503 unless all are healthy
pub async fn health(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<AggregateHealth>) {
    let ctx = state.request_context(correlation_id(&headers).as_deref());
    let health = state.aggregator.check_health(&ctx).await;

    let status = if health.status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}
