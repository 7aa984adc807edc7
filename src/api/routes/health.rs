//! Health check endpoint

use axum::{Json, extract::State};

use crate::api::{state::ApiState, types::HealthResponse};

/// GET /api/health
///
/// Liveness of the hub plus the number of monitors currently scheduled
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    let scheduled = state.service.scheduler().scheduled_ids().await.len();

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        scheduled_monitors: scheduled,
    })
}
