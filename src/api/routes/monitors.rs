//! Monitor CRUD endpoints

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::api::{
    error::{ApiError, ApiResult},
    state::ApiState,
    types::{CreateMonitorRequest, DeleteResponse, normalize_update},
};
use crate::models::{Monitor, MonitorUpdate};
use crate::status::MonitorWithStatus;

/// GET /api/monitors
///
/// All monitors with their live status, in creation order
pub async fn list_monitors(
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<MonitorWithStatus>>> {
    Ok(Json(state.service.get_all_monitor_statuses().await?))
}

/// GET /api/monitors/:id
pub async fn get_monitor(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MonitorWithStatus>> {
    Ok(Json(state.service.get_monitor(&id).await?))
}

/// POST /api/monitors
///
/// Creates the monitor and starts checking it right away when active
pub async fn create_monitor(
    State(state): State<ApiState>,
    body: Result<Json<CreateMonitorRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Monitor>)> {
    let Json(request) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let data = request
        .into_new_monitor()
        .ok_or_else(|| ApiError::InvalidRequest("Name and URL are required".to_string()))?;

    let monitor = state.service.create_monitor(data).await?;
    Ok((StatusCode::CREATED, Json(monitor)))
}

/// PUT /api/monitors/:id
///
/// Partial update; the monitor is rescheduled when active and unscheduled otherwise
pub async fn update_monitor(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    body: Result<Json<MonitorUpdate>, JsonRejection>,
) -> ApiResult<Json<Monitor>> {
    let Json(update) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let monitor = state
        .service
        .update_monitor(&id, normalize_update(update))
        .await?;
    Ok(Json(monitor))
}

/// DELETE /api/monitors/:id
pub async fn delete_monitor(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    state.service.delete_monitor(&id).await?;
    Ok(Json(DeleteResponse {
        message: "Monitor deleted successfully".to_string(),
    }))
}
