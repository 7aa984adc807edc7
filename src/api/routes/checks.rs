//! Check history and on-demand checks

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::{error::ApiResult, state::ApiState, types::ChecksQuery};
use crate::models::CheckResult;

/// GET /api/monitors/:id/checks?limit=N
///
/// Stored results, newest first (50 unless `limit` says otherwise)
pub async fn list_checks(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<ChecksQuery>,
) -> ApiResult<Json<Vec<CheckResult>>> {
    let checks = state.service.get_checks(&id, Some(query.limit())).await?;
    Ok(Json(checks))
}

/// POST /api/monitors/:id/check
///
/// Runs one probe cycle now and returns the stored result
pub async fn check_now(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CheckResult>> {
    Ok(Json(state.service.check_now(&id).await?))
}
