//! Sync API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use objdex_core::{SchedulerStatus, SyncError, SyncReport};

use super::ErrorResponse;
use crate::state::AppState;

/// POST /api/v1/sync
///
/// Run one sync and wait for its report. 409 if a run is already in progress.
pub async fn trigger_sync(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SyncReport>, (StatusCode, Json<ErrorResponse>)> {
    match state.scheduler().trigger().await {
        Ok(report) => Ok(Json(report)),
        Err(e @ SyncError::AlreadyRunning) => {
            Err((StatusCode::CONFLICT, Json(ErrorResponse::new(e.to_string()))))
        }
        Err(e @ SyncError::ListingUnavailable(_)) => Err((
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::new(e.to_string())),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )),
    }
}

/// GET /api/v1/sync/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<SchedulerStatus> {
    Json(state.scheduler().status().await)
}
