//! Object lookup and access URL handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use objdex_core::{metrics::ACCESS_URLS_ISSUED, CatalogEntry, IssuedUrl};
use tracing::{debug, error};

use super::ErrorResponse;
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn lookup(state: &AppState, id: i64) -> Result<CatalogEntry, ApiError> {
    match state.catalog().get_by_id(id) {
        Ok(Some(entry)) => Ok(entry),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("Object not found: {}", id))),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )),
    }
}

/// GET /api/v1/objects/{id}
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<CatalogEntry>, ApiError> {
    lookup(&state, id).map(Json)
}

/// GET /api/v1/objects/{id}/url
///
/// Issue a time-limited download URL for a catalogued object.
pub async fn get_object_url(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<IssuedUrl>, ApiError> {
    let entry = lookup(&state, id)?;
    let issuer = state.url_issuer();

    match issuer.issue(&entry.object_key).await {
        Ok(issued) => {
            ACCESS_URLS_ISSUED.with_label_values(&["success"]).inc();
            debug!("Issued {} URL for object {}", issuer.name(), id);
            Ok(Json(issued))
        }
        Err(e) => {
            ACCESS_URLS_ISSUED.with_label_values(&["failed"]).inc();
            error!("Failed to issue URL for {}: {}", entry.object_key, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            ))
        }
    }
}
