//! Catalog API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use objdex_core::{CatalogEntrySummary, CatalogStats};
use serde::Deserialize;
use tracing::error;

use super::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Substring to look for in display names. Empty matches everything.
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/search
///
/// Case-insensitive substring search on display names.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<CatalogEntrySummary>>, impl IntoResponse> {
    let search = &state.config().search;
    let limit = params
        .limit
        .unwrap_or(search.default_limit)
        .clamp(1, search.max_limit);

    match state.catalog().search_by_name(&params.q, limit) {
        Ok(results) => Ok(Json(results)),
        Err(e) => {
            error!("Catalog search failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            ))
        }
    }
}

/// GET /api/v1/catalog/stats
///
/// Get catalog statistics.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogStats>, impl IntoResponse> {
    match state.catalog().stats() {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )),
    }
}
