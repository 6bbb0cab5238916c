use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use beerfinder_shared::errors::AppResult;
use beerfinder_shared::types::auth::AuthUser;
use beerfinder_shared::types::ApiResponse;

use crate::dto::MatchView;
use crate::routes::path_id;
use crate::services::matching_service;
use crate::AppState;

// --- GET /api/matches ---

pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<MatchView>>>> {
    let matches = matching_service::list_matches(&state.store, user.id)?;
    Ok(Json(ApiResponse::ok(matches)))
}

// --- GET /api/matches/:id ---

pub async fn get_match(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<ApiResponse<MatchView>>> {
    let match_id = path_id(path)?;
    let found = matching_service::get_match(&state.store, user.id, match_id)?;
    Ok(Json(ApiResponse::ok(found)))
}

// --- DELETE /api/matches/:id ---

pub async fn unmatch(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<ApiResponse<MatchView>>> {
    let match_id = path_id(path)?;
    let updated = matching_service::deactivate_match(&state.store, user.id, match_id)?;
    Ok(Json(ApiResponse::ok_with_message(updated, "match deactivated")))
}
