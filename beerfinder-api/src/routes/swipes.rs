use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use beerfinder_shared::errors::AppResult;
use beerfinder_shared::middleware::JsonBody;
use beerfinder_shared::types::auth::AuthUser;
use beerfinder_shared::types::ApiResponse;

use crate::dto::{SwipeOutcome, SwipeRequest};
use crate::services::matching_service;
use crate::AppState;

// --- POST /api/swipes ---

pub async fn swipe(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<SwipeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SwipeOutcome>>)> {
    let outcome = matching_service::record_swipe(&state.store, user.id, req.swiped_user_id, req.action)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(outcome))))
}
