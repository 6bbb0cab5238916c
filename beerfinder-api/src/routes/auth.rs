use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use beerfinder_shared::errors::AppResult;
use beerfinder_shared::middleware::JsonBody;
use beerfinder_shared::types::auth::AuthResponse;
use beerfinder_shared::types::ApiResponse;

use crate::dto::{LoginRequest, RegisterRequest};
use crate::services::auth_service;
use crate::AppState;

// --- POST /api/auth/register ---

pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let response = auth_service::register(
        &state.store,
        req,
        &state.config.jwt_secret,
        state.config.jwt_ttl_secs,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(response, "registration successful")),
    ))
}

// --- POST /api/auth/login ---

pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let response = auth_service::login(
        &state.store,
        req,
        &state.config.jwt_secret,
        state.config.jwt_ttl_secs,
    )?;

    Ok(Json(ApiResponse::ok(response)))
}
