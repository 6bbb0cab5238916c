use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use beerfinder_shared::errors::AppResult;
use beerfinder_shared::middleware::JsonBody;
use beerfinder_shared::types::auth::AuthUser;
use beerfinder_shared::types::ApiResponse;

use crate::dto::{MessageView, SendMessageRequest, UnreadCount};
use crate::routes::path_id;
use crate::services::chat_service;
use crate::AppState;

// --- POST /api/messages ---

/// Persists only; live delivery goes through the socket `chat` event.
pub async fn send_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MessageView>>)> {
    let message = chat_service::send_message(&state.store, user.id, req.match_id, &req.content)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message))))
}

// --- GET /api/messages/:match_id ---

pub async fn history(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<ApiResponse<Vec<MessageView>>>> {
    let match_id = path_id(path)?;
    let messages = chat_service::get_chat_history(&state.store, user.id, match_id)?;
    Ok(Json(ApiResponse::ok(messages)))
}

// --- GET /api/messages/:match_id/unread ---

pub async fn unread_count(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<ApiResponse<UnreadCount>>> {
    let match_id = path_id(path)?;
    let unread = chat_service::get_unread_count(&state.store, user.id, match_id)?;
    Ok(Json(ApiResponse::ok(UnreadCount { match_id, unread })))
}
