use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use beerfinder_shared::errors::{AppError, AppResult, ErrorCode};
use beerfinder_shared::types::auth::AuthUser;
use beerfinder_shared::types::ApiResponse;

use crate::dto::ProfileView;
use crate::services::profile_service;
use crate::AppState;

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(ErrorCode::PayloadTooLarge, "file is too large")
    } else {
        AppError::new(ErrorCode::BadRequest, format!("failed to read multipart: {}", e.body_text()))
    }
}

// --- POST /api/users/profile/photo ---

pub async fn upload_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProfileView>>)> {
    let mut multipart =
        multipart.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let field = loop {
        match multipart.next_field().await.map_err(multipart_error)? {
            Some(field) if field.name() == Some("file") => break field,
            Some(_) => continue,
            None => return Err(AppError::new(ErrorCode::PhotoRejected, "no file provided")),
        }
    };

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field.bytes().await.map_err(multipart_error)?;

    let profile = profile_service::upload_profile_photo(
        &state.store,
        &state.photos,
        user.id,
        &content_type,
        data.to_vec(),
        state.config.max_photo_bytes,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(profile, "photo uploaded")),
    ))
}

// --- DELETE /api/users/profile/photo ---

pub async fn delete_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let profile = profile_service::delete_profile_photo(&state.store, &state.photos, user.id).await?;
    Ok(Json(ApiResponse::ok_with_message(profile, "photo removed")))
}
