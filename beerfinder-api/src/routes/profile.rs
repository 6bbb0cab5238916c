use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use beerfinder_shared::errors::{AppError, AppResult, ErrorCode};
use beerfinder_shared::middleware::JsonBody;
use beerfinder_shared::types::auth::AuthUser;
use beerfinder_shared::types::ApiResponse;

use crate::dto::{ProfileView, UpdateProfileRequest};
use crate::services::profile_service::{self, DiscoverFilters};
use crate::AppState;

// --- GET /api/users/me ---

pub async fn get_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let profile = profile_service::get_my_profile(&state.store, user.id)?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- PUT /api/users/profile ---

pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let profile = profile_service::update_my_profile(&state.store, user.id, req)?;
    Ok(Json(ApiResponse::ok_with_message(profile, "profile updated")))
}

// --- GET /api/users/discover ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverQuery {
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub max_distance: Option<f64>,
}

impl From<DiscoverQuery> for DiscoverFilters {
    fn from(query: DiscoverQuery) -> Self {
        Self {
            min_age: query.min_age,
            max_age: query.max_age,
            max_distance_km: query.max_distance,
        }
    }
}

pub async fn discover(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    query: Result<Query<DiscoverQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<Vec<ProfileView>>>> {
    let Query(query) =
        query.map_err(|rejection| AppError::new(ErrorCode::ValidationError, rejection.body_text()))?;

    let profiles = profile_service::discover(&state.store, user.id, query.into())?;
    Ok(Json(ApiResponse::ok(profiles)))
}
