pub mod auth;
pub mod health;
pub mod matches;
pub mod messages;
pub mod photo;
pub mod profile;
pub mod swipes;

use axum::extract::rejection::PathRejection;
use axum::extract::Path;

use beerfinder_shared::errors::{AppError, AppResult, ErrorCode};

/// Numeric path segment, with malformed ids reported in the error envelope.
pub(crate) fn path_id(path: Result<Path<i64>, PathRejection>) -> AppResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::new(ErrorCode::ValidationError, rejection.body_text()))
}
