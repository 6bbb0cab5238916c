use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::ErrorEnvelope;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: Profile errors
/// - E3xxx: Swipe and match errors
/// - E4xxx: Chat errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict,
    BadRequest,
    PayloadTooLarge,

    // Auth (E1xxx)
    InvalidCredentials,
    EmailAlreadyExists,
    TokenExpired,
    TokenInvalid,
    PasswordTooWeak,

    // Profile (E2xxx)
    ProfileNotFound,
    UserNotFound,
    PhotoRejected,
    PhotoStorageFailed,

    // Swipe / match (E3xxx)
    CannotSwipeSelf,
    SwipeAlreadyExists,
    MatchAlreadyExists,
    MatchNotFound,
    NotMatchParticipant,

    // Chat (E4xxx)
    MatchInactive,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::Conflict => "E0006",
            Self::BadRequest => "E0008",
            Self::PayloadTooLarge => "E0009",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::EmailAlreadyExists => "E1002",
            Self::TokenExpired => "E1004",
            Self::TokenInvalid => "E1005",
            Self::PasswordTooWeak => "E1008",

            // Profile
            Self::ProfileNotFound => "E2001",
            Self::UserNotFound => "E2002",
            Self::PhotoRejected => "E2003",
            Self::PhotoStorageFailed => "E2004",

            // Swipe / match
            Self::CannotSwipeSelf => "E3001",
            Self::SwipeAlreadyExists => "E3002",
            Self::MatchAlreadyExists => "E3003",
            Self::MatchNotFound => "E3004",
            Self::NotMatchParticipant => "E3005",

            // Chat
            Self::MatchInactive => "E4001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::PhotoStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::PasswordTooWeak
            | Self::PhotoRejected | Self::CannotSwipeSelf => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound | Self::ProfileNotFound | Self::UserNotFound
            | Self::MatchNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotMatchParticipant => StatusCode::FORBIDDEN,
            Self::Conflict | Self::EmailAlreadyExists | Self::SwipeAlreadyExists
            | Self::MatchAlreadyExists | Self::MatchInactive => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        field_errors: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn with_field_errors(code: ErrorCode, message: impl Into<String>, field_errors: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Infrastructure failure. The message is logged, never sent to clients.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(anyhow::Error::msg(message.into()))
    }

    /// The code this error maps to at the HTTP boundary.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } => *code,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::Database(diesel::result::Error::NotFound) => ErrorCode::NotFound,
            AppError::Database(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                ErrorCode::Conflict
            }
            AppError::Database(_) => ErrorCode::InternalError,
        }
    }

    /// Client-facing message. Internal details never leave the process.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Known { message, .. } => message.clone(),
            AppError::Internal(_) => "internal server error".to_string(),
            AppError::Database(diesel::result::Error::NotFound) => "resource not found".to_string(),
            AppError::Database(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                "resource already exists".to_string()
            }
            AppError::Database(_) => "database error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
            }
            _ => {}
        }

        let code = self.error_code();
        let status = code.status_code();
        let mut envelope = ErrorEnvelope::new(status, code.code(), self.public_message());
        if let AppError::Known { field_errors: Some(fields), .. } = &self {
            envelope = envelope.with_field_errors(fields.clone());
        }

        // The body is rewritten with the request path by `error_envelope_middleware`.
        let mut response = (status, Json(envelope.clone())).into_response();
        response.extensions_mut().insert(envelope);
        response
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: BTreeMap<String, String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .map(|e| match &e.message {
                        Some(m) => m.to_string(),
                        None => e.code.to_string(),
                    })
                    .unwrap_or_else(|| "invalid value".to_string());
                (field.to_string(), message)
            })
            .collect();

        let field_errors = serde_json::to_value(fields).unwrap_or_default();
        AppError::with_field_errors(ErrorCode::ValidationError, "input validation failed", field_errors)
    }
}

pub type AppResult<T> = Result<T, AppError>;
