use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::errors::{AppError, ErrorCode};

/// `Json<T>` whose rejections use the uniform error envelope instead of
/// axum's plain-text bodies.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::new(ErrorCode::ValidationError, rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Swipe {
        action: String,
    }

    #[tokio::test]
    async fn well_formed_body_is_decoded() {
        let req = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"action":"LIKE"}"#))
            .unwrap();
        let JsonBody(swipe) = JsonBody::<Swipe>::from_request(req, &()).await.unwrap();
        assert_eq!(swipe.action, "LIKE");
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let req = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"action":"#))
            .unwrap();
        let err = JsonBody::<Swipe>::from_request(req, &()).await.err().unwrap();
        assert_eq!(err.error_code(), ErrorCode::ValidationError);
    }
}
