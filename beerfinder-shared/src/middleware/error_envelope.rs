use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::types::ErrorEnvelope;

/// Stamps the request path onto error bodies produced by `AppError`.
pub async fn error_envelope_middleware(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;

    match response.extensions_mut().remove::<ErrorEnvelope>() {
        Some(envelope) => {
            let status = response.status();
            (status, Json(envelope.with_path(path))).into_response()
        }
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use crate::errors::{AppError, AppResult, ErrorCode};

    async fn failing() -> AppResult<&'static str> {
        Err(AppError::new(ErrorCode::MatchNotFound, "match not found"))
    }

    async fn fine() -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new()
            .route("/api/matches/7", get(failing))
            .route("/ok", get(fine))
            .layer(axum::middleware::from_fn(error_envelope_middleware))
    }

    #[tokio::test]
    async fn error_body_gets_the_request_path() {
        let response = app()
            .oneshot(Request::builder().uri("/api/matches/7").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["path"], "/api/matches/7");
        assert_eq!(body["status"], 404);
        assert_eq!(body["code"], "E3004");
        assert_eq!(body["message"], "match not found");
    }

    #[tokio::test]
    async fn successful_responses_pass_through() {
        let response = app()
            .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }
}
