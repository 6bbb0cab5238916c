use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};

use crate::errors::{AppError, ErrorCode};
use crate::types::auth::{AuthState, AuthUser, Claims};

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: AuthState + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let claims = validate_jwt(&token, state.jwt_secret())?;

        if claims.is_expired() {
            return Err(AppError::new(ErrorCode::TokenExpired, "token has expired"));
        }

        Ok(AuthUser::from(claims))
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::new(ErrorCode::Unauthorized, "invalid authorization header"))?;

    match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err(AppError::new(ErrorCode::Unauthorized, "empty bearer token")),
        None => Err(AppError::new(ErrorCode::Unauthorized, "authorization header must use Bearer scheme")),
    }
}

/// Decodes and verifies an HS256 token. Shared by the HTTP extractor and the
/// socket handshake.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::new(ErrorCode::TokenExpired, "token has expired")
        }
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            AppError::new(ErrorCode::TokenInvalid, "token signature verification failed")
        }
        _ => AppError::new(ErrorCode::TokenInvalid, format!("invalid token: {e}")),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    struct TestState;

    impl AuthState for TestState {
        fn jwt_secret(&self) -> &str {
            SECRET
        }
    }

    fn token_for(claims: &Claims, secret: &str) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/users/me");
        if let Some(v) = value {
            builder = builder.header("Authorization", v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn valid_token_resolves_the_caller() {
        let token = token_for(&Claims::new(42, "ola@example.com", 3600), SECRET);
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));

        let user = AuthUser::from_request_parts(&mut parts, &TestState).await.unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.email, "ola@example.com");
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let mut parts = parts_with_auth(None);
        let err = AuthUser::from_request_parts(&mut parts, &TestState).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let mut parts = parts_with_auth(Some("Basic b2xhOnNlY3JldA=="));
        let err = AuthUser::from_request_parts(&mut parts, &TestState).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_invalid() {
        let token = token_for(&Claims::new(42, "ola@example.com", 3600), "someone-else");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));

        let err = AuthUser::from_request_parts(&mut parts, &TestState).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::TokenInvalid);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let mut claims = Claims::new(42, "ola@example.com", 3600);
        claims.iat -= 7200;
        claims.exp -= 7200;
        let token = token_for(&claims, SECRET);
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));

        let err = AuthUser::from_request_parts(&mut parts, &TestState).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::TokenExpired);
    }
}
