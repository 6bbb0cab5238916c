use jsonwebtoken::{encode, EncodingKey, Header};

use beerfinder_shared::errors::AppError;
use beerfinder_shared::types::auth::Claims;

pub fn create_access_token(
    user_id: i64,
    email: &str,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, AppError> {
    let claims = Claims::new(user_id, email, ttl_secs);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use beerfinder_shared::middleware::validate_jwt;

    #[test]
    fn issued_token_validates_with_the_same_secret() {
        let token = create_access_token(42, "ola@example.com", "s3cret", 3600).unwrap();
        let claims = validate_jwt(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "ola@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn each_token_gets_its_own_id() {
        let a = create_access_token(1, "a@example.com", "s3cret", 60).unwrap();
        let b = create_access_token(1, "a@example.com", "s3cret", 60).unwrap();
        let ja = validate_jwt(&a, "s3cret").unwrap().jti;
        let jb = validate_jwt(&b, "s3cret").unwrap().jti;
        assert_ne!(ja, jb);
    }
}
