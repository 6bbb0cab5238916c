use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use beerfinder_shared::errors::{AppError, AppResult, ErrorCode};
use beerfinder_shared::types::auth::AuthResponse;

use crate::dto::{LoginRequest, RegisterRequest};
use crate::models::{NewProfile, NewUser};
use crate::services::token_service;
use crate::store::Store;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 8 {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must be at least 8 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must contain at least one number"));
    }
    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must contain at least one letter"));
    }
    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates the account and its empty profile together, then issues a token.
pub fn register(
    store: &impl Store,
    mut req: RegisterRequest,
    jwt_secret: &str,
    ttl_secs: i64,
) -> AppResult<AuthResponse> {
    req.email = normalize_email(&req.email);
    req.validate()?;
    validate_password(&req.password)?;

    let email = req.email;
    let password_hash = hash_password(&req.password)?;

    let user = store.transaction(|repo| {
        if repo.email_exists(&email)? {
            return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email is already registered"));
        }
        let user = repo.insert_user(NewUser {
            email: email.clone(),
            password_hash,
        })?;
        repo.insert_profile(NewProfile { user_id: user.id })?;
        Ok(user)
    })?;

    let token = token_service::create_access_token(user.id, &user.email, jwt_secret, ttl_secs)?;

    tracing::info!(user_id = %user.id, email = %user.email, "user registered");

    Ok(AuthResponse::new(token, ttl_secs, user.id, user.email))
}

pub fn login(
    store: &impl Store,
    mut req: LoginRequest,
    jwt_secret: &str,
    ttl_secs: i64,
) -> AppResult<AuthResponse> {
    req.email = normalize_email(&req.email);
    req.validate()?;

    let email = req.email.clone();
    let invalid = || AppError::new(ErrorCode::InvalidCredentials, "invalid email or password");

    let user = store
        .transaction(|repo| repo.find_user_by_email(&email))?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "login rejected: wrong password");
        return Err(invalid());
    }

    let token = token_service::create_access_token(user.id, &user.email, jwt_secret, ttl_secs)?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(AuthResponse::new(token, ttl_secs, user.id, user.email))
}
