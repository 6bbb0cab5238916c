pub mod config;
pub mod dto;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod socket;
pub mod store;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use socketioxide::SocketIo;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use beerfinder_shared::clients::storage::S3PhotoStorage;
use beerfinder_shared::middleware::{error_envelope_middleware, metrics_middleware};
use beerfinder_shared::types::auth::AuthState;

use crate::config::AppConfig;
use crate::routes::{auth, health, matches, messages, photo, profile, swipes};
use crate::store::PgStore;

/// Multipart framing allowance on top of the photo size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub struct AppState {
    pub store: PgStore,
    pub config: AppConfig,
    pub photos: S3PhotoStorage,
    pub io: SocketIo,
    pub metrics_handle: PrometheusHandle,
}

impl AuthState for AppState {
    fn jwt_secret(&self) -> &str {
        &self.config.jwt_secret
    }
}

/// HTTP routes of the service. The Socket.IO layer is attached by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    let photo_limit = state.config.max_photo_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/users/me", get(profile::get_profile))
        .route("/api/users/profile", put(profile::update_profile))
        .route("/api/users/discover", get(profile::discover))
        .route(
            "/api/users/profile/photo",
            post(photo::upload_photo)
                .delete(photo::delete_photo)
                .layer(DefaultBodyLimit::max(photo_limit)),
        )
        .route("/api/swipes", post(swipes::swipe))
        .route("/api/matches", get(matches::list_matches))
        .route("/api/matches/:id", get(matches::get_match).delete(matches::unmatch))
        .route("/api/messages", post(messages::send_message))
        .route("/api/messages/:match_id", get(messages::history))
        .route("/api/messages/:match_id/unread", get(messages::unread_count))
        .layer(middleware::from_fn(error_envelope_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
