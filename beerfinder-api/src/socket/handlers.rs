use std::sync::Arc;

use serde::{Deserialize, Serialize};
use socketioxide::extract::{Data, SocketRef};

use beerfinder_shared::errors::{AppError, ErrorCode};
use beerfinder_shared::middleware::validate_jwt;

use crate::services::chat_service::{self, match_topic};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorPayload {
    fn from(err: &AppError) -> Self {
        if err.error_code() == ErrorCode::InternalError {
            tracing::error!(error = ?err, "chat socket request failed");
        }
        Self {
            code: err.error_code().code().to_string(),
            message: err.public_message(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchRef {
    #[serde(alias = "match_id")]
    match_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatPayload {
    #[serde(alias = "match_id")]
    match_id: i64,
    content: String,
}

/// Caller id stored on the socket after the handshake.
#[derive(Debug, Clone, Copy)]
struct SocketUser(i64);

fn get_user_id(socket: &SocketRef) -> Option<i64> {
    socket.extensions.get::<SocketUser>().map(|u| u.0)
}

fn emit_error(socket: &SocketRef, payload: ErrorPayload) {
    let _ = socket.emit("error", &payload);
}

fn malformed(event: &str, e: serde_json::Error) -> ErrorPayload {
    ErrorPayload {
        code: "BAD_PAYLOAD".into(),
        message: format!("invalid {event} payload: {e}"),
    }
}

pub async fn on_connect_with_state(socket: SocketRef, state: Arc<AppState>) {
    let user_id = match authenticate_socket(&socket, &state) {
        Ok(id) => id,
        Err(msg) => {
            tracing::warn!(error = %msg, "chat socket auth failed");
            emit_error(
                &socket,
                ErrorPayload {
                    code: "AUTH_FAILED".into(),
                    message: msg,
                },
            );
            socket.disconnect().ok();
            return;
        }
    };

    socket.extensions.insert(SocketUser(user_id));
    tracing::info!(user_id = %user_id, sid = %socket.id, "chat socket connected");

    let _ = socket.emit("connected", &serde_json::json!({ "userId": user_id }));

    socket.on("subscribe", {
        let state = state.clone();
        move |socket: SocketRef, Data::<serde_json::Value>(payload)| {
            let state = state.clone();
            async move { on_subscribe(socket, payload, &state) }
        }
    });

    socket.on("unsubscribe", move |socket: SocketRef, Data::<serde_json::Value>(payload)| async move {
        on_unsubscribe(socket, payload);
    });

    socket.on("chat", {
        let state = state.clone();
        move |socket: SocketRef, Data::<serde_json::Value>(payload)| {
            let state = state.clone();
            async move { on_chat(socket, payload, &state) }
        }
    });

    socket.on_disconnect(|socket: SocketRef| async move {
        if let Some(user_id) = get_user_id(&socket) {
            tracing::info!(user_id = %user_id, sid = %socket.id, "chat socket disconnected");
        }
    });
}

fn on_subscribe(socket: SocketRef, payload: serde_json::Value, state: &AppState) {
    let Some(user_id) = get_user_id(&socket) else { return };
    let MatchRef { match_id } = match serde_json::from_value(payload) {
        Ok(p) => p,
        Err(e) => return emit_error(&socket, malformed("subscribe", e)),
    };

    match chat_service::check_participant(&state.store, user_id, match_id) {
        Ok(_) => {
            socket.join(match_topic(match_id)).ok();
            tracing::debug!(user_id = %user_id, match_id = %match_id, "subscribed to match");
            let _ = socket.emit("subscribed", &serde_json::json!({ "matchId": match_id }));
        }
        Err(e) => emit_error(&socket, ErrorPayload::from(&e)),
    }
}

fn on_unsubscribe(socket: SocketRef, payload: serde_json::Value) {
    match serde_json::from_value::<MatchRef>(payload) {
        Ok(MatchRef { match_id }) => {
            socket.leave(match_topic(match_id)).ok();
        }
        Err(e) => emit_error(&socket, malformed("unsubscribe", e)),
    }
}

fn on_chat(socket: SocketRef, payload: serde_json::Value, state: &AppState) {
    let Some(user_id) = get_user_id(&socket) else { return };
    let ChatPayload { match_id, content } = match serde_json::from_value(payload) {
        Ok(p) => p,
        Err(e) => return emit_error(&socket, malformed("chat", e)),
    };

    if let Err(e) = chat_service::relay_message(&state.store, &state.io, user_id, match_id, &content) {
        tracing::debug!(user_id = %user_id, match_id = %match_id, code = e.error_code().code(), "chat rejected");
        emit_error(&socket, ErrorPayload::from(&e));
    }
}

/// Resolves the caller from the `?token=` query parameter of the handshake.
fn authenticate_socket(socket: &SocketRef, state: &AppState) -> Result<i64, String> {
    let query = socket.req_parts().uri.query().unwrap_or_default();
    let token = token_from_query(query).ok_or_else(|| "missing token query parameter".to_string())?;

    let claims = validate_jwt(&token, &state.config.jwt_secret).map_err(|e| e.public_message())?;
    Ok(claims.sub)
}

fn token_from_query(query: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "token" && !value.is_empty()).then(|| value.to_string())
    })
}
