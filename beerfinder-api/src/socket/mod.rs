pub mod handlers;

use socketioxide::SocketIo;

use crate::dto::ChatMessage;
use crate::services::chat_service::{match_topic, ChatBroadcaster};

/// Event name clients listen on inside a match room.
pub const MESSAGE_EVENT: &str = "message";

impl ChatBroadcaster for SocketIo {
    fn publish(&self, match_id: i64, message: &ChatMessage) -> Result<(), String> {
        self.to(match_topic(match_id))
            .emit(MESSAGE_EVENT, message)
            .map_err(|e| e.to_string())
    }
}
