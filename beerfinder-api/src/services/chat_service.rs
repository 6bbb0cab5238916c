use std::collections::HashMap;

use metrics::counter;

use beerfinder_shared::errors::{AppError, AppResult, ErrorCode};

use crate::dto::{ChatMessage, MessageView};
use crate::models::{Match, NewMessage};
use crate::store::{Repository, Store};

/// Fan-out of persisted chat messages to live subscribers of a match.
pub trait ChatBroadcaster: Send + Sync {
    fn publish(&self, match_id: i64, message: &ChatMessage) -> Result<(), String>;
}

/// Live topic a match's messages are published to.
pub fn match_topic(match_id: i64) -> String {
    format!("/matches/{match_id}")
}

fn require_participant(repo: &mut dyn Repository, match_id: i64, user_id: i64) -> AppResult<Match> {
    let found = repo
        .find_match(match_id)?
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;
    if !found.involves(user_id) {
        return Err(AppError::new(ErrorCode::NotMatchParticipant, "you are not part of this match"));
    }
    Ok(found)
}

/// Profile name when one is set, the account email otherwise.
fn display_name(repo: &mut dyn Repository, user_id: i64) -> AppResult<String> {
    let name = repo
        .find_profile_by_user(user_id)?
        .and_then(|p| p.name)
        .filter(|n| !n.trim().is_empty());
    if let Some(name) = name {
        return Ok(name);
    }
    repo.find_user(user_id)?
        .map(|u| u.email)
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
}

pub fn send_message(store: &impl Store, sender_id: i64, match_id: i64, content: &str) -> AppResult<MessageView> {
    if content.trim().is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "message content cannot be empty"));
    }

    let view = store.transaction(|repo| {
        let found = require_participant(repo, match_id, sender_id)?;
        if !found.is_active {
            return Err(AppError::new(ErrorCode::MatchInactive, "match is no longer active"));
        }

        let message = repo.insert_message(NewMessage {
            match_id,
            sender_id,
            content: content.to_string(),
        })?;
        let sender_name = display_name(repo, sender_id)?;
        Ok(MessageView::new(message, sender_name))
    })?;

    counter!("messages_sent_total").increment(1);
    tracing::info!(message_id = %view.id, match_id = %match_id, sender_id = %sender_id, "message sent");

    Ok(view)
}

/// Live-channel entry point: persists like [`send_message`], then publishes
/// to the match topic. Publishing is best effort.
pub fn relay_message(
    store: &impl Store,
    broadcaster: &dyn ChatBroadcaster,
    sender_id: i64,
    match_id: i64,
    content: &str,
) -> AppResult<MessageView> {
    let view = send_message(store, sender_id, match_id, content)?;

    if let Err(e) = broadcaster.publish(match_id, &ChatMessage::from(&view)) {
        tracing::warn!(match_id = %match_id, message_id = %view.id, error = %e, "chat broadcast failed");
    }

    Ok(view)
}

/// Full history, oldest first. Reading it marks the partner's messages as
/// read, and the returned records already show that.
pub fn get_chat_history(store: &impl Store, requester_id: i64, match_id: i64) -> AppResult<Vec<MessageView>> {
    store.transaction(|repo| {
        require_participant(repo, match_id, requester_id)?;

        let flipped = repo.mark_read(match_id, requester_id)?;
        if flipped > 0 {
            tracing::debug!(match_id = %match_id, reader_id = %requester_id, flipped, "messages marked read");
        }

        let mut names: HashMap<i64, String> = HashMap::new();
        let mut views = Vec::new();
        for message in repo.messages_for_match(match_id)? {
            let name = match names.get(&message.sender_id) {
                Some(name) => name.clone(),
                None => {
                    let name = display_name(repo, message.sender_id)?;
                    names.insert(message.sender_id, name.clone());
                    name
                }
            };
            views.push(MessageView::new(message, name));
        }
        Ok(views)
    })
}

/// Fails unless `user_id` belongs to the match. Used before joining its topic.
pub fn check_participant(store: &impl Store, user_id: i64, match_id: i64) -> AppResult<Match> {
    store.transaction(|repo| require_participant(repo, match_id, user_id))
}

pub fn get_unread_count(store: &impl Store, requester_id: i64, match_id: i64) -> AppResult<i64> {
    store.transaction(|repo| {
        require_participant(repo, match_id, requester_id)?;
        repo.count_unread(match_id, requester_id)
    })
}
