use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{Match, Message, Profile, Swipe, SwipeAction};

// --- Requests ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    /// Strength rules live in `auth_service::validate_password`.
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(custom = "not_blank", length(max = 100, message = "name is too long"))]
    pub name: String,
    #[validate(range(min = 18, message = "age must be at least 18"))]
    pub age: Option<i32>,
    #[validate(length(max = 1000, message = "bio must be at most 1000 characters"))]
    pub bio: Option<String>,
    #[validate(length(max = 100, message = "occupation is too long"))]
    pub occupation: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,
    pub profile_photo: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("name is required".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeRequest {
    pub swiped_user_id: i64,
    pub action: SwipeAction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub match_id: i64,
    pub content: String,
}

// --- Views ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub interests: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub profile_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl From<Profile> for ProfileView {
    fn from(profile: Profile) -> Self {
        let interests = profile.interest_list();
        Self {
            id: profile.id,
            user_id: profile.user_id,
            name: profile.name,
            age: profile.age,
            bio: profile.bio,
            occupation: profile.occupation,
            interests,
            latitude: profile.latitude,
            longitude: profile.longitude,
            profile_photo: profile.profile_photo,
            distance_km: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeOutcome {
    pub swipe_id: i64,
    pub swiper_id: i64,
    pub swiped_user_id: i64,
    pub action: SwipeAction,
    pub is_match: bool,
    pub match_id: Option<i64>,
    pub message: String,
}

impl SwipeOutcome {
    pub fn new(swipe: &Swipe, action: SwipeAction, matched: Option<&Match>) -> Self {
        Self {
            swipe_id: swipe.id,
            swiper_id: swipe.swiper_id,
            swiped_user_id: swipe.swiped_id,
            action,
            is_match: matched.is_some(),
            match_id: matched.map(|m| m.id),
            message: if matched.is_some() { "It's a match!" } else { "Swipe recorded" }.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub match_id: i64,
    pub matched_user: Option<ProfileView>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: i64,
    pub match_id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl MessageView {
    pub fn new(message: Message, sender_name: String) -> Self {
        Self {
            id: message.id,
            match_id: message.match_id,
            sender_id: message.sender_id,
            sender_name,
            content: message.content,
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChatMessageType {
    Chat,
}

/// Payload pushed to a match's live topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message_id: i64,
    pub match_id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ChatMessageType,
}

impl From<&MessageView> for ChatMessage {
    fn from(view: &MessageView) -> Self {
        Self {
            message_id: view.id,
            match_id: view.match_id,
            sender_id: view.sender_id,
            sender_name: view.sender_name.clone(),
            content: view.content.clone(),
            timestamp: view.created_at,
            kind: ChatMessageType::Chat,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub match_id: i64,
    pub unread: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, age: Option<i32>, latitude: Option<f64>) -> UpdateProfileRequest {
        UpdateProfileRequest {
            name: name.to_string(),
            age,
            bio: None,
            occupation: None,
            interests: vec![],
            latitude,
            longitude: None,
            profile_photo: None,
        }
    }

    #[test]
    fn profile_update_rules() {
        assert!(request("Ola", Some(25), Some(54.35)).validate().is_ok());

        let errors = request("   ", Some(17), Some(91.0)).validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("age"));
        assert!(fields.contains_key("latitude"));
    }

    #[test]
    fn chat_message_serializes_its_type_tag() {
        let view = MessageView {
            id: 4,
            match_id: 2,
            sender_id: 1,
            sender_name: "Ola".into(),
            content: "hej".into(),
            is_read: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(ChatMessage::from(&view)).unwrap();
        assert_eq!(json["type"], "CHAT");
        assert_eq!(json["messageId"], 4);
        assert_eq!(json["senderName"], "Ola");
    }

    #[test]
    fn swipe_request_reads_camel_case() {
        let req: SwipeRequest = serde_json::from_str(r#"{"swipedUserId":9,"action":"PASS"}"#).unwrap();
        assert_eq!(req.swiped_user_id, 9);
        assert_eq!(req.action, SwipeAction::Pass);
    }
}
