use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{matches, messages, profiles, swipes, users};

// --- User ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub interests: serde_json::Value,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub profile_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    pub fn interest_list(&self) -> Vec<String> {
        serde_json::from_value(self.interests.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub user_id: i64,
}

/// Full replacement of the editable profile fields; `None` clears a column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = profiles, treat_none_as_null = true)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub interests: serde_json::Value,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub profile_photo: Option<String>,
}

// --- Swipe ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwipeAction {
    Like,
    Pass,
}

impl SwipeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Like => "LIKE",
            SwipeAction::Pass => "PASS",
        }
    }
}

impl std::fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SwipeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LIKE" => Ok(SwipeAction::Like),
            "PASS" => Ok(SwipeAction::Pass),
            _ => Err(format!("unknown swipe action: {s}")),
        }
    }
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = swipes)]
pub struct Swipe {
    pub id: i64,
    pub swiper_id: i64,
    pub swiped_id: i64,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = swipes)]
pub struct NewSwipe {
    pub swiper_id: i64,
    pub swiped_id: i64,
    pub action: String,
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: i64,
    pub user1_id: i64,
    pub user2_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn involves(&self, user_id: i64) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    /// The participant that is not `user_id`.
    pub fn partner_of(&self, user_id: i64) -> i64 {
        if self.user1_id == user_id {
            self.user2_id
        } else {
            self.user1_id
        }
    }
}

/// Always built through `NewMatch::between` so `user1_id < user2_id` holds.
#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user1_id: i64,
    pub user2_id: i64,
    pub is_active: bool,
}

impl NewMatch {
    pub fn between(user_a: i64, user_b: i64) -> Self {
        let (user1_id, user2_id) = canonical_pair(user_a, user_b);
        Self {
            user1_id,
            user2_id,
            is_active: true,
        }
    }
}

/// Orders a pair of user ids smallest first, so a pair has one stored form
/// regardless of who liked first.
pub fn canonical_pair(user_a: i64, user_b: i64) -> (i64, i64) {
    if user_a <= user_b {
        (user_a, user_b)
    } else {
        (user_b, user_a)
    }
}

// --- Message ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: i64,
    pub match_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub match_id: i64,
    pub sender_id: i64,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_puts_smaller_id_first() {
        assert_eq!(canonical_pair(7, 3), (3, 7));
        assert_eq!(canonical_pair(3, 7), (3, 7));
    }

    #[test]
    fn new_match_is_order_independent() {
        let a = NewMatch::between(12, 5);
        let b = NewMatch::between(5, 12);
        assert_eq!((a.user1_id, a.user2_id), (5, 12));
        assert_eq!((b.user1_id, b.user2_id), (5, 12));
        assert!(a.is_active);
    }

    #[test]
    fn swipe_action_round_trips_through_its_column_value() {
        assert_eq!("LIKE".parse::<SwipeAction>().unwrap(), SwipeAction::Like);
        assert_eq!("pass".parse::<SwipeAction>().unwrap(), SwipeAction::Pass);
        assert!("SUPERLIKE".parse::<SwipeAction>().is_err());
    }

    #[test]
    fn partner_is_the_other_participant() {
        let m = Match {
            id: 1,
            user1_id: 2,
            user2_id: 9,
            is_active: true,
            created_at: Utc::now(),
        };
        assert_eq!(m.partner_of(2), 9);
        assert_eq!(m.partner_of(9), 2);
        assert!(m.involves(9));
        assert!(!m.involves(4));
    }
}
