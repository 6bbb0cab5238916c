use std::sync::Mutex;

use chrono::Utc;

use beerfinder_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{
    Match, Message, NewMatch, NewMessage, NewProfile, NewSwipe, NewUser, Profile, ProfileChanges,
    Swipe, SwipeAction, User,
};

use super::{Repository, Store};

/// In-process store for service tests. Transactions run against a copy of
/// the tables that replaces the committed state only when the closure
/// succeeds. The same unique constraints as the SQL schema are enforced.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Clone, Default)]
pub struct Tables {
    next_id: i64,
    pub users: Vec<User>,
    pub profiles: Vec<Profile>,
    pub swipes: Vec<Swipe>,
    pub matches: Vec<Match>,
    pub messages: Vec<Message>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the committed state.
    pub fn snapshot(&self) -> Tables {
        self.tables.lock().unwrap().clone()
    }

    /// Registers a user with an empty profile and returns the user id.
    pub fn seed_user(&self, email: &str) -> i64 {
        self.transaction(|repo| {
            let user = repo.insert_user(NewUser {
                email: email.to_string(),
                password_hash: "not-a-real-hash".to_string(),
            })?;
            repo.insert_profile(NewProfile { user_id: user.id })?;
            Ok(user.id)
        })
        .unwrap()
    }

    /// Seeds a user whose profile carries a name, age and optional position.
    pub fn seed_profile(&self, email: &str, name: &str, age: Option<i32>, coords: Option<(f64, f64)>) -> i64 {
        let user_id = self.seed_user(email);
        let mut tables = self.tables.lock().unwrap();
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .unwrap();
        profile.name = Some(name.to_string());
        profile.age = age;
        profile.latitude = coords.map(|c| c.0);
        profile.longitude = coords.map(|c| c.1);
        user_id
    }
}

impl Store for MemoryStore {
    fn transaction<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut dyn Repository) -> AppResult<T>,
    {
        let mut committed = self
            .tables
            .lock()
            .map_err(|_| AppError::internal("memory store poisoned"))?;
        let mut working = committed.clone();
        let result = f(&mut working)?;
        *committed = working;
        Ok(result)
    }
}

fn profile_not_found() -> AppError {
    AppError::new(ErrorCode::ProfileNotFound, "profile not found")
}

impl Repository for Tables {
    fn insert_user(&mut self, user: NewUser) -> AppResult<User> {
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email is already registered"));
        }
        let row = User {
            id: self.next_id(),
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        self.users.push(row.clone());
        Ok(row)
    }

    fn find_user(&mut self, user_id: i64) -> AppResult<Option<User>> {
        Ok(self.users.iter().find(|u| u.id == user_id).cloned())
    }

    fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
        Ok(self.users.iter().find(|u| u.email == email).cloned())
    }

    fn email_exists(&mut self, email: &str) -> AppResult<bool> {
        Ok(self.users.iter().any(|u| u.email == email))
    }

    fn insert_profile(&mut self, profile: NewProfile) -> AppResult<Profile> {
        let now = Utc::now();
        let row = Profile {
            id: self.next_id(),
            user_id: profile.user_id,
            name: None,
            age: None,
            bio: None,
            occupation: None,
            interests: serde_json::json!([]),
            latitude: None,
            longitude: None,
            profile_photo: None,
            created_at: now,
            updated_at: now,
        };
        self.profiles.push(row.clone());
        Ok(row)
    }

    fn find_profile_by_user(&mut self, user_id: i64) -> AppResult<Option<Profile>> {
        Ok(self.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    fn update_profile(&mut self, user_id: i64, changes: &ProfileChanges) -> AppResult<Profile> {
        let profile = self
            .profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(profile_not_found)?;
        profile.name = changes.name.clone();
        profile.age = changes.age;
        profile.bio = changes.bio.clone();
        profile.occupation = changes.occupation.clone();
        profile.interests = changes.interests.clone();
        profile.latitude = changes.latitude;
        profile.longitude = changes.longitude;
        profile.profile_photo = changes.profile_photo.clone();
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    fn set_profile_photo(&mut self, user_id: i64, photo: Option<&str>) -> AppResult<Profile> {
        let profile = self
            .profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(profile_not_found)?;
        profile.profile_photo = photo.map(str::to_string);
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    fn discover_candidates(
        &mut self,
        user_id: i64,
        min_age: Option<i32>,
        max_age: Option<i32>,
    ) -> AppResult<Vec<Profile>> {
        let swiped: Vec<i64> = self
            .swipes
            .iter()
            .filter(|s| s.swiper_id == user_id)
            .map(|s| s.swiped_id)
            .collect();

        let mut candidates: Vec<Profile> = self
            .profiles
            .iter()
            .filter(|p| p.user_id != user_id && !swiped.contains(&p.user_id))
            .filter(|p| match min_age {
                Some(min) => p.age.is_some_and(|age| age >= min),
                None => true,
            })
            .filter(|p| match max_age {
                Some(max) => p.age.is_some_and(|age| age <= max),
                None => true,
            })
            .cloned()
            .collect();
        candidates.sort_by_key(|p| p.id);
        Ok(candidates)
    }

    fn swipe_exists(&mut self, swiper_id: i64, swiped_id: i64) -> AppResult<bool> {
        Ok(self
            .swipes
            .iter()
            .any(|s| s.swiper_id == swiper_id && s.swiped_id == swiped_id))
    }

    fn find_swipe(&mut self, swiper_id: i64, swiped_id: i64, action: SwipeAction) -> AppResult<Option<Swipe>> {
        Ok(self
            .swipes
            .iter()
            .find(|s| s.swiper_id == swiper_id && s.swiped_id == swiped_id && s.action == action.as_str())
            .cloned())
    }

    fn insert_swipe(&mut self, swipe: NewSwipe) -> AppResult<Swipe> {
        if self.swipe_exists(swipe.swiper_id, swipe.swiped_id)? {
            return Err(AppError::new(ErrorCode::SwipeAlreadyExists, "you have already swiped this user"));
        }
        let row = Swipe {
            id: self.next_id(),
            swiper_id: swipe.swiper_id,
            swiped_id: swipe.swiped_id,
            action: swipe.action,
            created_at: Utc::now(),
        };
        self.swipes.push(row.clone());
        Ok(row)
    }

    fn match_exists(&mut self, user1_id: i64, user2_id: i64) -> AppResult<bool> {
        Ok(self
            .matches
            .iter()
            .any(|m| m.user1_id == user1_id && m.user2_id == user2_id))
    }

    fn insert_match(&mut self, new_match: NewMatch) -> AppResult<Match> {
        if self.match_exists(new_match.user1_id, new_match.user2_id)? {
            return Err(AppError::new(ErrorCode::MatchAlreadyExists, "match already exists"));
        }
        let row = Match {
            id: self.next_id(),
            user1_id: new_match.user1_id,
            user2_id: new_match.user2_id,
            is_active: new_match.is_active,
            created_at: Utc::now(),
        };
        self.matches.push(row.clone());
        Ok(row)
    }

    fn find_match(&mut self, match_id: i64) -> AppResult<Option<Match>> {
        Ok(self.matches.iter().find(|m| m.id == match_id).cloned())
    }

    fn active_matches_for(&mut self, user_id: i64) -> AppResult<Vec<Match>> {
        let mut found: Vec<Match> = self
            .matches
            .iter()
            .filter(|m| m.is_active && m.involves(user_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(found)
    }

    fn set_match_active(&mut self, match_id: i64, active: bool) -> AppResult<Match> {
        let found = self
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;
        found.is_active = active;
        Ok(found.clone())
    }

    fn insert_message(&mut self, message: NewMessage) -> AppResult<Message> {
        let row = Message {
            id: self.next_id(),
            match_id: message.match_id,
            sender_id: message.sender_id,
            content: message.content,
            is_read: false,
            created_at: Utc::now(),
        };
        self.messages.push(row.clone());
        Ok(row)
    }

    fn messages_for_match(&mut self, match_id: i64) -> AppResult<Vec<Message>> {
        let mut found: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.match_id == match_id)
            .cloned()
            .collect();
        found.sort_by_key(|m| (m.created_at, m.id));
        Ok(found)
    }

    fn mark_read(&mut self, match_id: i64, reader_id: i64) -> AppResult<usize> {
        let mut flipped = 0;
        for message in self
            .messages
            .iter_mut()
            .filter(|m| m.match_id == match_id && m.sender_id != reader_id && !m.is_read)
        {
            message.is_read = true;
            flipped += 1;
        }
        Ok(flipped)
    }

    fn count_unread(&mut self, match_id: i64, reader_id: i64) -> AppResult<i64> {
        Ok(self
            .messages
            .iter()
            .filter(|m| m.match_id == match_id && m.sender_id != reader_id && !m.is_read)
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_transaction_leaves_no_trace() {
        let store = MemoryStore::new();
        let result: AppResult<()> = store.transaction(|repo| {
            repo.insert_user(NewUser {
                email: "ghost@example.com".into(),
                password_hash: "x".into(),
            })?;
            Err(AppError::internal("boom"))
        });
        assert!(result.is_err());
        assert!(store.snapshot().users.is_empty());
    }

    #[test]
    fn duplicate_swipe_is_a_conflict() {
        let store = MemoryStore::new();
        let a = store.seed_user("a@example.com");
        let b = store.seed_user("b@example.com");
        let swipe = || NewSwipe {
            swiper_id: a,
            swiped_id: b,
            action: "LIKE".into(),
        };

        store.transaction(|repo| repo.insert_swipe(swipe())).unwrap();
        let err = store.transaction(|repo| repo.insert_swipe(swipe())).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::SwipeAlreadyExists);
    }
}
