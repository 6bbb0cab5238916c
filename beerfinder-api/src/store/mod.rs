//! Persistence seam. Services talk to a [`Store`], which hands them a
//! [`Repository`] scoped to a single database transaction.

pub mod pg;

#[cfg(test)]
pub mod memory;

use beerfinder_shared::errors::AppResult;

use crate::models::{
    Match, Message, NewMatch, NewMessage, NewProfile, NewSwipe, NewUser, Profile, ProfileChanges,
    Swipe, SwipeAction, User,
};

pub use pg::PgStore;

/// Row-level operations available inside a transaction.
pub trait Repository {
    // users
    fn insert_user(&mut self, user: NewUser) -> AppResult<User>;
    fn find_user(&mut self, user_id: i64) -> AppResult<Option<User>>;
    fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>>;
    fn email_exists(&mut self, email: &str) -> AppResult<bool>;

    // profiles
    fn insert_profile(&mut self, profile: NewProfile) -> AppResult<Profile>;
    fn find_profile_by_user(&mut self, user_id: i64) -> AppResult<Option<Profile>>;
    fn update_profile(&mut self, user_id: i64, changes: &ProfileChanges) -> AppResult<Profile>;
    fn set_profile_photo(&mut self, user_id: i64, photo: Option<&str>) -> AppResult<Profile>;
    /// Profiles other than `user_id`'s own, minus everyone `user_id` has
    /// swiped, within the inclusive age bounds. Ordered by profile id.
    fn discover_candidates(
        &mut self,
        user_id: i64,
        min_age: Option<i32>,
        max_age: Option<i32>,
    ) -> AppResult<Vec<Profile>>;

    // swipes
    fn swipe_exists(&mut self, swiper_id: i64, swiped_id: i64) -> AppResult<bool>;
    fn find_swipe(&mut self, swiper_id: i64, swiped_id: i64, action: SwipeAction) -> AppResult<Option<Swipe>>;
    fn insert_swipe(&mut self, swipe: NewSwipe) -> AppResult<Swipe>;

    // matches
    fn match_exists(&mut self, user1_id: i64, user2_id: i64) -> AppResult<bool>;
    fn insert_match(&mut self, new_match: NewMatch) -> AppResult<Match>;
    fn find_match(&mut self, match_id: i64) -> AppResult<Option<Match>>;
    fn active_matches_for(&mut self, user_id: i64) -> AppResult<Vec<Match>>;
    fn set_match_active(&mut self, match_id: i64, active: bool) -> AppResult<Match>;

    // messages
    fn insert_message(&mut self, message: NewMessage) -> AppResult<Message>;
    /// Ascending by `(created_at, id)`.
    fn messages_for_match(&mut self, match_id: i64) -> AppResult<Vec<Message>>;
    /// Flags every unread message in the match not sent by `reader_id`.
    fn mark_read(&mut self, match_id: i64, reader_id: i64) -> AppResult<usize>;
    fn count_unread(&mut self, match_id: i64, reader_id: i64) -> AppResult<i64>;
}

/// Runs closures against a [`Repository`] inside one transaction. An `Err`
/// from the closure rolls back every write it made.
pub trait Store: Send + Sync {
    fn transaction<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut dyn Repository) -> AppResult<T>;
}
