use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use beerfinder_shared::clients::db::DbPool;
use beerfinder_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{
    Match, Message, NewMatch, NewMessage, NewProfile, NewSwipe, NewUser, Profile, ProfileChanges,
    Swipe, SwipeAction, User,
};
use crate::schema::{matches, messages, profiles, swipes, users};

use super::{Repository, Store};

/// Postgres-backed store over the shared r2d2 pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Round-trips a trivial query; used by the health probe.
    pub fn ping(&self) -> AppResult<()> {
        let mut conn = self.pool.get().map_err(|e| AppError::internal(e.to_string()))?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }
}

impl Store for PgStore {
    fn transaction<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut dyn Repository) -> AppResult<T>,
    {
        let mut pooled = self.pool.get().map_err(|e| AppError::internal(e.to_string()))?;
        let conn: &mut PgConnection = &mut pooled;
        conn.transaction::<T, AppError, _>(|conn| {
            let mut repo = PgRepository { conn };
            f(&mut repo)
        })
    }
}

struct PgRepository<'a> {
    conn: &'a mut PgConnection,
}

/// Turns a unique-constraint violation into a domain conflict; everything
/// else stays a database error.
fn conflict_on_unique(err: DieselError, code: ErrorCode, message: &str) -> AppError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => AppError::new(code, message),
        other => AppError::Database(other),
    }
}

impl Repository for PgRepository<'_> {
    fn insert_user(&mut self, user: NewUser) -> AppResult<User> {
        diesel::insert_into(users::table)
            .values(&user)
            .get_result::<User>(self.conn)
            .map_err(|e| conflict_on_unique(e, ErrorCode::EmailAlreadyExists, "email is already registered"))
    }

    fn find_user(&mut self, user_id: i64) -> AppResult<Option<User>> {
        Ok(users::table.find(user_id).first::<User>(self.conn).optional()?)
    }

    fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
        Ok(users::table
            .filter(users::email.eq(email))
            .first::<User>(self.conn)
            .optional()?)
    }

    fn email_exists(&mut self, email: &str) -> AppResult<bool> {
        Ok(diesel::select(diesel::dsl::exists(users::table.filter(users::email.eq(email))))
            .get_result::<bool>(self.conn)?)
    }

    fn insert_profile(&mut self, profile: NewProfile) -> AppResult<Profile> {
        Ok(diesel::insert_into(profiles::table)
            .values(&profile)
            .get_result::<Profile>(self.conn)?)
    }

    fn find_profile_by_user(&mut self, user_id: i64) -> AppResult<Option<Profile>> {
        Ok(profiles::table
            .filter(profiles::user_id.eq(user_id))
            .first::<Profile>(self.conn)
            .optional()?)
    }

    fn update_profile(&mut self, user_id: i64, changes: &ProfileChanges) -> AppResult<Profile> {
        diesel::update(profiles::table.filter(profiles::user_id.eq(user_id)))
            .set((changes, profiles::updated_at.eq(Utc::now())))
            .get_result::<Profile>(self.conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
    }

    fn set_profile_photo(&mut self, user_id: i64, photo: Option<&str>) -> AppResult<Profile> {
        diesel::update(profiles::table.filter(profiles::user_id.eq(user_id)))
            .set((
                profiles::profile_photo.eq(photo),
                profiles::updated_at.eq(Utc::now()),
            ))
            .get_result::<Profile>(self.conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
    }

    fn discover_candidates(
        &mut self,
        user_id: i64,
        min_age: Option<i32>,
        max_age: Option<i32>,
    ) -> AppResult<Vec<Profile>> {
        let swiped: Vec<i64> = swipes::table
            .filter(swipes::swiper_id.eq(user_id))
            .select(swipes::swiped_id)
            .load(self.conn)?;

        let mut query = profiles::table
            .filter(profiles::user_id.ne(user_id))
            .filter(profiles::user_id.ne_all(swiped))
            .into_boxed();

        // NULL ages fail both comparisons, so bounded searches drop them.
        if let Some(min) = min_age {
            query = query.filter(profiles::age.ge(min));
        }
        if let Some(max) = max_age {
            query = query.filter(profiles::age.le(max));
        }

        Ok(query.order(profiles::id.asc()).load::<Profile>(self.conn)?)
    }

    fn swipe_exists(&mut self, swiper_id: i64, swiped_id: i64) -> AppResult<bool> {
        Ok(diesel::select(diesel::dsl::exists(
            swipes::table
                .filter(swipes::swiper_id.eq(swiper_id))
                .filter(swipes::swiped_id.eq(swiped_id)),
        ))
        .get_result::<bool>(self.conn)?)
    }

    fn find_swipe(&mut self, swiper_id: i64, swiped_id: i64, action: SwipeAction) -> AppResult<Option<Swipe>> {
        Ok(swipes::table
            .filter(swipes::swiper_id.eq(swiper_id))
            .filter(swipes::swiped_id.eq(swiped_id))
            .filter(swipes::action.eq(action.as_str()))
            .first::<Swipe>(self.conn)
            .optional()?)
    }

    fn insert_swipe(&mut self, swipe: NewSwipe) -> AppResult<Swipe> {
        diesel::insert_into(swipes::table)
            .values(&swipe)
            .get_result::<Swipe>(self.conn)
            .map_err(|e| conflict_on_unique(e, ErrorCode::SwipeAlreadyExists, "you have already swiped this user"))
    }

    fn match_exists(&mut self, user1_id: i64, user2_id: i64) -> AppResult<bool> {
        Ok(diesel::select(diesel::dsl::exists(
            matches::table
                .filter(matches::user1_id.eq(user1_id))
                .filter(matches::user2_id.eq(user2_id)),
        ))
        .get_result::<bool>(self.conn)?)
    }

    fn insert_match(&mut self, new_match: NewMatch) -> AppResult<Match> {
        diesel::insert_into(matches::table)
            .values(&new_match)
            .get_result::<Match>(self.conn)
            .map_err(|e| conflict_on_unique(e, ErrorCode::MatchAlreadyExists, "match already exists"))
    }

    fn find_match(&mut self, match_id: i64) -> AppResult<Option<Match>> {
        Ok(matches::table.find(match_id).first::<Match>(self.conn).optional()?)
    }

    fn active_matches_for(&mut self, user_id: i64) -> AppResult<Vec<Match>> {
        Ok(matches::table
            .filter(matches::is_active.eq(true))
            .filter(matches::user1_id.eq(user_id).or(matches::user2_id.eq(user_id)))
            .order((matches::created_at.desc(), matches::id.desc()))
            .load::<Match>(self.conn)?)
    }

    fn set_match_active(&mut self, match_id: i64, active: bool) -> AppResult<Match> {
        diesel::update(matches::table.find(match_id))
            .set(matches::is_active.eq(active))
            .get_result::<Match>(self.conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))
    }

    fn insert_message(&mut self, message: NewMessage) -> AppResult<Message> {
        Ok(diesel::insert_into(messages::table)
            .values(&message)
            .get_result::<Message>(self.conn)?)
    }

    fn messages_for_match(&mut self, match_id: i64) -> AppResult<Vec<Message>> {
        Ok(messages::table
            .filter(messages::match_id.eq(match_id))
            .order((messages::created_at.asc(), messages::id.asc()))
            .load::<Message>(self.conn)?)
    }

    fn mark_read(&mut self, match_id: i64, reader_id: i64) -> AppResult<usize> {
        Ok(diesel::update(
            messages::table
                .filter(messages::match_id.eq(match_id))
                .filter(messages::sender_id.ne(reader_id))
                .filter(messages::is_read.eq(false)),
        )
        .set(messages::is_read.eq(true))
        .execute(self.conn)?)
    }

    fn count_unread(&mut self, match_id: i64, reader_id: i64) -> AppResult<i64> {
        Ok(messages::table
            .filter(messages::match_id.eq(match_id))
            .filter(messages::sender_id.ne(reader_id))
            .filter(messages::is_read.eq(false))
            .count()
            .get_result::<i64>(self.conn)?)
    }
}
