use metrics::counter;

use beerfinder_shared::errors::{AppError, AppResult, ErrorCode};

use crate::dto::{MatchView, ProfileView, SwipeOutcome};
use crate::models::{canonical_pair, Match, NewMatch, NewSwipe, SwipeAction};
use crate::store::{Repository, Store};

/// Records `swiper_id`'s decision about `swiped_user_id`. A LIKE answered by
/// an earlier LIKE in the other direction creates the match in the same
/// transaction as the swipe.
pub fn record_swipe(
    store: &impl Store,
    swiper_id: i64,
    swiped_user_id: i64,
    action: SwipeAction,
) -> AppResult<SwipeOutcome> {
    if swiper_id == swiped_user_id {
        return Err(AppError::new(ErrorCode::CannotSwipeSelf, "you cannot swipe yourself"));
    }

    let outcome = store.transaction(|repo| {
        if repo.find_user(swiped_user_id)?.is_none() {
            return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
        }
        if repo.swipe_exists(swiper_id, swiped_user_id)? {
            return Err(AppError::new(ErrorCode::SwipeAlreadyExists, "you have already swiped this user"));
        }

        let swipe = repo.insert_swipe(NewSwipe {
            swiper_id,
            swiped_id: swiped_user_id,
            action: action.as_str().to_string(),
        })?;

        let matched = match action {
            SwipeAction::Like => {
                let reciprocated = repo
                    .find_swipe(swiped_user_id, swiper_id, SwipeAction::Like)?
                    .is_some();
                if reciprocated {
                    Some(create_match(repo, swiper_id, swiped_user_id)?)
                } else {
                    None
                }
            }
            SwipeAction::Pass => None,
        };

        Ok(SwipeOutcome::new(&swipe, action, matched.as_ref()))
    })?;

    counter!("swipes_total", "action" => action.as_str()).increment(1);
    tracing::info!(
        swiper_id = %swiper_id,
        swiped_id = %swiped_user_id,
        action = %action,
        is_match = outcome.is_match,
        "swipe recorded"
    );

    Ok(outcome)
}

/// Creates the match for a pair in canonical order. Runs inside the caller's
/// transaction.
pub fn create_match(repo: &mut dyn Repository, user_a: i64, user_b: i64) -> AppResult<Match> {
    let (user1_id, user2_id) = canonical_pair(user_a, user_b);

    if repo.match_exists(user1_id, user2_id)? {
        return Err(AppError::new(ErrorCode::MatchAlreadyExists, "match already exists"));
    }

    let created = repo.insert_match(NewMatch::between(user1_id, user2_id))?;

    counter!("matches_created_total").increment(1);
    tracing::info!(match_id = %created.id, user1_id = %user1_id, user2_id = %user2_id, "match created");

    Ok(created)
}

fn render(repo: &mut dyn Repository, m: Match, viewer_id: i64) -> AppResult<MatchView> {
    let partner = repo.find_profile_by_user(m.partner_of(viewer_id))?;
    Ok(MatchView {
        match_id: m.id,
        matched_user: partner.map(ProfileView::from),
        is_active: m.is_active,
        created_at: m.created_at,
    })
}

/// Active matches of `user_id`, newest first, each showing the other party.
pub fn list_matches(store: &impl Store, user_id: i64) -> AppResult<Vec<MatchView>> {
    store.transaction(|repo| {
        repo.active_matches_for(user_id)?
            .into_iter()
            .map(|m| render(repo, m, user_id))
            .collect()
    })
}

/// Outsiders get the same answer as for a missing match.
pub fn get_match(store: &impl Store, user_id: i64, match_id: i64) -> AppResult<MatchView> {
    store.transaction(|repo| {
        let found = repo
            .find_match(match_id)?
            .filter(|m| m.involves(user_id))
            .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;
        render(repo, found, user_id)
    })
}

/// Unmatch. Either participant may do it, any number of times.
pub fn deactivate_match(store: &impl Store, user_id: i64, match_id: i64) -> AppResult<MatchView> {
    store.transaction(|repo| {
        let found = repo
            .find_match(match_id)?
            .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;
        if !found.involves(user_id) {
            return Err(AppError::new(ErrorCode::NotMatchParticipant, "you are not part of this match"));
        }

        let updated = if found.is_active {
            tracing::info!(match_id = %match_id, user_id = %user_id, "match deactivated");
            repo.set_match_active(match_id, false)?
        } else {
            found
        };
        render(repo, updated, user_id)
    })
}
