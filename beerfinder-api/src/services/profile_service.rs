use uuid::Uuid;
use validator::Validate;

use beerfinder_shared::clients::storage::PhotoStorage;
use beerfinder_shared::errors::{AppError, AppResult, ErrorCode};

use crate::dto::{ProfileView, UpdateProfileRequest};
use crate::models::{Profile, ProfileChanges};
use crate::services::geo::haversine_km;
use crate::store::{Repository, Store};

/// Optional narrowing for [`discover`]. Age bounds are inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoverFilters {
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub max_distance_km: Option<f64>,
}

fn require_profile(repo: &mut dyn Repository, user_id: i64) -> AppResult<Profile> {
    repo.find_profile_by_user(user_id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

pub fn get_my_profile(store: &impl Store, user_id: i64) -> AppResult<ProfileView> {
    let profile = store.transaction(|repo| require_profile(repo, user_id))?;
    Ok(profile.into())
}

/// Replaces every editable field with the request's values.
pub fn update_my_profile(store: &impl Store, user_id: i64, req: UpdateProfileRequest) -> AppResult<ProfileView> {
    req.validate()?;

    let interests = serde_json::to_value(&req.interests).map_err(|e| AppError::internal(e.to_string()))?;
    let changes = ProfileChanges {
        name: Some(req.name.trim().to_string()),
        age: req.age,
        bio: req.bio,
        occupation: req.occupation,
        interests,
        latitude: req.latitude,
        longitude: req.longitude,
        profile_photo: req.profile_photo,
    };

    let updated = store.transaction(|repo| repo.update_profile(user_id, &changes))?;

    tracing::info!(user_id = %user_id, profile_id = %updated.id, "profile updated");

    Ok(updated.into())
}

/// Candidate profiles for the requester: never their own, never anyone they
/// already swiped. The distance bound only applies when the requester has a
/// position; candidates without one are then dropped.
pub fn discover(store: &impl Store, requester_id: i64, filters: DiscoverFilters) -> AppResult<Vec<ProfileView>> {
    let (me, candidates) = store.transaction(|repo| {
        let me = require_profile(repo, requester_id)?;
        let candidates = repo.discover_candidates(requester_id, filters.min_age, filters.max_age)?;
        Ok((me, candidates))
    })?;

    let origin = me.coordinates();
    let mut views = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let distance = origin
            .zip(candidate.coordinates())
            .map(|((lat1, lon1), (lat2, lon2))| haversine_km(lat1, lon1, lat2, lon2));

        if let (Some(max), Some(_)) = (filters.max_distance_km, origin) {
            match distance {
                Some(d) if d <= max => {}
                _ => continue,
            }
        }

        let mut view = ProfileView::from(candidate);
        view.distance_km = distance;
        views.push(view);
    }

    tracing::debug!(requester_id = %requester_id, results = views.len(), "discovery");

    Ok(views)
}

const ACCEPTED_PHOTO_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// Checks an upload and returns the file extension for its object key.
pub fn validate_photo(content_type: &str, size: usize, max_bytes: usize) -> AppResult<&'static str> {
    let ext = ACCEPTED_PHOTO_TYPES
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(content_type))
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::PhotoRejected,
                "unsupported image format, accepted: jpeg, png, gif, webp",
            )
        })?;

    if size == 0 {
        return Err(AppError::new(ErrorCode::PhotoRejected, "file is empty"));
    }
    if size > max_bytes {
        return Err(AppError::new(
            ErrorCode::PayloadTooLarge,
            format!("file exceeds the {max_bytes} byte limit"),
        ));
    }
    Ok(ext)
}

fn photo_prefix(profile: &Profile) -> String {
    format!("profiles/{}/", profile.id)
}

/// Object key behind `url`, if it is one of this profile's uploads. URLs set
/// by hand through the profile update never resolve to another user's object.
fn owned_photo_key(storage: &dyn PhotoStorage, profile: &Profile, url: &str) -> Option<String> {
    storage
        .key_for_url(url)
        .filter(|key| key.starts_with(&photo_prefix(profile)))
}

/// Validates and stores an uploaded image, then points the profile at it.
pub async fn upload_profile_photo(
    store: &impl Store,
    storage: &dyn PhotoStorage,
    user_id: i64,
    content_type: &str,
    data: Vec<u8>,
    max_bytes: usize,
) -> AppResult<ProfileView> {
    let ext = validate_photo(content_type, data.len(), max_bytes)?;
    let profile = store.transaction(|repo| require_profile(repo, user_id))?;

    let key = format!("{}{}.{}", photo_prefix(&profile), Uuid::now_v7(), ext);
    let url = storage
        .upload(&key, data, content_type)
        .await
        .map_err(|e| AppError::new(ErrorCode::PhotoStorageFailed, e.to_string()))?;

    update_profile_photo(store, storage, user_id, &url).await
}

/// Points the profile at `new_url`, then removes the previous upload.
/// Failing to remove it only leaks the object.
pub async fn update_profile_photo(
    store: &impl Store,
    storage: &dyn PhotoStorage,
    user_id: i64,
    new_url: &str,
) -> AppResult<ProfileView> {
    let (previous, updated) = store.transaction(|repo| {
        let previous = require_profile(repo, user_id)?;
        let updated = repo.set_profile_photo(user_id, Some(new_url))?;
        Ok((previous, updated))
    })?;

    tracing::info!(user_id = %user_id, photo_url = %new_url, "profile photo replaced");

    if let Some(key) = previous
        .profile_photo
        .as_deref()
        .filter(|old| *old != new_url)
        .and_then(|old| owned_photo_key(storage, &previous, old))
    {
        if let Err(e) = storage.delete(&key).await {
            tracing::warn!(user_id = %user_id, key = %key, error = %e, "old profile photo not deleted");
        }
    }

    Ok(updated.into())
}

/// Removes the stored photo and clears the profile's URL. The profile is left
/// untouched if storage refuses the delete. A URL outside the profile's own
/// uploads is only cleared.
pub async fn delete_profile_photo(
    store: &impl Store,
    storage: &dyn PhotoStorage,
    user_id: i64,
) -> AppResult<ProfileView> {
    let current = store.transaction(|repo| require_profile(repo, user_id))?;

    if let Some(key) = current
        .profile_photo
        .as_deref()
        .and_then(|url| owned_photo_key(storage, &current, url))
    {
        storage
            .delete(&key)
            .await
            .map_err(|e| AppError::new(ErrorCode::PhotoStorageFailed, e.to_string()))?;
    }

    let updated = store.transaction(|repo| repo.set_profile_photo(user_id, None))?;

    tracing::info!(user_id = %user_id, "profile photo removed");

    Ok(updated.into())
}
