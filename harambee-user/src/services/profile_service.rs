use chrono::{Datelike, NaiveDate};
use diesel::prelude::*;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use harambee_shared::clients::db::DbConn;
use harambee_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewProfile, Photo, Profile, UpdateProfile};
use crate::schema::profiles;

pub const MINIMUM_AGE: i32 = 18;

/// Returns the caller's profile, creating an empty one on first contact.
/// Profile ids are the identity provider's subject ids.
pub fn ensure_profile(conn: &mut DbConn, id: Uuid) -> AppResult<Profile> {
    let inserted = diesel::insert_into(profiles::table)
        .values(&NewProfile { id })
        .on_conflict(profiles::id)
        .do_nothing()
        .execute(conn)?;

    if inserted > 0 {
        tracing::info!(profile_id = %id, "default profile created");
    }

    let profile = profiles::table.find(id).first::<Profile>(conn)?;
    Ok(profile)
}

/// Loads a profile that exists and hasn't been deactivated.
pub fn active_profile(conn: &mut DbConn, id: Uuid) -> AppResult<Profile> {
    let profile = profiles::table
        .find(id)
        .first::<Profile>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    if !profile.is_active {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found"));
    }
    Ok(profile)
}

pub fn is_adult(date_of_birth: NaiveDate, today: NaiveDate) -> bool {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age >= MINIMUM_AGE
}

pub fn has_changes(update: &UpdateProfile) -> bool {
    update.display_name.is_some()
        || update.date_of_birth.is_some()
        || update.gender.is_some()
        || update.city.is_some()
        || update.country.is_some()
        || update.occupation.is_some()
        || update.education.is_some()
        || update.bio.is_some()
}

/// File extension for an accepted photo content type.
pub fn photo_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Object key for a photo: same bytes under the same profile land on the same key.
pub fn photo_storage_key(profile_id: Uuid, data: &[u8], extension: &str) -> String {
    let digest = hex::encode(Sha256::digest(data));
    format!("photos/{profile_id}/{}.{extension}", &digest[..32])
}

/// Where an upload lands among the photos a profile already holds.
#[derive(Debug)]
pub enum PhotoSlot {
    /// The same bytes are already stored for this profile.
    Existing(Photo),
    Free { primary: bool },
}

pub fn photo_slot(current: &[Photo], key: &str, max_photos: i64) -> AppResult<PhotoSlot> {
    if let Some(photo) = current.iter().find(|p| p.storage_key == key) {
        return Ok(PhotoSlot::Existing(photo.clone()));
    }
    if i64::try_from(current.len()).unwrap_or(i64::MAX) >= max_photos {
        return Err(AppError::new(
            ErrorCode::PhotoLimitReached,
            format!("a profile can hold at most {max_photos} photos"),
        ));
    }
    Ok(PhotoSlot::Free { primary: !current.iter().any(|p| p.is_primary) })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn adulthood_starts_on_the_eighteenth_birthday() {
        let today = date(2026, 10, 17);
        assert!(is_adult(date(2008, 10, 17), today));
        assert!(!is_adult(date(2008, 10, 18), today));
        assert!(is_adult(date(1960, 1, 1), today));
    }

    #[test]
    fn accepted_photo_types() {
        assert_eq!(photo_extension("image/jpeg"), Some("jpg"));
        assert_eq!(photo_extension("image/webp"), Some("webp"));
        assert_eq!(photo_extension("image/gif"), None);
        assert_eq!(photo_extension("application/pdf"), None);
    }

    #[test]
    fn storage_key_is_content_addressed() {
        let id = Uuid::now_v7();
        let a = photo_storage_key(id, b"same bytes", "png");
        let b = photo_storage_key(id, b"same bytes", "png");
        let c = photo_storage_key(id, b"other bytes", "png");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with(&format!("photos/{id}/")));
        assert!(a.ends_with(".png"));
    }

    fn stored(profile_id: Uuid, key: &str, is_primary: bool) -> Photo {
        Photo {
            id: Uuid::now_v7(),
            profile_id,
            url: format!("http://minio/{key}"),
            storage_key: key.into(),
            is_primary,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn duplicate_upload_reuses_the_stored_photo() {
        let id = Uuid::now_v7();
        let key = photo_storage_key(id, b"same bytes", "jpg");
        let current = vec![stored(id, &key, true)];

        match photo_slot(&current, &key, 6).unwrap() {
            PhotoSlot::Existing(photo) => assert_eq!(photo.id, current[0].id),
            other => panic!("expected the existing photo, got {other:?}"),
        }
        // A full profile still gets its duplicate back instead of a limit error.
        assert!(matches!(photo_slot(&current, &key, 1).unwrap(), PhotoSlot::Existing(_)));
    }

    #[test]
    fn first_photo_is_primary_and_limit_is_enforced() {
        let id = Uuid::now_v7();
        assert!(matches!(photo_slot(&[], "k0", 6).unwrap(), PhotoSlot::Free { primary: true }));

        let current: Vec<_> = (0..2).map(|i| stored(id, &format!("k{i}"), i == 0)).collect();
        assert!(matches!(photo_slot(&current, "k9", 6).unwrap(), PhotoSlot::Free { primary: false }));

        let err = photo_slot(&current, "k9", 2).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn empty_update_has_no_changes() {
        assert!(!has_changes(&UpdateProfile::default()));
        let update = UpdateProfile { bio: Some("Lagos born, Houston raised".into()), ..Default::default() };
        assert!(has_changes(&update));
    }
}
