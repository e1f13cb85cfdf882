use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use harambee_shared::clients::db;
use harambee_shared::errors::{AppError, AppResult, ErrorCode};
use harambee_shared::types::auth::AuthUser;
use harambee_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{CulturalBackground, PersonalityAssessment, Photo, Preferences, Profile, UpdateProfile};
use crate::schema::{cultural_backgrounds, personality_assessments, photos, preferences, profiles};
use crate::services::profile_service;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct OwnProfile {
    #[serde(flatten)]
    pub profile: Profile,
    pub cultural_background: Option<CulturalBackground>,
    pub personality: Option<PersonalityAssessment>,
    pub preferences: Option<Preferences>,
    pub photos: Vec<Photo>,
}

#[derive(Debug, Serialize)]
pub struct PublicProfile {
    #[serde(flatten)]
    pub profile: Profile,
    pub cultural_background: Option<CulturalBackground>,
    pub photos: Vec<Photo>,
}

fn load_photos(conn: &mut db::DbConn, profile_id: Uuid) -> AppResult<Vec<Photo>> {
    let rows = photos::table
        .filter(photos::profile_id.eq(profile_id))
        .order((photos::is_primary.desc(), photos::created_at.asc()))
        .load::<Photo>(conn)?;
    Ok(rows)
}

fn load_culture(conn: &mut db::DbConn, profile_id: Uuid) -> AppResult<Option<CulturalBackground>> {
    let row = cultural_backgrounds::table
        .filter(cultural_backgrounds::profile_id.eq(profile_id))
        .first::<CulturalBackground>(conn)
        .optional()?;
    Ok(row)
}

// --- GET /me ---

pub async fn get_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<OwnProfile>>> {
    let mut conn = db::conn(&state.db)?;

    let profile = profile_service::ensure_profile(&mut conn, user.id)?;
    let cultural_background = load_culture(&mut conn, profile.id)?;
    let personality = personality_assessments::table
        .filter(personality_assessments::profile_id.eq(profile.id))
        .first::<PersonalityAssessment>(&mut conn)
        .optional()?;
    let preferences = preferences::table
        .filter(preferences::profile_id.eq(profile.id))
        .first::<Preferences>(&mut conn)
        .optional()?;
    let photos = load_photos(&mut conn, profile.id)?;

    Ok(Json(ApiResponse::ok(OwnProfile {
        profile,
        cultural_background,
        personality,
        preferences,
        photos,
    })))
}

// --- PATCH /me ---

pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfile>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    payload.validate()?;

    if let Some(dob) = payload.date_of_birth {
        if !profile_service::is_adult(dob, Utc::now().date_naive()) {
            return Err(AppError::new(
                ErrorCode::Underage,
                format!("members must be at least {} years old", profile_service::MINIMUM_AGE),
            ));
        }
    }

    let mut conn = db::conn(&state.db)?;
    let profile = profile_service::ensure_profile(&mut conn, user.id)?;
    if !profile.is_active {
        return Err(AppError::new(ErrorCode::ProfileInactive, "profile is deactivated"));
    }

    if !profile_service::has_changes(&payload) {
        return Ok(Json(ApiResponse::ok(profile)));
    }

    let now = Utc::now();
    let updated = diesel::update(profiles::table.find(profile.id))
        .set((&payload, profiles::updated_at.eq(now), profiles::last_active_at.eq(Some(now))))
        .get_result::<Profile>(&mut conn)?;

    publisher::publish_profile_updated(&state.rabbitmq, updated.id, "profile").await;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- DELETE /me ---

pub async fn deactivate_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = db::conn(&state.db)?;

    let updated = diesel::update(profiles::table.find(user.id))
        .set((profiles::is_active.eq(false), profiles::updated_at.eq(Utc::now())))
        .get_result::<Profile>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    publisher::publish_profile_deactivated(&state.rabbitmq, updated.id).await;

    tracing::info!(profile_id = %updated.id, "profile deactivated");

    Ok(Json(ApiResponse::ok_with_message(updated, "profile deactivated")))
}

// --- GET /profiles/:id ---

pub async fn get_public_profile(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PublicProfile>>> {
    let mut conn = db::conn(&state.db)?;

    let profile = profile_service::active_profile(&mut conn, id)?;
    let cultural_background = load_culture(&mut conn, profile.id)?;
    let photos = load_photos(&mut conn, profile.id)?;

    Ok(Json(ApiResponse::ok(PublicProfile {
        profile,
        cultural_background,
        photos,
    })))
}
