use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use validator::Validate;

use harambee_shared::clients::db;
use harambee_shared::errors::AppResult;
use harambee_shared::types::auth::AuthUser;
use harambee_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{
    CulturalBackground, CulturalBackgroundRequest, NewCulturalBackground, NewPersonalityAssessment,
    NewPreferences, PersonalityAssessment, PersonalityRequest, Preferences, PreferencesRequest,
};
use crate::schema::{cultural_backgrounds, personality_assessments, preferences};
use crate::services::profile_service;
use crate::AppState;

// --- PUT /me/cultural-background ---

pub async fn put_cultural_background(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CulturalBackgroundRequest>,
) -> AppResult<Json<ApiResponse<CulturalBackground>>> {
    req.validate()?;

    let mut conn = db::conn(&state.db)?;
    let profile = profile_service::ensure_profile(&mut conn, user.id)?;
    let row = NewCulturalBackground::from_request(profile.id, req, Utc::now());

    let saved = diesel::insert_into(cultural_backgrounds::table)
        .values(&row)
        .on_conflict(cultural_backgrounds::profile_id)
        .do_update()
        .set(&row)
        .get_result::<CulturalBackground>(&mut conn)?;

    publisher::publish_profile_updated(&state.rabbitmq, profile.id, "cultural_background").await;

    Ok(Json(ApiResponse::ok(saved)))
}

// --- PUT /me/personality ---

pub async fn put_personality(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<PersonalityRequest>,
) -> AppResult<Json<ApiResponse<PersonalityAssessment>>> {
    req.validate()?;

    let mut conn = db::conn(&state.db)?;
    let profile = profile_service::ensure_profile(&mut conn, user.id)?;
    let row = NewPersonalityAssessment {
        profile_id: profile.id,
        openness: req.openness,
        conscientiousness: req.conscientiousness,
        extraversion: req.extraversion,
        agreeableness: req.agreeableness,
        neuroticism: req.neuroticism,
        completed_at: Utc::now(),
    };

    let saved = diesel::insert_into(personality_assessments::table)
        .values(&row)
        .on_conflict(personality_assessments::profile_id)
        .do_update()
        .set(&row)
        .get_result::<PersonalityAssessment>(&mut conn)?;

    publisher::publish_profile_updated(&state.rabbitmq, profile.id, "personality").await;

    Ok(Json(ApiResponse::ok(saved)))
}

// --- PUT /me/preferences ---

pub async fn put_preferences(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreferencesRequest>,
) -> AppResult<Json<ApiResponse<Preferences>>> {
    req.validate()?;

    let mut conn = db::conn(&state.db)?;
    let profile = profile_service::ensure_profile(&mut conn, user.id)?;
    let row = NewPreferences {
        profile_id: profile.id,
        min_age: req.min_age,
        max_age: req.max_age,
        interested_in: req.interested_in,
        preferred_tribes: req.preferred_tribes,
        preferred_countries: req.preferred_countries,
        updated_at: Utc::now(),
    };

    let saved = diesel::insert_into(preferences::table)
        .values(&row)
        .on_conflict(preferences::profile_id)
        .do_update()
        .set(&row)
        .get_result::<Preferences>(&mut conn)?;

    publisher::publish_profile_updated(&state.rabbitmq, profile.id, "preferences").await;

    Ok(Json(ApiResponse::ok(saved)))
}
