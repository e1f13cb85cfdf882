use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use harambee_shared::clients::db;
use harambee_shared::errors::{AppError, AppResult, ErrorCode};
use harambee_shared::middleware::AdminUser;
use harambee_shared::types::ApiResponse;

use crate::models::{Profile, UserStatusUpdate};
use crate::schema::{endorsements, matches, messages, profiles, quiz_attempts};
use crate::AppState;

#[derive(Debug, Serialize, PartialEq)]
pub struct PlatformStats {
    pub total_users: i64,
    pub active_users: i64,
    pub verified_users: i64,
    pub total_matches: i64,
    pub mutual_matches: i64,
    pub total_messages: i64,
    pub total_endorsements: i64,
    pub quiz_attempts: i64,
    /// Share of quiz attempts that passed, in percent with one decimal.
    pub quiz_pass_rate: f64,
}

pub fn pass_rate(passed: i64, attempts: i64) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    (passed as f64 * 1000.0 / attempts as f64).round() / 10.0
}

// --- GET /admin/stats ---

pub async fn get_stats(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<PlatformStats>>> {
    let mut conn = db::conn(&state.db)?;

    let total_users: i64 = profiles::table.count().get_result(&mut conn)?;
    let active_users: i64 = profiles::table
        .filter(profiles::is_active.eq(true))
        .count()
        .get_result(&mut conn)?;
    let verified_users: i64 = profiles::table
        .filter(profiles::is_verified.eq(true))
        .count()
        .get_result(&mut conn)?;
    let total_matches: i64 = matches::table.count().get_result(&mut conn)?;
    let mutual_matches: i64 = matches::table
        .filter(matches::is_mutual.eq(true))
        .count()
        .get_result(&mut conn)?;
    let total_messages: i64 = messages::table.count().get_result(&mut conn)?;
    let total_endorsements: i64 = endorsements::table.count().get_result(&mut conn)?;
    let quiz_attempts: i64 = quiz_attempts::table.count().get_result(&mut conn)?;
    let quiz_passed: i64 = quiz_attempts::table
        .filter(quiz_attempts::passed.eq(true))
        .count()
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(PlatformStats {
        total_users,
        active_users,
        verified_users,
        total_matches,
        mutual_matches,
        total_messages,
        total_endorsements,
        quiz_attempts,
        quiz_pass_rate: pass_rate(quiz_passed, quiz_attempts),
    })))
}

// --- PATCH /admin/users/:id/status ---

pub async fn update_user_status(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(profile_id): Path<Uuid>,
    Json(update): Json<UserStatusUpdate>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    if update.is_empty() {
        return Err(AppError::bad_request("provide is_active or is_verified"));
    }

    let mut conn = db::conn(&state.db)?;
    let profile = diesel::update(profiles::table.find(profile_id))
        .set((&update, profiles::updated_at.eq(Utc::now())))
        .get_result::<Profile>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    tracing::info!(
        admin = %admin.id,
        profile_id = %profile.id,
        is_active = profile.is_active,
        is_verified = profile.is_verified,
        "user status changed by admin"
    );

    Ok(Json(ApiResponse::ok(profile)))
}
