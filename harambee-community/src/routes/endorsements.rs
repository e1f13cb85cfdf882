use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use harambee_shared::clients::db;
use harambee_shared::errors::{AppError, AppResult, ErrorCode};
use harambee_shared::types::auth::AuthUser;
use harambee_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{CreateEndorsementRequest, Endorsement, NewEndorsement};
use crate::schema::{endorsements, profiles};
use crate::services::endorsement_service::{self, EndorsementCount};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RecentEndorsement {
    #[serde(flatten)]
    pub endorsement: Endorsement,
    pub endorser_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EndorsementSummary {
    pub profile_id: Uuid,
    pub total: i64,
    pub counts: Vec<EndorsementCount>,
    pub recent: Vec<RecentEndorsement>,
}

// --- POST /endorsements ---

pub async fn create_endorsement(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEndorsementRequest>,
) -> AppResult<Json<ApiResponse<Endorsement>>> {
    req.validate()?;
    endorsement_service::ensure_not_self(user.id, req.endorsed_id)?;

    let mut conn = db::conn(&state.db)?;

    let endorsed_active = profiles::table
        .find(req.endorsed_id)
        .select(profiles::is_active)
        .first::<bool>(&mut conn)
        .optional()?;
    if endorsed_active != Some(true) {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found"));
    }

    let created = diesel::insert_into(endorsements::table)
        .values(&NewEndorsement {
            endorser_id: user.id,
            endorsed_id: req.endorsed_id,
            endorsement_type: req.endorsement_type.as_str().to_string(),
            message: req.message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty()),
        })
        .on_conflict((
            endorsements::endorser_id,
            endorsements::endorsed_id,
            endorsements::endorsement_type,
        ))
        .do_nothing()
        .get_result::<Endorsement>(&mut conn)
        .optional()?
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::DuplicateEndorsement,
                format!("you already gave a {} endorsement to this member", req.endorsement_type),
            )
        })?;

    tracing::info!(
        endorser = %created.endorser_id,
        endorsed = %created.endorsed_id,
        kind = %created.endorsement_type,
        "endorsement created"
    );
    publisher::publish_endorsement_created(&state.rabbitmq, &created).await;

    Ok(Json(ApiResponse::ok(created)))
}

// --- GET /profiles/:id/endorsements ---

pub async fn list_endorsements(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<EndorsementSummary>>> {
    let mut conn = db::conn(&state.db)?;

    let grouped = endorsements::table
        .filter(endorsements::endorsed_id.eq(profile_id))
        .group_by(endorsements::endorsement_type)
        .select((endorsements::endorsement_type, diesel::dsl::count_star()))
        .load::<(String, i64)>(&mut conn)?;

    let recent = endorsements::table
        .filter(endorsements::endorsed_id.eq(profile_id))
        .order(endorsements::created_at.desc())
        .limit(endorsement_service::RECENT_LIMIT)
        .load::<Endorsement>(&mut conn)?;

    let endorser_ids: Vec<Uuid> = recent.iter().map(|e| e.endorser_id).collect();
    let names: HashMap<Uuid, Option<String>> = profiles::table
        .filter(profiles::id.eq_any(&endorser_ids))
        .select((profiles::id, profiles::display_name))
        .load::<(Uuid, Option<String>)>(&mut conn)?
        .into_iter()
        .collect();

    let counts = endorsement_service::tally(&grouped);
    let recent = recent
        .into_iter()
        .map(|endorsement| RecentEndorsement {
            endorser_name: names.get(&endorsement.endorser_id).cloned().flatten(),
            endorsement,
        })
        .collect();

    Ok(Json(ApiResponse::ok(EndorsementSummary {
        profile_id,
        total: counts.iter().map(|c| c.count).sum(),
        counts,
        recent,
    })))
}
