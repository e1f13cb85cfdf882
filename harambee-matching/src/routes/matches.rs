use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use harambee_shared::errors::AppResult;
use harambee_shared::types::auth::AuthUser;
use harambee_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::models::Profile;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PartnerSummary {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub is_verified: bool,
}

impl From<&Profile> for PartnerSummary {
    fn from(p: &Profile) -> Self {
        Self {
            id: p.id,
            display_name: p.display_name.clone(),
            city: p.city.clone(),
            country: p.country.clone(),
            is_verified: p.is_verified,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MutualMatchView {
    pub match_id: Uuid,
    pub partner_id: Uuid,
    pub partner: Option<PartnerSummary>,
    pub overall_score: i32,
    pub cultural_score: i32,
    pub personality_score: i32,
    pub location_score: i32,
    pub matched_at: Option<DateTime<Utc>>,
}

// --- GET /matches ---

pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<MutualMatchView>>>> {
    let (records, total) = state.store.mutual_matches(user.id, &params)?;

    let partner_ids: Vec<Uuid> = records.iter().map(|m| m.partner_of(user.id)).collect();
    let partners: HashMap<Uuid, Profile> = state
        .store
        .profiles(&partner_ids)?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let items = records
        .iter()
        .map(|m| {
            let partner_id = m.partner_of(user.id);
            MutualMatchView {
                match_id: m.id,
                partner_id,
                partner: partners.get(&partner_id).map(PartnerSummary::from),
                overall_score: m.overall_score,
                cultural_score: m.cultural_score,
                personality_score: m.personality_score,
                location_score: m.location_score,
                matched_at: m.matched_at,
            }
        })
        .collect();

    Ok(Json(ApiResponse::ok(Paginated::new(items, total, &params))))
}
