use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use harambee_shared::errors::AppResult;
use harambee_shared::types::auth::AuthUser;
use harambee_shared::types::ApiResponse;

use crate::matching::scoring::age_on;
use crate::matching::CompatibilityScore;
use crate::services::match_service::{self, DiscoverQuery, ScoredCandidate};
use crate::store::ProfileBundle;
use crate::AppState;

/// What a viewer sees of a candidate.
#[derive(Debug, Serialize)]
pub struct CandidateView {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub age: Option<u32>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub occupation: Option<String>,
    pub bio: Option<String>,
    pub is_verified: bool,
    pub primary_tribe: Option<String>,
    pub languages_spoken: Vec<String>,
}

impl CandidateView {
    fn from_bundle(bundle: &ProfileBundle, today: NaiveDate) -> Self {
        let ProfileBundle {
            profile,
            cultural_background,
            ..
        } = bundle;
        Self {
            id: profile.id,
            display_name: profile.display_name.clone(),
            age: profile.date_of_birth.map(|dob| age_on(dob, today)),
            city: profile.city.clone(),
            country: profile.country.clone(),
            occupation: profile.occupation.clone(),
            bio: profile.bio.clone(),
            is_verified: profile.is_verified,
            primary_tribe: cultural_background.as_ref().and_then(|c| c.primary_tribe.clone()),
            languages_spoken: cultural_background
                .as_ref()
                .map(|c| c.languages_spoken.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiscoverScores {
    pub overall: u8,
    pub cultural: u8,
    pub personality: u8,
    pub location: u8,
}

impl From<CompatibilityScore> for DiscoverScores {
    fn from(s: CompatibilityScore) -> Self {
        Self {
            overall: s.overall,
            cultural: s.cultural,
            personality: s.personality,
            location: s.location,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiscoverItem {
    pub profile: CandidateView,
    pub compatibility: DiscoverScores,
}

#[derive(Debug, Serialize)]
pub struct SuggestionItem {
    pub profile: CandidateView,
    pub compatibility: CompatibilityScore,
}

// --- GET /discover ---

pub async fn discover(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<DiscoverQuery>,
) -> AppResult<Json<ApiResponse<Vec<DiscoverItem>>>> {
    let today = Utc::now().date_naive();
    let found = match_service::discover(
        state.store.as_ref(),
        user.id,
        &query,
        &state.config.discover_settings(),
        today,
        true,
    )?;

    tracing::info!(viewer = %user.id, candidates = found.len(), "discover served");

    let items = found
        .iter()
        .map(|ScoredCandidate { candidate, score }| DiscoverItem {
            profile: CandidateView::from_bundle(candidate, today),
            compatibility: DiscoverScores::from(*score),
        })
        .collect();

    Ok(Json(ApiResponse::ok(items)))
}

// --- GET /suggestions ---

pub async fn suggestions(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<DiscoverQuery>,
) -> AppResult<Json<ApiResponse<Vec<SuggestionItem>>>> {
    let today = Utc::now().date_naive();
    // Only the page size is taken from the query; the pool follows stored preferences.
    let query = DiscoverQuery {
        limit: query.limit,
        ..Default::default()
    };
    let found = match_service::discover(
        state.store.as_ref(),
        user.id,
        &query,
        &state.config.discover_settings(),
        today,
        false,
    )?;

    let items = found
        .iter()
        .map(|ScoredCandidate { candidate, score }| SuggestionItem {
            profile: CandidateView::from_bundle(candidate, today),
            compatibility: *score,
        })
        .collect();

    Ok(Json(ApiResponse::ok(items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::testkit::{culture_row, profile_row};

    #[test]
    fn candidate_view_reports_age_and_tribe() {
        let mut profile = profile_row();
        profile.date_of_birth = NaiveDate::from_ymd_opt(1996, 12, 1);
        let mut culture = culture_row(profile.id);
        culture.primary_tribe = Some("Akan".into());
        culture.languages_spoken = vec!["Twi".into(), "English".into()];
        let bundle = ProfileBundle {
            profile,
            cultural_background: Some(culture),
            personality: None,
            preferences: None,
        };

        let view = CandidateView::from_bundle(&bundle, NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
        assert_eq!(view.age, Some(29));
        assert_eq!(view.primary_tribe.as_deref(), Some("Akan"));
        assert_eq!(view.languages_spoken.len(), 2);
    }

    #[test]
    fn discover_payload_omits_age_score() {
        let score = CompatibilityScore { overall: 76, cultural: 62, personality: 70, location: 100, age: 100 };
        let value = serde_json::to_value(DiscoverScores::from(score)).unwrap();
        assert_eq!(value["overall"], 76);
        assert!(value.get("age").is_none());
    }
}
