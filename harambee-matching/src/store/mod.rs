use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use harambee_shared::errors::AppResult;
use harambee_shared::types::PaginationParams;

use crate::matching::{normalize, CompatibilityScore, MatchAction, ScoringProfile, Side, UserPair};
use crate::models::{CulturalBackground, Match, PersonalityAssessment, Preferences, Profile};

mod postgres;

#[cfg(test)]
pub(crate) mod memory;

pub use postgres::PgMatchStore;

/// A member with everything scoring and filtering read about them.
#[derive(Debug, Clone)]
pub struct ProfileBundle {
    pub profile: Profile,
    pub cultural_background: Option<CulturalBackground>,
    pub personality: Option<PersonalityAssessment>,
    pub preferences: Option<Preferences>,
}

impl ProfileBundle {
    pub fn to_scoring(&self) -> ScoringProfile {
        normalize(
            &self.profile,
            self.cultural_background.as_ref(),
            self.personality.as_ref(),
        )
    }
}

/// Candidate pool query. Text values are already case-folded.
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    pub viewer: Uuid,
    pub exclude: Vec<Uuid>,
    pub tribes: Vec<String>,
    pub countries: Vec<String>,
    /// Substring of city or country.
    pub location: Option<String>,
    pub born_on_or_before: Option<NaiveDate>,
    pub born_after: Option<NaiveDate>,
    pub gender: Option<String>,
    pub verified_only: bool,
    pub pool_size: i64,
}

/// The persisted part of a [`CompatibilityScore`]; age is recomputed on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchScores {
    pub overall: i32,
    pub cultural: i32,
    pub personality: i32,
    pub location: i32,
}

impl From<CompatibilityScore> for MatchScores {
    fn from(score: CompatibilityScore) -> Self {
        Self {
            overall: score.overall.into(),
            cultural: score.cultural.into(),
            personality: score.personality.into(),
            location: score.location.into(),
        }
    }
}

/// Persistence seam for discovery and match actions.
///
/// Writes that race with another request are expressed as conditional
/// updates: `None` means the row was already in a state where the write no
/// longer applies.
pub trait MatchStore: Send + Sync {
    fn profile(&self, id: Uuid) -> AppResult<Option<ProfileBundle>>;

    fn profiles(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>>;

    fn candidates(&self, filter: &CandidateFilter) -> AppResult<Vec<ProfileBundle>>;

    /// Members the viewer has already liked, passed or super-liked.
    fn acted_on(&self, viewer: Uuid) -> AppResult<HashSet<Uuid>>;

    fn find_match(&self, pair: UserPair) -> AppResult<Option<Match>>;

    /// Inserts a pending row for the pair or refreshes the scores of the existing one.
    fn upsert_scores(&self, pair: UserPair, scores: &MatchScores) -> AppResult<Match>;

    /// Sets one side's action unless the match is already mutual.
    fn set_action(&self, match_id: Uuid, side: Side, action: MatchAction) -> AppResult<Option<Match>>;

    /// Flips `is_mutual` when both sides are positive and it isn't set yet.
    fn mark_mutual(&self, match_id: Uuid, at: DateTime<Utc>) -> AppResult<Option<Match>>;

    /// Opens the conversation for a mutual match. `None` if one already exists.
    fn open_conversation(&self, record: &Match) -> AppResult<Option<Uuid>>;

    fn mutual_matches(&self, user: Uuid, page: &PaginationParams) -> AppResult<(Vec<Match>, u64)>;
}
