use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use harambee_shared::errors::{AppError, AppResult, ErrorCode};

use crate::matching::normalize::fold;
use crate::matching::{
    reconcile, score, CompatibilityScore, RequestedAction, Transition, UserPair,
};
use crate::models::Match;
use crate::store::{CandidateFilter, MatchScores, MatchStore, ProfileBundle};

/// `interested_in` values that mean "no gender filter".
const ANY_GENDER: [&str; 3] = ["any", "all", "everyone"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoverQuery {
    pub limit: Option<usize>,
    pub tribe: Option<String>,
    pub location: Option<String>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub verified_only: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
pub struct DiscoverSettings {
    pub min_compatibility: u8,
    pub default_limit: usize,
    pub max_limit: usize,
    pub pool_size: i64,
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: ProfileBundle,
    pub score: CompatibilityScore,
}

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub record: Match,
    pub became_mutual: bool,
    pub conversation_id: Option<Uuid>,
}

/// Scores the viewer's candidate pool and returns the best matches.
///
/// With `persist` set, a match row is written for every returned candidate:
/// a fresh pending row, or refreshed scores on an existing one.
pub fn discover(
    store: &dyn MatchStore,
    viewer_id: Uuid,
    query: &DiscoverQuery,
    settings: &DiscoverSettings,
    today: NaiveDate,
    persist: bool,
) -> AppResult<Vec<ScoredCandidate>> {
    let viewer = active_profile(store, viewer_id, ErrorCode::ProfileNotFound)?;

    let mut filter = candidate_filter(&viewer, query, today, settings.pool_size);
    filter.exclude = store.acted_on(viewer_id)?.into_iter().collect();

    let pool = store.candidates(&filter)?;
    metrics::counter!("matching_candidates_scored_total").increment(pool.len() as u64);

    let me = viewer.to_scoring();
    let mut scored: Vec<ScoredCandidate> = pool
        .into_iter()
        .map(|candidate| {
            let score = score(&me, &candidate.to_scoring(), today);
            ScoredCandidate { candidate, score }
        })
        .filter(|c| c.score.overall >= settings.min_compatibility)
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .overall
            .cmp(&a.score.overall)
            .then(a.candidate.profile.id.cmp(&b.candidate.profile.id))
    });

    let limit = query
        .limit
        .unwrap_or(settings.default_limit)
        .clamp(1, settings.max_limit.max(1));
    scored.truncate(limit);

    if persist {
        for candidate in &scored {
            if let Some(pair) = UserPair::new(viewer_id, candidate.candidate.profile.id) {
                store.upsert_scores(pair, &MatchScores::from(candidate.score))?;
            }
        }
    }

    tracing::debug!(
        viewer = %viewer_id,
        returned = scored.len(),
        persist,
        "candidates scored"
    );

    Ok(scored)
}

/// Records `actor`'s action on `target` and reports whether it completed a mutual match.
pub fn apply_action(
    store: &dyn MatchStore,
    actor: Uuid,
    target: Uuid,
    requested: RequestedAction,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> AppResult<ActionOutcome> {
    let pair = UserPair::new(actor, target)
        .ok_or_else(|| AppError::new(ErrorCode::CannotActOnSelf, "cannot act on your own profile"))?;
    let side = pair
        .side_of(actor)
        .ok_or_else(|| AppError::internal("actor missing from pair"))?;

    let actor_bundle = active_profile(store, actor, ErrorCode::ProfileNotFound)?;
    let target_bundle = store
        .profile(target)?
        .filter(|b| b.profile.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let existing = match store.find_match(pair)? {
        Some(record) => record,
        None => {
            let fresh = score(&actor_bundle.to_scoring(), &target_bundle.to_scoring(), today);
            store.upsert_scores(pair, &MatchScores::from(fresh))?
        }
    };

    let next = match reconcile(existing.action_state(), side, requested) {
        Transition::Unchanged if existing.is_mutual => return reopen(store, existing),
        Transition::Unchanged => return Ok(unchanged(existing)),
        Transition::Apply(next) => next,
    };

    let Some(updated) = store.set_action(existing.id, side, next.action(side))? else {
        // Another request made the pair mutual first.
        return current(store, pair);
    };

    if !updated.action_state().both_positive() {
        tracing::info!(match_id = %updated.id, actor = %actor, action = %next.action(side), "match action recorded");
        return Ok(unchanged(updated));
    }

    let Some(mutual) = store.mark_mutual(updated.id, now)? else {
        return current(store, pair);
    };

    let conversation_id = store.open_conversation(&mutual)?;
    metrics::counter!("matching_mutual_total").increment(1);
    tracing::info!(
        match_id = %mutual.id,
        user1 = %mutual.user1_id,
        user2 = %mutual.user2_id,
        "mutual match"
    );

    Ok(ActionOutcome {
        record: mutual,
        became_mutual: true,
        conversation_id,
    })
}

fn unchanged(record: Match) -> ActionOutcome {
    ActionOutcome {
        record,
        became_mutual: false,
        conversation_id: None,
    }
}

/// A mutual match whose conversation insert failed earlier gets it on the
/// next action from either side.
fn reopen(store: &dyn MatchStore, record: Match) -> AppResult<ActionOutcome> {
    let Some(conversation_id) = store.open_conversation(&record)? else {
        return Ok(unchanged(record));
    };
    tracing::warn!(match_id = %record.id, conversation = %conversation_id, "opened missing conversation for mutual match");
    Ok(ActionOutcome {
        record,
        became_mutual: true,
        conversation_id: Some(conversation_id),
    })
}

fn current(store: &dyn MatchStore, pair: UserPair) -> AppResult<ActionOutcome> {
    let record = store
        .find_match(pair)?
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;
    Ok(unchanged(record))
}

fn active_profile(store: &dyn MatchStore, id: Uuid, missing: ErrorCode) -> AppResult<ProfileBundle> {
    let bundle = store
        .profile(id)?
        .ok_or_else(|| AppError::new(missing, "profile not found"))?;
    if !bundle.profile.is_active {
        return Err(AppError::new(ErrorCode::ProfileInactive, "profile is deactivated"));
    }
    Ok(bundle)
}

/// Stored preferences with the query's overrides on top.
fn candidate_filter(
    viewer: &ProfileBundle,
    query: &DiscoverQuery,
    today: NaiveDate,
    pool_size: i64,
) -> CandidateFilter {
    let prefs = viewer.preferences.as_ref();

    let tribes = match fold(query.tribe.as_deref()) {
        Some(tribe) => vec![tribe],
        None => prefs
            .map(|p| p.preferred_tribes.iter().filter_map(|t| fold(Some(t))).collect())
            .unwrap_or_default(),
    };
    let countries = prefs
        .map(|p| p.preferred_countries.iter().filter_map(|c| fold(Some(c))).collect())
        .unwrap_or_default();

    let min_age = query
        .min_age
        .or_else(|| prefs.and_then(|p| p.min_age).and_then(|a| u32::try_from(a).ok()));
    let max_age = query
        .max_age
        .or_else(|| prefs.and_then(|p| p.max_age).and_then(|a| u32::try_from(a).ok()));
    let (born_on_or_before, born_after) = birth_bounds(min_age, max_age, today);

    let gender = prefs
        .and_then(|p| fold(p.interested_in.as_deref()))
        .filter(|g| !ANY_GENDER.contains(&g.as_str()));

    CandidateFilter {
        viewer: viewer.profile.id,
        exclude: Vec::new(),
        tribes,
        countries,
        location: fold(query.location.as_deref()),
        born_on_or_before,
        born_after,
        gender,
        verified_only: query.verified_only.unwrap_or(false),
        pool_size,
    }
}

/// Turns an age range into date-of-birth bounds as of `today`.
///
/// Age ≥ `min` means born on or before `today - min years`; age ≤ `max`
/// means born strictly after `today - (max + 1) years`.
pub fn birth_bounds(
    min_age: Option<u32>,
    max_age: Option<u32>,
    today: NaiveDate,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let years_back = |years: u32| today.checked_sub_months(Months::new(years.saturating_mul(12)));
    (
        min_age.and_then(years_back),
        max_age.and_then(|max| years_back(max.saturating_add(1))),
    )
}
