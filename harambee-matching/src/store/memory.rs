//! In-process [`MatchStore`] used by the service tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use harambee_shared::errors::AppResult;
use harambee_shared::types::PaginationParams;

use super::{CandidateFilter, MatchScores, MatchStore, ProfileBundle};
use crate::matching::normalize::fold;
use crate::matching::{MatchAction, Side, UserPair};
use crate::models::{Match, Profile};

#[derive(Default)]
struct State {
    profiles: Vec<ProfileBundle>,
    matches: Vec<Match>,
    conversations: HashMap<Uuid, Uuid>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn with_profiles(profiles: Vec<ProfileBundle>) -> Self {
        Self {
            state: Mutex::new(State {
                profiles,
                ..Default::default()
            }),
        }
    }

    pub fn match_count(&self) -> usize {
        self.state.lock().unwrap().matches.len()
    }

    pub fn conversation_count(&self) -> usize {
        self.state.lock().unwrap().conversations.len()
    }

    fn update<F>(&self, match_id: Uuid, apply: F) -> Option<Match>
    where
        F: FnOnce(&mut Match) -> bool,
    {
        let mut state = self.state.lock().unwrap();
        let record = state.matches.iter_mut().find(|m| m.id == match_id)?;
        apply(record).then(|| record.clone())
    }
}

fn passes(filter: &CandidateFilter, bundle: &ProfileBundle) -> bool {
    let p = &bundle.profile;
    if !p.is_active || p.id == filter.viewer || filter.exclude.contains(&p.id) {
        return false;
    }
    if filter.verified_only && !p.is_verified {
        return false;
    }
    if let Some(gender) = &filter.gender {
        if fold(p.gender.as_deref()).as_ref() != Some(gender) {
            return false;
        }
    }
    if let Some(limit) = filter.born_on_or_before {
        if !p.date_of_birth.is_some_and(|dob| dob <= limit) {
            return false;
        }
    }
    if let Some(limit) = filter.born_after {
        if !p.date_of_birth.is_some_and(|dob| dob > limit) {
            return false;
        }
    }
    if !filter.tribes.is_empty() {
        let tribe = bundle
            .cultural_background
            .as_ref()
            .and_then(|c| fold(c.primary_tribe.as_deref()));
        if !tribe.is_some_and(|t| filter.tribes.contains(&t)) {
            return false;
        }
    }
    if !filter.countries.is_empty() {
        let country = fold(p.country.as_deref());
        if !country.is_some_and(|c| filter.countries.contains(&c)) {
            return false;
        }
    }
    if let Some(needle) = &filter.location {
        let needle = needle.to_lowercase();
        let hit = [&p.city, &p.country]
            .into_iter()
            .flatten()
            .any(|v| v.to_lowercase().contains(&needle));
        if !hit {
            return false;
        }
    }
    true
}

impl MatchStore for InMemoryStore {
    fn profile(&self, id: Uuid) -> AppResult<Option<ProfileBundle>> {
        let state = self.state.lock().unwrap();
        Ok(state.profiles.iter().find(|b| b.profile.id == id).cloned())
    }

    fn profiles(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .profiles
            .iter()
            .filter(|b| ids.contains(&b.profile.id))
            .map(|b| b.profile.clone())
            .collect())
    }

    fn candidates(&self, filter: &CandidateFilter) -> AppResult<Vec<ProfileBundle>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .profiles
            .iter()
            .filter(|b| passes(filter, b))
            .take(filter.pool_size.max(0) as usize)
            .map(|b| ProfileBundle {
                preferences: None,
                ..b.clone()
            })
            .collect())
    }

    fn acted_on(&self, viewer: Uuid) -> AppResult<HashSet<Uuid>> {
        let state = self.state.lock().unwrap();
        let pending = MatchAction::Pending.as_str();
        Ok(state
            .matches
            .iter()
            .filter_map(|m| {
                if m.user1_id == viewer && m.user1_action != pending {
                    Some(m.user2_id)
                } else if m.user2_id == viewer && m.user2_action != pending {
                    Some(m.user1_id)
                } else {
                    None
                }
            })
            .collect())
    }

    fn find_match(&self, pair: UserPair) -> AppResult<Option<Match>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .matches
            .iter()
            .find(|m| m.user1_id == pair.user1 && m.user2_id == pair.user2)
            .cloned())
    }

    fn upsert_scores(&self, pair: UserPair, scores: &MatchScores) -> AppResult<Match> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();

        if let Some(existing) = state
            .matches
            .iter_mut()
            .find(|m| m.user1_id == pair.user1 && m.user2_id == pair.user2)
        {
            existing.overall_score = scores.overall;
            existing.cultural_score = scores.cultural;
            existing.personality_score = scores.personality;
            existing.location_score = scores.location;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let record = Match {
            id: Uuid::now_v7(),
            user1_id: pair.user1,
            user2_id: pair.user2,
            overall_score: scores.overall,
            cultural_score: scores.cultural,
            personality_score: scores.personality,
            location_score: scores.location,
            user1_action: MatchAction::Pending.to_string(),
            user2_action: MatchAction::Pending.to_string(),
            is_mutual: false,
            matched_at: None,
            created_at: now,
            updated_at: now,
        };
        state.matches.push(record.clone());
        Ok(record)
    }

    fn set_action(&self, match_id: Uuid, side: Side, action: MatchAction) -> AppResult<Option<Match>> {
        Ok(self.update(match_id, |m| {
            if m.is_mutual {
                return false;
            }
            match side {
                Side::User1 => m.user1_action = action.to_string(),
                Side::User2 => m.user2_action = action.to_string(),
            }
            m.updated_at = Utc::now();
            true
        }))
    }

    fn mark_mutual(&self, match_id: Uuid, at: DateTime<Utc>) -> AppResult<Option<Match>> {
        Ok(self.update(match_id, |m| {
            if m.is_mutual || !m.action_state().both_positive() {
                return false;
            }
            m.is_mutual = true;
            m.matched_at = Some(at);
            m.updated_at = at;
            true
        }))
    }

    fn open_conversation(&self, record: &Match) -> AppResult<Option<Uuid>> {
        let mut state = self.state.lock().unwrap();
        if state.conversations.contains_key(&record.id) {
            return Ok(None);
        }
        let id = Uuid::now_v7();
        state.conversations.insert(record.id, id);
        Ok(Some(id))
    }

    fn mutual_matches(&self, user: Uuid, page: &PaginationParams) -> AppResult<(Vec<Match>, u64)> {
        let state = self.state.lock().unwrap();
        let mut mine: Vec<Match> = state
            .matches
            .iter()
            .filter(|m| m.is_mutual && (m.user1_id == user || m.user2_id == user))
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.matched_at.cmp(&a.matched_at).then(a.id.cmp(&b.id)));

        let total = mine.len() as u64;
        let items = mine
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }
}
