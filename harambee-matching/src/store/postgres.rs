use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use uuid::Uuid;

use harambee_shared::clients::db::{self, DbPool};
use harambee_shared::errors::AppResult;
use harambee_shared::types::PaginationParams;

use super::{CandidateFilter, MatchScores, MatchStore, ProfileBundle};
use crate::matching::{MatchAction, Side, UserPair};
use crate::models::{
    CulturalBackground, Match, NewConversation, NewMatch, PersonalityAssessment, Preferences,
    Profile,
};
use crate::schema::{
    conversations, cultural_backgrounds, matches, personality_assessments, preferences, profiles,
};

diesel::define_sql_function! {
    fn lower(value: Nullable<Text>) -> Nullable<Text>;
}

diesel::define_sql_function! {
    fn btrim(value: Nullable<Text>) -> Nullable<Text>;
}

/// `ILIKE` pattern matching `needle` anywhere, with wildcards in it taken literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub struct PgMatchStore {
    pool: DbPool,
}

impl PgMatchStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl MatchStore for PgMatchStore {
    fn profile(&self, id: Uuid) -> AppResult<Option<ProfileBundle>> {
        let mut conn = db::conn(&self.pool)?;

        let Some(profile) = profiles::table
            .find(id)
            .first::<Profile>(&mut conn)
            .optional()?
        else {
            return Ok(None);
        };

        let cultural_background = cultural_backgrounds::table
            .filter(cultural_backgrounds::profile_id.eq(id))
            .first::<CulturalBackground>(&mut conn)
            .optional()?;

        let personality = personality_assessments::table
            .filter(personality_assessments::profile_id.eq(id))
            .first::<PersonalityAssessment>(&mut conn)
            .optional()?;

        let preferences = preferences::table
            .filter(preferences::profile_id.eq(id))
            .first::<Preferences>(&mut conn)
            .optional()?;

        Ok(Some(ProfileBundle {
            profile,
            cultural_background,
            personality,
            preferences,
        }))
    }

    fn profiles(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = db::conn(&self.pool)?;
        let rows = profiles::table
            .filter(profiles::id.eq_any(ids))
            .load::<Profile>(&mut conn)?;
        Ok(rows)
    }

    fn candidates(&self, filter: &CandidateFilter) -> AppResult<Vec<ProfileBundle>> {
        let mut conn = db::conn(&self.pool)?;

        let mut query = profiles::table
            .filter(profiles::is_active.eq(true))
            .filter(profiles::id.ne(filter.viewer))
            .into_boxed();

        if !filter.exclude.is_empty() {
            query = query.filter(profiles::id.ne_all(filter.exclude.clone()));
        }
        if !filter.tribes.is_empty() {
            let members = cultural_backgrounds::table
                .filter(lower(btrim(cultural_backgrounds::primary_tribe)).eq_any(filter.tribes.clone()))
                .select(cultural_backgrounds::profile_id);
            query = query.filter(profiles::id.eq_any(members));
        }
        if !filter.countries.is_empty() {
            query = query.filter(lower(btrim(profiles::country)).eq_any(filter.countries.clone()));
        }
        if let Some(location) = &filter.location {
            let pattern = contains_pattern(location);
            query = query.filter(
                profiles::city
                    .ilike(pattern.clone())
                    .or(profiles::country.ilike(pattern)),
            );
        }
        if let Some(date) = filter.born_on_or_before {
            query = query.filter(profiles::date_of_birth.le(date));
        }
        if let Some(date) = filter.born_after {
            query = query.filter(profiles::date_of_birth.gt(date));
        }
        if let Some(gender) = &filter.gender {
            query = query.filter(lower(btrim(profiles::gender)).eq(gender.clone()));
        }
        if filter.verified_only {
            query = query.filter(profiles::is_verified.eq(true));
        }

        let rows = query
            .order((profiles::updated_at.desc(), profiles::id.asc()))
            .limit(filter.pool_size)
            .load::<Profile>(&mut conn)?;

        let ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();

        let mut cultures: HashMap<Uuid, CulturalBackground> = cultural_backgrounds::table
            .filter(cultural_backgrounds::profile_id.eq_any(&ids))
            .load::<CulturalBackground>(&mut conn)?
            .into_iter()
            .map(|c| (c.profile_id, c))
            .collect();

        let mut personalities: HashMap<Uuid, PersonalityAssessment> =
            personality_assessments::table
                .filter(personality_assessments::profile_id.eq_any(&ids))
                .load::<PersonalityAssessment>(&mut conn)?
                .into_iter()
                .map(|p| (p.profile_id, p))
                .collect();

        Ok(rows
            .into_iter()
            .map(|profile| ProfileBundle {
                cultural_background: cultures.remove(&profile.id),
                personality: personalities.remove(&profile.id),
                preferences: None,
                profile,
            })
            .collect())
    }

    fn acted_on(&self, viewer: Uuid) -> AppResult<HashSet<Uuid>> {
        let mut conn = db::conn(&self.pool)?;
        let pending = MatchAction::Pending.as_str();

        let as_user1 = matches::table
            .filter(matches::user1_id.eq(viewer))
            .filter(matches::user1_action.ne(pending))
            .select(matches::user2_id)
            .load::<Uuid>(&mut conn)?;

        let as_user2 = matches::table
            .filter(matches::user2_id.eq(viewer))
            .filter(matches::user2_action.ne(pending))
            .select(matches::user1_id)
            .load::<Uuid>(&mut conn)?;

        Ok(as_user1.into_iter().chain(as_user2).collect())
    }

    fn find_match(&self, pair: UserPair) -> AppResult<Option<Match>> {
        let mut conn = db::conn(&self.pool)?;
        let record = matches::table
            .filter(matches::user1_id.eq(pair.user1))
            .filter(matches::user2_id.eq(pair.user2))
            .first::<Match>(&mut conn)
            .optional()?;
        Ok(record)
    }

    fn upsert_scores(&self, pair: UserPair, scores: &MatchScores) -> AppResult<Match> {
        let mut conn = db::conn(&self.pool)?;

        let new_match = NewMatch {
            user1_id: pair.user1,
            user2_id: pair.user2,
            overall_score: scores.overall,
            cultural_score: scores.cultural,
            personality_score: scores.personality,
            location_score: scores.location,
            user1_action: MatchAction::Pending.to_string(),
            user2_action: MatchAction::Pending.to_string(),
        };

        let record = diesel::insert_into(matches::table)
            .values(&new_match)
            .on_conflict((matches::user1_id, matches::user2_id))
            .do_update()
            .set((
                matches::overall_score.eq(scores.overall),
                matches::cultural_score.eq(scores.cultural),
                matches::personality_score.eq(scores.personality),
                matches::location_score.eq(scores.location),
                matches::updated_at.eq(Utc::now()),
            ))
            .get_result::<Match>(&mut conn)?;

        Ok(record)
    }

    fn set_action(&self, match_id: Uuid, side: Side, action: MatchAction) -> AppResult<Option<Match>> {
        let mut conn = db::conn(&self.pool)?;
        let open = matches::table
            .filter(matches::id.eq(match_id))
            .filter(matches::is_mutual.eq(false));
        let now = Utc::now();

        let record = match side {
            Side::User1 => diesel::update(open)
                .set((matches::user1_action.eq(action.as_str()), matches::updated_at.eq(now)))
                .get_result::<Match>(&mut conn)
                .optional()?,
            Side::User2 => diesel::update(open)
                .set((matches::user2_action.eq(action.as_str()), matches::updated_at.eq(now)))
                .get_result::<Match>(&mut conn)
                .optional()?,
        };

        Ok(record)
    }

    fn mark_mutual(&self, match_id: Uuid, at: DateTime<Utc>) -> AppResult<Option<Match>> {
        let mut conn = db::conn(&self.pool)?;
        let positive = [MatchAction::Like.as_str(), MatchAction::SuperLike.as_str()];

        let record = diesel::update(
            matches::table
                .filter(matches::id.eq(match_id))
                .filter(matches::is_mutual.eq(false))
                .filter(matches::user1_action.eq_any(positive))
                .filter(matches::user2_action.eq_any(positive)),
        )
        .set((
            matches::is_mutual.eq(true),
            matches::matched_at.eq(Some(at)),
            matches::updated_at.eq(at),
        ))
        .get_result::<Match>(&mut conn)
        .optional()?;

        Ok(record)
    }

    fn open_conversation(&self, record: &Match) -> AppResult<Option<Uuid>> {
        let mut conn = db::conn(&self.pool)?;

        let conversation_id = diesel::insert_into(conversations::table)
            .values(&NewConversation {
                match_id: record.id,
                user1_id: record.user1_id,
                user2_id: record.user2_id,
            })
            .on_conflict(conversations::match_id)
            .do_nothing()
            .returning(conversations::id)
            .get_result::<Uuid>(&mut conn)
            .optional()?;

        Ok(conversation_id)
    }

    fn mutual_matches(&self, user: Uuid, page: &PaginationParams) -> AppResult<(Vec<Match>, u64)> {
        let mut conn = db::conn(&self.pool)?;

        let total: i64 = matches::table
            .filter(matches::is_mutual.eq(true))
            .filter(matches::user1_id.eq(user).or(matches::user2_id.eq(user)))
            .count()
            .get_result(&mut conn)?;

        let items = matches::table
            .filter(matches::is_mutual.eq(true))
            .filter(matches::user1_id.eq(user).or(matches::user2_id.eq(user)))
            .order((matches::matched_at.desc(), matches::id.asc()))
            .offset(page.offset())
            .limit(page.limit() as i64)
            .load::<Match>(&mut conn)?;

        Ok((items, total.max(0) as u64))
    }
}
