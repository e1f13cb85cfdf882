use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::matching::actions::{ActionState, MatchAction};
use crate::schema::{
    conversations, cultural_backgrounds, matches, personality_assessments, preferences, profiles,
};

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub bio: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub last_active_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- CulturalBackground ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = cultural_backgrounds)]
pub struct CulturalBackground {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub primary_tribe: Option<String>,
    pub secondary_tribes: Vec<String>,
    pub birth_country: Option<String>,
    pub languages_spoken: Vec<String>,
    pub language_fluency: serde_json::Value,
    pub religion: Option<String>,
    pub religious_importance: Option<i32>,
    pub traditional_values_importance: Option<i32>,
    pub family_involvement_importance: Option<i32>,
    pub cultural_practices: serde_json::Value,
    pub dietary_restrictions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- PersonalityAssessment ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = personality_assessments)]
pub struct PersonalityAssessment {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub openness: Option<f64>,
    pub conscientiousness: Option<f64>,
    pub extraversion: Option<f64>,
    pub agreeableness: Option<f64>,
    pub neuroticism: Option<f64>,
    pub completed_at: DateTime<Utc>,
}

// --- Preferences ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = preferences)]
pub struct Preferences {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub interested_in: Option<String>,
    pub preferred_tribes: Vec<String>,
    pub preferred_countries: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub overall_score: i32,
    pub cultural_score: i32,
    pub personality_score: i32,
    pub location_score: i32,
    pub user1_action: String,
    pub user2_action: String,
    pub is_mutual: bool,
    pub matched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// Parsed per-side actions. Unknown values stored by hand are read as pending.
    pub fn action_state(&self) -> ActionState {
        ActionState {
            user1: self.user1_action.parse().unwrap_or(MatchAction::Pending),
            user2: self.user2_action.parse().unwrap_or(MatchAction::Pending),
            is_mutual: self.is_mutual,
        }
    }

    pub fn partner_of(&self, user_id: Uuid) -> Uuid {
        if self.user1_id == user_id {
            self.user2_id
        } else {
            self.user1_id
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub overall_score: i32,
    pub cultural_score: i32,
    pub personality_score: i32,
    pub location_score: i32,
    pub user1_action: String,
    pub user2_action: String,
}

// --- Conversation ---

#[derive(Debug, Insertable)]
#[diesel(table_name = conversations)]
pub struct NewConversation {
    pub match_id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
}
