use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::schema::{cultural_backgrounds, personality_assessments, photos, preferences, profiles};

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

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub id: Uuid,
}

#[derive(Debug, AsChangeset, Deserialize, Validate, Default)]
#[diesel(table_name = profiles)]
pub struct UpdateProfile {
    #[validate(length(min = 2, max = 50))]
    pub display_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 100))]
    pub occupation: Option<String>,
    #[validate(length(max = 100))]
    pub education: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fluency {
    Native,
    Fluent,
    Conversational,
    Basic,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CulturalBackgroundRequest {
    #[validate(length(max = 100))]
    pub primary_tribe: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub secondary_tribes: Vec<String>,
    #[validate(length(max = 100))]
    pub birth_country: Option<String>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub languages_spoken: Vec<String>,
    #[serde(default)]
    pub language_fluency: HashMap<String, Fluency>,
    #[validate(length(max = 100))]
    pub religion: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub religious_importance: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub traditional_values_importance: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub family_involvement_importance: Option<i32>,
    #[serde(default)]
    pub cultural_practices: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = cultural_backgrounds, treat_none_as_null = true)]
pub struct NewCulturalBackground {
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
    pub updated_at: DateTime<Utc>,
}

impl NewCulturalBackground {
    pub fn from_request(profile_id: Uuid, req: CulturalBackgroundRequest, now: DateTime<Utc>) -> Self {
        let language_fluency = req
            .language_fluency
            .into_iter()
            .map(|(language, level)| (language, serde_json::json!(level)))
            .collect::<serde_json::Map<_, _>>();

        Self {
            profile_id,
            primary_tribe: req.primary_tribe,
            secondary_tribes: req.secondary_tribes,
            birth_country: req.birth_country,
            languages_spoken: req.languages_spoken,
            language_fluency: serde_json::Value::Object(language_fluency),
            religion: req.religion,
            religious_importance: req.religious_importance,
            traditional_values_importance: req.traditional_values_importance,
            family_involvement_importance: req.family_involvement_importance,
            cultural_practices: serde_json::Value::Object(req.cultural_practices),
            dietary_restrictions: req.dietary_restrictions,
            updated_at: now,
        }
    }
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

#[derive(Debug, Deserialize, Validate)]
pub struct PersonalityRequest {
    #[validate(range(min = 0.0, max = 5.0))]
    pub openness: Option<f64>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub conscientiousness: Option<f64>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub extraversion: Option<f64>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub agreeableness: Option<f64>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub neuroticism: Option<f64>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = personality_assessments, treat_none_as_null = true)]
pub struct NewPersonalityAssessment {
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

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "check_age_range"))]
pub struct PreferencesRequest {
    #[validate(range(min = 18, max = 120))]
    pub min_age: Option<i32>,
    #[validate(range(min = 18, max = 120))]
    pub max_age: Option<i32>,
    #[validate(length(max = 20))]
    pub interested_in: Option<String>,
    #[serde(default)]
    pub preferred_tribes: Vec<String>,
    #[serde(default)]
    pub preferred_countries: Vec<String>,
}

fn check_age_range(req: &PreferencesRequest) -> Result<(), ValidationError> {
    match (req.min_age, req.max_age) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::new("min_age_above_max_age")),
        _ => Ok(()),
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = preferences, treat_none_as_null = true)]
pub struct NewPreferences {
    pub profile_id: Uuid,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub interested_in: Option<String>,
    pub preferred_tribes: Vec<String>,
    pub preferred_countries: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

// --- Photo ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = photos)]
pub struct Photo {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub url: String,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = photos)]
pub struct NewPhoto {
    pub profile_id: Uuid,
    pub url: String,
    pub storage_key: String,
    pub is_primary: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_reject_inverted_age_range() {
        let req = PreferencesRequest {
            min_age: Some(40),
            max_age: Some(30),
            interested_in: None,
            preferred_tribes: vec![],
            preferred_countries: vec![],
        };
        assert!(req.validate().is_err());

        let req = PreferencesRequest { min_age: Some(25), max_age: Some(30), ..req };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn preferences_reject_minors() {
        let req = PreferencesRequest {
            min_age: Some(16),
            max_age: None,
            interested_in: None,
            preferred_tribes: vec![],
            preferred_countries: vec![],
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("min_age"));
    }

    #[test]
    fn cultural_request_validates_ratings_and_fluency() {
        let req: CulturalBackgroundRequest = serde_json::from_value(serde_json::json!({
            "primary_tribe": "Yoruba",
            "languages_spoken": ["Yoruba", "English"],
            "language_fluency": {"Yoruba": "native", "English": "fluent"},
            "traditional_values_importance": 6
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("traditional_values_importance"));

        let bad_fluency = serde_json::from_value::<CulturalBackgroundRequest>(serde_json::json!({
            "language_fluency": {"Yoruba": "bilingual"}
        }));
        assert!(bad_fluency.is_err());
    }

    #[test]
    fn cultural_row_stores_fluency_as_json_object() {
        let req: CulturalBackgroundRequest = serde_json::from_value(serde_json::json!({
            "language_fluency": {"Igbo": "conversational"},
            "cultural_practices": {"festivals": ["New Yam"]}
        }))
        .unwrap();
        let row = NewCulturalBackground::from_request(Uuid::now_v7(), req, Utc::now());
        assert_eq!(row.language_fluency["Igbo"], "conversational");
        assert_eq!(row.cultural_practices["festivals"][0], "New Yam");
        assert!(row.secondary_tribes.is_empty());
    }

    #[test]
    fn personality_scores_must_be_on_scale() {
        let req = PersonalityRequest {
            openness: Some(5.5),
            conscientiousness: Some(3.0),
            extraversion: None,
            agreeableness: None,
            neuroticism: Some(-1.0),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("openness"));
        assert!(fields.contains_key("neuroticism"));
        assert!(!fields.contains_key("conscientiousness"));
    }
}
