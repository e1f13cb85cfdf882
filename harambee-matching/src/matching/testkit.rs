//! Builders shared by the matching tests.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{CulturalBackground, PersonalityAssessment, Preferences, Profile};

use super::normalize::fold;
use super::profile::{Culture, Location, Personality, ScoringProfile, TraitScore};

pub fn profile_row() -> Profile {
    let now = Utc::now();
    Profile {
        id: Uuid::now_v7(),
        display_name: Some("Member".into()),
        date_of_birth: None,
        gender: None,
        city: None,
        country: None,
        occupation: None,
        education: None,
        bio: None,
        is_verified: false,
        is_active: true,
        last_active_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn culture_row(profile_id: Uuid) -> CulturalBackground {
    let now = Utc::now();
    CulturalBackground {
        id: Uuid::now_v7(),
        profile_id,
        primary_tribe: None,
        secondary_tribes: vec![],
        birth_country: None,
        languages_spoken: vec![],
        language_fluency: serde_json::json!({}),
        religion: None,
        religious_importance: None,
        traditional_values_importance: None,
        family_involvement_importance: None,
        cultural_practices: serde_json::json!({}),
        dietary_restrictions: vec![],
        created_at: now,
        updated_at: now,
    }
}

pub fn personality_row(profile_id: Uuid) -> PersonalityAssessment {
    PersonalityAssessment {
        id: Uuid::now_v7(),
        profile_id,
        openness: None,
        conscientiousness: None,
        extraversion: None,
        agreeableness: None,
        neuroticism: None,
        completed_at: Utc::now(),
    }
}

pub fn preferences_row(profile_id: Uuid) -> Preferences {
    Preferences {
        id: Uuid::now_v7(),
        profile_id,
        min_age: None,
        max_age: None,
        interested_in: None,
        preferred_tribes: vec![],
        preferred_countries: vec![],
        updated_at: Utc::now(),
    }
}

pub fn culture(tribe: &str, languages: &[&str], religion: Option<&str>) -> Culture {
    Culture {
        primary_tribe: fold(Some(tribe)),
        languages: languages.iter().map(|l| l.to_string()).collect(),
        religion: religion.map(str::to_string),
        ..Default::default()
    }
}

/// Traits in order: openness, conscientiousness, extraversion, agreeableness, neuroticism.
pub fn personality(traits: [Option<f64>; 5]) -> Personality {
    let t = |i: usize| traits[i].and_then(TraitScore::new);
    Personality {
        openness: t(0),
        conscientiousness: t(1),
        extraversion: t(2),
        agreeableness: t(3),
        neuroticism: t(4),
    }
}

pub fn located(city: Option<&str>, country: Option<&str>) -> Location {
    Location {
        city: city.map(str::to_string),
        country: country.map(str::to_string),
    }
}

pub fn scoring_profile(date_of_birth: Option<NaiveDate>) -> ScoringProfile {
    ScoringProfile {
        id: Uuid::now_v7(),
        date_of_birth,
        location: Location::default(),
        culture: None,
        personality: None,
    }
}
