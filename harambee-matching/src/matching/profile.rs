//! Scoring-side view of a member: every value here has already been through
//! [`normalize`](super::normalize), so comparisons are plain equality checks.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringProfile {
    pub id: Uuid,
    pub date_of_birth: Option<NaiveDate>,
    pub location: Location,
    pub culture: Option<Culture>,
    pub personality: Option<Personality>,
}

/// Case-folded city and country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Culture {
    pub primary_tribe: Option<String>,
    pub secondary_tribes: BTreeSet<String>,
    pub birth_country: Option<String>,
    pub languages: BTreeSet<String>,
    pub religion: Option<String>,
    pub traditional_values: Option<Importance>,
    pub family_involvement: Option<Importance>,
}

/// A 1–5 importance rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Importance(u8);

impl Importance {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    pub fn new(value: i32) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&value)
            .then(|| Self(value as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn distance(self, other: Self) -> u32 {
        u32::from(self.0.abs_diff(other.0))
    }
}

/// A Big-Five trait score, finite and within [0, 5].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TraitScore(f64);

impl TraitScore {
    pub const MAX: f64 = 5.0;

    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (0.0..=Self::MAX).contains(&value)).then_some(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BigFive {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl BigFive {
    pub const ALL: [BigFive; 5] = [
        BigFive::Openness,
        BigFive::Conscientiousness,
        BigFive::Extraversion,
        BigFive::Agreeableness,
        BigFive::Neuroticism,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Personality {
    pub openness: Option<TraitScore>,
    pub conscientiousness: Option<TraitScore>,
    pub extraversion: Option<TraitScore>,
    pub agreeableness: Option<TraitScore>,
    pub neuroticism: Option<TraitScore>,
}

impl Personality {
    pub fn get(&self, trait_kind: BigFive) -> Option<TraitScore> {
        match trait_kind {
            BigFive::Openness => self.openness,
            BigFive::Conscientiousness => self.conscientiousness,
            BigFive::Extraversion => self.extraversion,
            BigFive::Agreeableness => self.agreeableness,
            BigFive::Neuroticism => self.neuroticism,
        }
    }
}
