use std::collections::BTreeSet;

use crate::models::{CulturalBackground, PersonalityAssessment, Profile};

use super::profile::{Culture, Importance, Location, Personality, ScoringProfile, TraitScore};

/// Builds the scoring view of a member from its stored rows.
///
/// Text is trimmed and case-folded, blank values become absent, ratings and
/// trait scores outside their ranges are dropped. After this step the scorer
/// only ever compares values.
pub fn normalize(
    profile: &Profile,
    culture: Option<&CulturalBackground>,
    personality: Option<&PersonalityAssessment>,
) -> ScoringProfile {
    ScoringProfile {
        id: profile.id,
        date_of_birth: profile.date_of_birth,
        location: Location {
            city: fold(profile.city.as_deref()),
            country: fold(profile.country.as_deref()),
        },
        culture: culture.map(normalize_culture),
        personality: personality.map(normalize_personality),
    }
}

fn normalize_culture(row: &CulturalBackground) -> Culture {
    Culture {
        primary_tribe: fold(row.primary_tribe.as_deref()),
        secondary_tribes: fold_set(&row.secondary_tribes),
        birth_country: fold(row.birth_country.as_deref()),
        languages: fold_set(&row.languages_spoken),
        religion: fold(row.religion.as_deref()),
        traditional_values: row.traditional_values_importance.and_then(Importance::new),
        family_involvement: row.family_involvement_importance.and_then(Importance::new),
    }
}

fn normalize_personality(row: &PersonalityAssessment) -> Personality {
    Personality {
        openness: row.openness.and_then(TraitScore::new),
        conscientiousness: row.conscientiousness.and_then(TraitScore::new),
        extraversion: row.extraversion.and_then(TraitScore::new),
        agreeableness: row.agreeableness.and_then(TraitScore::new),
        neuroticism: row.neuroticism.and_then(TraitScore::new),
    }
}

pub(crate) fn fold(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn fold_set(values: &[String]) -> BTreeSet<String> {
    values.iter().filter_map(|v| fold(Some(v))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::testkit::{culture_row, personality_row, profile_row};

    #[test]
    fn blank_and_padded_text_is_folded() {
        let mut profile = profile_row();
        profile.city = Some("  Lagos ".into());
        profile.country = Some("   ".into());

        let mut culture = culture_row(profile.id);
        culture.primary_tribe = Some("Yoruba".into());
        culture.religion = Some("".into());
        culture.languages_spoken = vec!["English".into(), " english".into(), "".into(), "Yoruba".into()];

        let sp = normalize(&profile, Some(&culture), None);

        assert_eq!(sp.location.city.as_deref(), Some("lagos"));
        assert_eq!(sp.location.country, None);

        let c = sp.culture.unwrap();
        assert_eq!(c.primary_tribe.as_deref(), Some("yoruba"));
        assert_eq!(c.religion, None);
        assert_eq!(c.languages.len(), 2);
        assert!(sp.personality.is_none());
    }

    #[test]
    fn out_of_range_values_are_dropped() {
        let profile = profile_row();

        let mut culture = culture_row(profile.id);
        culture.traditional_values_importance = Some(9);
        culture.family_involvement_importance = Some(3);

        let mut personality = personality_row(profile.id);
        personality.openness = Some(7.5);
        personality.neuroticism = Some(f64::NAN);
        personality.agreeableness = Some(4.0);

        let sp = normalize(&profile, Some(&culture), Some(&personality));

        let c = sp.culture.unwrap();
        assert_eq!(c.traditional_values, None);
        assert_eq!(c.family_involvement.map(Importance::get), Some(3));

        let p = sp.personality.unwrap();
        assert_eq!(p.openness, None);
        assert_eq!(p.neuroticism, None);
        assert_eq!(p.agreeableness.map(TraitScore::get), Some(4.0));
    }
}
