use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::defaults;
use super::profile::{BigFive, Culture, Location, Personality, ScoringProfile};

// -- Overall blend --
// One blend for every caller (discover, suggestions, actions).
const W_CULTURAL: f64 = 0.4;
const W_PERSONALITY: f64 = 0.3;
const W_LOCATION: f64 = 0.2;
const W_AGE: f64 = 0.1;

// -- Cultural point budget (sums to 100) --
const PTS_SAME_TRIBE: u32 = 30;
const PTS_SECONDARY_TRIBE: u32 = 20;
const PTS_PER_SHARED_LANGUAGE: u32 = 5;
const PTS_LANGUAGES_CAP: u32 = 20;
const PTS_SAME_RELIGION: u32 = 15;
const PTS_DIFFERENT_RELIGION: u32 = 5;
const PTS_TRADITIONAL_VALUES: u32 = 15;
const PTS_FAMILY_INVOLVEMENT: u32 = 10;
const PTS_SAME_BIRTH_COUNTRY: u32 = 10;
const CULTURAL_BUDGET: f64 = 100.0;

// -- Location tiers --
const LOCATION_SAME_CITY: u8 = 100;
const LOCATION_SAME_COUNTRY: u8 = 70;
const LOCATION_ELSEWHERE: u8 = 30;

/// Age gap (inclusive upper bound, in years) → score. Anything wider scores [`AGE_FLOOR`].
const AGE_STEPS: [(u32, u8); 5] = [(2, 100), (5, 90), (8, 75), (12, 60), (15, 40)];
const AGE_FLOOR: u8 = 20;

/// Compatibility of a pair, every field an integer percentage in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompatibilityScore {
    pub overall: u8,
    pub cultural: u8,
    pub personality: u8,
    pub location: u8,
    pub age: u8,
}

/// Scores a pair. Pure and total: absent data falls back to the neutral
/// values in [`defaults`], and the result does not depend on argument order.
pub fn score(a: &ScoringProfile, b: &ScoringProfile, today: NaiveDate) -> CompatibilityScore {
    let cultural = cultural_score(a.culture.as_ref(), b.culture.as_ref());
    let personality = personality_score(a.personality.as_ref(), b.personality.as_ref());
    let location = location_score(&a.location, &b.location);
    let age = match (a.date_of_birth, b.date_of_birth) {
        (Some(dob_a), Some(dob_b)) => {
            age_score(age_on(dob_a, today).abs_diff(age_on(dob_b, today)))
        }
        _ => defaults::AGE_WHEN_MISSING,
    };

    let overall = f64::from(cultural) * W_CULTURAL
        + f64::from(personality) * W_PERSONALITY
        + f64::from(location) * W_LOCATION
        + f64::from(age) * W_AGE;

    CompatibilityScore {
        overall: percent(overall),
        cultural,
        personality,
        location,
        age,
    }
}

pub fn cultural_score(a: Option<&Culture>, b: Option<&Culture>) -> u8 {
    match (a, b) {
        (Some(a), Some(b)) => percent(f64::from(cultural_points(a, b)) / CULTURAL_BUDGET * 100.0),
        _ => defaults::CULTURAL_WHEN_MISSING,
    }
}

/// Raw cultural points out of the 100-point budget. Factors that don't apply
/// contribute nothing but still count in the denominator.
pub fn cultural_points(a: &Culture, b: &Culture) -> u32 {
    let mut points = 0;

    let same_tribe = matches!((&a.primary_tribe, &b.primary_tribe), (Some(x), Some(y)) if x == y);
    if same_tribe {
        points += PTS_SAME_TRIBE;
    } else if crosses_secondary(a, b) || crosses_secondary(b, a) {
        points += PTS_SECONDARY_TRIBE;
    }

    let shared_languages = a.languages.intersection(&b.languages).count() as u32;
    points += (shared_languages * PTS_PER_SHARED_LANGUAGE).min(PTS_LANGUAGES_CAP);

    match (&a.religion, &b.religion) {
        (Some(x), Some(y)) if x == y => points += PTS_SAME_RELIGION,
        (Some(_), Some(_)) => points += PTS_DIFFERENT_RELIGION,
        _ => {}
    }

    if let (Some(x), Some(y)) = (a.traditional_values, b.traditional_values) {
        points += PTS_TRADITIONAL_VALUES.saturating_sub(3 * x.distance(y));
    }

    if let (Some(x), Some(y)) = (a.family_involvement, b.family_involvement) {
        points += PTS_FAMILY_INVOLVEMENT.saturating_sub(2 * x.distance(y));
    }

    if matches!((&a.birth_country, &b.birth_country), (Some(x), Some(y)) if x == y) {
        points += PTS_SAME_BIRTH_COUNTRY;
    }

    points
}

/// True when `a` lists `b`'s primary tribe among its secondary tribes.
fn crosses_secondary(a: &Culture, b: &Culture) -> bool {
    b.primary_tribe
        .as_ref()
        .is_some_and(|tribe| a.secondary_tribes.contains(tribe))
}

pub fn personality_score(a: Option<&Personality>, b: Option<&Personality>) -> u8 {
    let (Some(a), Some(b)) = (a, b) else {
        return defaults::PERSONALITY_WHEN_MISSING;
    };

    let per_trait: Vec<f64> = BigFive::ALL
        .iter()
        .filter_map(|&kind| {
            let (x, y) = (a.get(kind)?, b.get(kind)?);
            Some(trait_compatibility(kind, x.get(), y.get()))
        })
        .collect();

    if per_trait.is_empty() {
        return defaults::PERSONALITY_WHEN_MISSING;
    }

    percent(per_trait.iter().sum::<f64>() / per_trait.len() as f64)
}

/// Per-trait compatibility in [0, 100].
fn trait_compatibility(kind: BigFive, x: f64, y: f64) -> f64 {
    let diff = (x - y).abs();
    let value = match kind {
        // Similar emotional stability works best.
        BigFive::Neuroticism => 100.0 - 25.0 * diff,
        // High on both sides is good; divergence costs.
        BigFive::Agreeableness | BigFive::Conscientiousness => {
            ((x + y) / 2.0) / 5.0 * 100.0 - 10.0 * diff
        }
        // Small gaps can complement each other; large gaps fall off faster.
        BigFive::Openness | BigFive::Extraversion => {
            if diff <= 1.0 {
                100.0 - 15.0 * diff
            } else {
                85.0 - 20.0 * diff
            }
        }
    };
    value.clamp(0.0, 100.0)
}

pub fn location_score(a: &Location, b: &Location) -> u8 {
    let same_country = matches!((&a.country, &b.country), (Some(x), Some(y)) if x == y);
    let same_city = matches!((&a.city, &b.city), (Some(x), Some(y)) if x == y);

    match (same_country, same_city) {
        (true, true) => LOCATION_SAME_CITY,
        (true, false) => LOCATION_SAME_COUNTRY,
        (false, _) => LOCATION_ELSEWHERE,
    }
}

/// Whole years between `dob` and `today`; one less if this year's birthday
/// hasn't come yet.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

pub fn age_score(gap_years: u32) -> u8 {
    AGE_STEPS
        .iter()
        .find(|(max_gap, _)| gap_years <= *max_gap)
        .map_or(AGE_FLOOR, |(_, score)| *score)
}

/// Rounds half away from zero and clamps to [0, 100]; NaN reads as 0.
fn percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::profile::{Importance, TraitScore};
    use crate::matching::testkit::{culture, located, personality, scoring_profile};
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn yoruba_pair_scores_62() {
        let mut a = culture("yoruba", &["english", "yoruba"], Some("christian"));
        a.traditional_values = Importance::new(5);
        let mut b = culture("yoruba", &["english", "igbo"], Some("christian"));
        b.traditional_values = Importance::new(4);

        // 30 tribe + 5 one language + 15 religion + 12 values
        assert_eq!(cultural_points(&a, &b), 62);
        assert_eq!(cultural_score(Some(&a), Some(&b)), 62);
    }

    #[test]
    fn full_alignment_hits_the_budget() {
        let mut a = culture("igbo", &["english", "igbo", "french", "pidgin"], Some("catholic"));
        a.traditional_values = Importance::new(3);
        a.family_involvement = Importance::new(4);
        a.birth_country = Some("nigeria".into());
        let b = a.clone();

        assert_eq!(cultural_score(Some(&a), Some(&b)), 100);
    }

    #[test]
    fn missing_culture_is_neutral() {
        let a = culture("akan", &["twi"], None);
        assert_eq!(cultural_score(Some(&a), None), 50);
        assert_eq!(cultural_score(None, Some(&a)), 50);
        assert_eq!(cultural_score(None, None), 50);
    }

    #[test]
    fn empty_culture_records_score_zero() {
        let a = Culture::default();
        assert_eq!(cultural_score(Some(&a), Some(&a)), 0);
    }

    #[test]
    fn secondary_tribe_bonus_is_exclusive_with_primary() {
        let mut a = culture("yoruba", &[], None);
        let mut b = culture("igbo", &[], None);
        b.secondary_tribes.insert("yoruba".into());
        assert_eq!(cultural_points(&a, &b), 20);
        assert_eq!(cultural_points(&b, &a), 20);

        // Same primary tribe and a cross-listing: only the primary bonus counts.
        a.secondary_tribes.insert("yoruba".into());
        b.primary_tribe = Some("yoruba".into());
        assert_eq!(cultural_points(&a, &b), 30);
    }

    #[test]
    fn same_tribe_never_loses_to_different_tribe() {
        let religions = [None, Some("muslim"), Some("christian")];
        for ra in religions {
            for rb in religions {
                let a = culture("hausa", &["hausa", "english"], ra);
                let same = culture("hausa", &["english"], rb);
                let other = culture("fulani", &["english"], rb);
                assert!(
                    cultural_score(Some(&a), Some(&same)) >= cultural_score(Some(&a), Some(&other)),
                    "religions {ra:?}/{rb:?}"
                );
            }
        }
    }

    #[test]
    fn shared_languages_cap_at_twenty() {
        let langs = ["english", "french", "swahili", "yoruba", "igbo", "zulu"];
        let a = Culture { languages: langs.iter().map(|s| s.to_string()).collect(), ..Default::default() };
        assert_eq!(cultural_points(&a, &a), 20);
    }

    #[test]
    fn religion_points() {
        let a = culture("", &[], Some("muslim"));
        let b = culture("", &[], Some("christian"));
        let none = culture("", &[], None);
        assert_eq!(cultural_points(&a, &a), 15);
        assert_eq!(cultural_points(&a, &b), 5);
        assert_eq!(cultural_points(&a, &none), 0);
    }

    #[test]
    fn importance_alignment_never_negative() {
        let mut a = Culture::default();
        let mut b = Culture::default();
        a.traditional_values = Importance::new(1);
        b.traditional_values = Importance::new(5);
        a.family_involvement = Importance::new(1);
        b.family_involvement = Importance::new(5);
        // 15 - 12 = 3, 10 - 8 = 2
        assert_eq!(cultural_points(&a, &b), 5);
    }

    #[test]
    fn personality_defaults() {
        let full = personality([Some(3.0); 5]);
        let empty = personality([None; 5]);
        assert_eq!(personality_score(None, Some(&full)), 70);
        assert_eq!(personality_score(Some(&full), None), 70);
        assert_eq!(personality_score(Some(&empty), Some(&full)), 70);

        let only_openness = personality([Some(3.0), None, None, None, None]);
        let only_neuroticism = personality([None, None, None, None, Some(3.0)]);
        assert_eq!(personality_score(Some(&only_openness), Some(&only_neuroticism)), 70);
    }

    #[test]
    fn neuroticism_rewards_closeness() {
        let a = personality([None, None, None, None, Some(1.0)]);
        let b = personality([None, None, None, None, Some(3.0)]);
        let c = personality([None, None, None, None, Some(5.0)]);
        assert_eq!(personality_score(Some(&a), Some(&a)), 100);
        assert_eq!(personality_score(Some(&a), Some(&b)), 50);
        assert_eq!(personality_score(Some(&a), Some(&c)), 0);
    }

    #[test]
    fn agreeableness_rewards_high_average() {
        let high = personality([None, None, None, Some(5.0), None]);
        let low = personality([None, None, None, Some(1.0), None]);
        let mid = personality([None, None, None, Some(4.0), None]);
        assert_eq!(personality_score(Some(&high), Some(&high)), 100);
        assert_eq!(personality_score(Some(&low), Some(&low)), 20);
        // avg 4.5 → 90, minus 10 for the gap
        assert_eq!(personality_score(Some(&high), Some(&mid)), 80);
        // avg 3 → 60, minus 40
        assert_eq!(personality_score(Some(&high), Some(&low)), 20);
    }

    #[test]
    fn openness_small_gaps_complement() {
        let at = |v| personality([Some(v), None, None, None, None]);
        assert_eq!(personality_score(Some(&at(3.0)), Some(&at(3.0))), 100);
        assert_eq!(personality_score(Some(&at(3.0)), Some(&at(4.0))), 85);
        assert_eq!(personality_score(Some(&at(3.0)), Some(&at(4.5))), 55);
        assert_eq!(personality_score(Some(&at(0.0)), Some(&at(5.0))), 0);
    }

    #[test]
    fn personality_averages_comparable_traits() {
        let a = personality([Some(3.0), None, None, None, Some(1.0)]);
        let b = personality([Some(3.0), Some(4.0), None, None, Some(3.0)]);
        // openness 100, neuroticism 50
        assert_eq!(personality_score(Some(&a), Some(&b)), 75);
    }

    #[test]
    fn location_tiers() {
        let lagos = located(Some("lagos"), Some("nigeria"));
        let abuja = located(Some("abuja"), Some("nigeria"));
        let london = located(Some("london"), Some("uk"));
        let unknown = located(None, None);

        assert_eq!(location_score(&lagos, &lagos), 100);
        assert_eq!(location_score(&lagos, &abuja), 70);
        assert_eq!(location_score(&lagos, &london), 30);
        assert_eq!(location_score(&unknown, &unknown), 30);

        for x in [&lagos, &abuja, &london, &unknown] {
            for y in [&lagos, &abuja, &london, &unknown] {
                assert!([30, 70, 100].contains(&location_score(x, y)));
            }
        }
    }

    #[test]
    fn same_city_different_country_is_elsewhere() {
        let a = located(Some("london"), Some("uk"));
        let b = located(Some("london"), Some("canada"));
        assert_eq!(location_score(&a, &b), 30);
    }

    #[test]
    fn age_counts_birthdays() {
        assert_eq!(age_on(date(1990, 10, 17), today()), 36);
        assert_eq!(age_on(date(1990, 10, 18), today()), 35);
        assert_eq!(age_on(date(1990, 1, 1), today()), 36);
        assert_eq!(age_on(date(2030, 1, 1), today()), 0);
    }

    #[test]
    fn age_step_table() {
        let expected = [(0, 100), (1, 100), (2, 100), (3, 90), (5, 90), (6, 75), (8, 75),
            (10, 60), (12, 60), (13, 40), (15, 40), (16, 20), (20, 20), (60, 20)];
        for (gap, score) in expected {
            assert_eq!(age_score(gap), score, "gap {gap}");
        }

        let mut previous = u8::MAX;
        for gap in 0..80 {
            let s = age_score(gap);
            assert!(s <= previous);
            previous = s;
        }
    }

    #[test]
    fn overall_blend() {
        let mut a = scoring_profile(Some(date(1994, 3, 1)));
        let mut b = scoring_profile(Some(date(1995, 6, 1)));
        let mut ca = culture("yoruba", &["english", "yoruba"], Some("christian"));
        ca.traditional_values = Importance::new(5);
        let mut cb = culture("yoruba", &["english", "igbo"], Some("christian"));
        cb.traditional_values = Importance::new(4);
        a.culture = Some(ca);
        b.culture = Some(cb);
        a.location = located(Some("houston"), Some("usa"));
        b.location = located(Some("houston"), Some("usa"));

        let s = score(&a, &b, today());
        assert_eq!(s.cultural, 62);
        assert_eq!(s.personality, 70);
        assert_eq!(s.location, 100);
        assert_eq!(s.age, 100);
        // 24.8 + 21 + 20 + 10
        assert_eq!(s.overall, 76);
    }

    #[test]
    fn everything_missing_uses_defaults() {
        let a = scoring_profile(None);
        let b = scoring_profile(None);
        let s = score(&a, &b, today());
        assert_eq!(s.cultural, 50);
        assert_eq!(s.personality, 70);
        assert_eq!(s.location, 30);
        assert_eq!(s.age, 60);
        // 20 + 21 + 6 + 6
        assert_eq!(s.overall, 53);
    }

    #[test]
    fn score_is_symmetric_and_bounded() {
        let dobs = [None, Some(date(1970, 1, 1)), Some(date(2001, 12, 31))];
        let cultures = [
            None,
            Some(Culture::default()),
            Some(culture("ewe", &["ewe", "french"], Some("christian"))),
        ];
        let personalities = [
            None,
            Some(personality([None; 5])),
            Some(personality([Some(0.0), Some(5.0), Some(2.5), Some(0.0), Some(5.0)])),
        ];

        let mut profiles = Vec::new();
        for dob in dobs {
            for c in &cultures {
                for p in &personalities {
                    let mut sp = scoring_profile(dob);
                    sp.id = Uuid::new_v4();
                    sp.culture = c.clone();
                    sp.personality = *p;
                    profiles.push(sp);
                }
            }
        }

        for a in &profiles {
            for b in &profiles {
                let ab = score(a, b, today());
                assert_eq!(ab, score(b, a, today()));
                for v in [ab.overall, ab.cultural, ab.personality, ab.location, ab.age] {
                    assert!(v <= 100);
                }
            }
        }
    }

    #[test]
    fn percent_handles_edges() {
        assert_eq!(percent(f64::NAN), 0);
        assert_eq!(percent(-3.0), 0);
        assert_eq!(percent(100.4), 100);
        assert_eq!(percent(61.5), 62);
        assert_eq!(percent(f64::INFINITY), 100);
    }

    #[test]
    fn trait_score_limits_feed_the_scorer() {
        let a = Personality { extraversion: TraitScore::new(5.0), ..Default::default() };
        let b = Personality { extraversion: TraitScore::new(0.0), ..Default::default() };
        assert_eq!(personality_score(Some(&a), Some(&b)), 0);
    }
}
