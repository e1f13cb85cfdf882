use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use harambee_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{QuizAnswer, QuizQuestion};

pub const MAX_QUESTIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizGrade {
    pub correct_answers: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub passed: bool,
}

/// Clamps the requested question count to `1..=MAX_QUESTIONS`.
pub fn question_count(requested: Option<usize>, default: usize) -> usize {
    requested.unwrap_or(default).clamp(1, MAX_QUESTIONS)
}

/// Random subset of the pool, at most `count` long.
pub fn sample<R: Rng + ?Sized>(mut pool: Vec<QuizQuestion>, count: usize, rng: &mut R) -> Vec<QuizQuestion> {
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

/// What a submission has to satisfy before it is graded.
#[derive(Debug, Clone)]
pub struct QuizRules {
    pub pass_threshold: u8,
    /// Distinct questions that must be answered.
    pub required_answers: usize,
    /// Tribe the member is quizzed on; other tribes' questions are refused.
    pub tribe: Option<String>,
}

/// Answers needed for a full quiz: the configured count, or the whole
/// eligible bank when it is smaller.
pub fn required_answers(configured: usize, eligible: i64) -> usize {
    let eligible = usize::try_from(eligible).unwrap_or(0);
    question_count(Some(configured), configured).min(eligible).max(1)
}

fn same_tribe(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Grades a submission. Repeated answers to the same question count once
/// (the first one wins); an answer to a question not in `questions` is rejected.
pub fn grade(questions: &[QuizQuestion], answers: &[QuizAnswer], rules: &QuizRules) -> AppResult<QuizGrade> {
    let key: HashMap<_, _> = questions.iter().map(|q| (q.id, q)).collect();

    let mut seen = HashSet::new();
    let mut total = 0i32;
    let mut correct = 0i32;
    for answer in answers {
        let question = key.get(&answer.question_id).ok_or_else(|| {
            AppError::new(
                ErrorCode::QuizQuestionNotFound,
                format!("unknown quiz question {}", answer.question_id),
            )
        })?;
        if let Some(tribe) = question.tribe.as_deref() {
            if !rules.tribe.as_deref().is_some_and(|t| same_tribe(t, tribe)) {
                return Err(AppError::new(
                    ErrorCode::ValidationError,
                    format!("question {} belongs to another tribe's quiz", question.id),
                ));
            }
        }
        if !seen.insert(answer.question_id) {
            continue;
        }
        total += 1;
        if question.correct_option == answer.selected_option {
            correct += 1;
        }
    }

    if total == 0 || seen.len() < rules.required_answers {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            format!("answer all {} questions to complete the quiz", rules.required_answers),
        ));
    }

    let percentage = (correct * 100 + total / 2) / total;
    Ok(QuizGrade {
        correct_answers: correct,
        total_questions: total,
        percentage,
        passed: percentage >= i32::from(rules.pass_threshold),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn question(correct_option: i32) -> QuizQuestion {
        QuizQuestion {
            id: Uuid::now_v7(),
            question: "Which festival celebrates the new yam harvest?".into(),
            options: serde_json::json!(["Iri Ji", "Eyo", "Durbar", "Homowo"]),
            correct_option,
            category: "festivals".into(),
            tribe: Some("Igbo".into()),
            created_at: Utc::now(),
        }
    }

    fn answer(q: &QuizQuestion, selected_option: i32) -> QuizAnswer {
        QuizAnswer { question_id: q.id, selected_option }
    }

    fn rules(required_answers: usize) -> QuizRules {
        QuizRules { pass_threshold: 60, required_answers, tribe: Some("Igbo".into()) }
    }

    #[test]
    fn percentage_and_threshold() {
        let qs: Vec<_> = (0..5).map(|_| question(0)).collect();
        let answers: Vec<_> = qs
            .iter()
            .enumerate()
            .map(|(i, q)| answer(q, if i < 3 { 0 } else { 1 }))
            .collect();

        let result = grade(&qs, &answers, &rules(5)).unwrap();
        assert_eq!(result.correct_answers, 3);
        assert_eq!(result.total_questions, 5);
        assert_eq!(result.percentage, 60);
        assert!(result.passed);

        let strict = QuizRules { pass_threshold: 61, ..rules(5) };
        assert!(!grade(&qs, &answers, &strict).unwrap().passed);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        let qs: Vec<_> = (0..3).map(|_| question(2)).collect();
        let answers = vec![answer(&qs[0], 2), answer(&qs[1], 2), answer(&qs[2], 0)];
        assert_eq!(grade(&qs, &answers, &rules(3)).unwrap().percentage, 67);
    }

    #[test]
    fn one_lucky_answer_does_not_verify() {
        let qs: Vec<_> = (0..10).map(|_| question(1)).collect();
        let err = grade(&qs, &[answer(&qs[0], 1)], &rules(10)).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn repeated_answers_do_not_fill_the_quiz() {
        let qs: Vec<_> = (0..2).map(|_| question(1)).collect();
        let padded = vec![answer(&qs[0], 1), answer(&qs[0], 1), answer(&qs[0], 1)];
        assert!(grade(&qs, &padded, &rules(2)).is_err());

        let q = question(1);
        let answers = vec![answer(&q, 1), answer(&q, 0), answer(&q, 0)];
        let result = grade(std::slice::from_ref(&q), &answers, &rules(1)).unwrap();
        assert_eq!(result.total_questions, 1);
        assert_eq!(result.percentage, 100);
    }

    #[test]
    fn other_tribes_questions_are_refused() {
        let mut zulu = question(0);
        zulu.tribe = Some("Zulu".into());
        let err = grade(std::slice::from_ref(&zulu), &[answer(&zulu, 0)], &rules(1)).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

        let general_only = QuizRules { tribe: None, ..rules(1) };
        assert!(grade(std::slice::from_ref(&zulu), &[answer(&zulu, 0)], &general_only).is_err());

        let mut general = question(0);
        general.tribe = None;
        assert!(grade(std::slice::from_ref(&general), &[answer(&general, 0)], &general_only).is_ok());

        let own = question(0);
        let lower = QuizRules { tribe: Some(" igbo ".into()), ..rules(1) };
        assert!(grade(std::slice::from_ref(&own), &[answer(&own, 0)], &lower).is_ok());
    }

    #[test]
    fn unknown_question_is_rejected() {
        let q = question(0);
        let stray = QuizAnswer { question_id: Uuid::now_v7(), selected_option: 0 };
        let err = grade(&[q], &[stray], &rules(1)).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn required_answers_follow_the_bank() {
        assert_eq!(required_answers(10, 40), 10);
        assert_eq!(required_answers(10, 4), 4);
        assert_eq!(required_answers(10, 0), 1);
    }

    #[test]
    fn sample_never_exceeds_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool: Vec<_> = (0..4).map(|_| question(0)).collect();
        assert_eq!(sample(pool.clone(), 10, &mut rng).len(), 4);

        let picked = sample(pool.clone(), 2, &mut rng);
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|p| pool.iter().any(|q| q.id == p.id)));
        assert_ne!(picked[0].id, picked[1].id);
    }

    #[test]
    fn count_is_clamped() {
        assert_eq!(question_count(None, 10), 10);
        assert_eq!(question_count(Some(0), 10), 1);
        assert_eq!(question_count(Some(500), 10), MAX_QUESTIONS);
    }
}
