use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use harambee_shared::clients::db;
use harambee_shared::errors::AppResult;
use harambee_shared::types::auth::AuthUser;
use harambee_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{NewQuizAttempt, QuizAttempt, QuizQuestion, QuizQuestionView, QuizSubmission};
use crate::schema::{profiles, quiz_attempts, quiz_questions};
use crate::services::quiz_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct QuestionQuery {
    pub tribe: Option<String>,
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct QuizResult {
    pub attempt: QuizAttempt,
    pub pass_threshold: u8,
}

fn tribe_of(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|t| !t.is_empty())
}

/// General questions plus the ones for `tribe`.
fn eligible(tribe: Option<&str>) -> quiz_questions::BoxedQuery<'static, diesel::pg::Pg> {
    let query = quiz_questions::table.into_boxed();
    match tribe {
        Some(tribe) => query.filter(
            quiz_questions::tribe
                .is_null()
                .or(quiz_questions::tribe.ilike(tribe.to_string())),
        ),
        None => query.filter(quiz_questions::tribe.is_null()),
    }
}

// --- GET /quiz/questions ---

pub async fn get_questions(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuestionQuery>,
) -> AppResult<Json<ApiResponse<Vec<QuizQuestionView>>>> {
    let count = quiz_service::question_count(query.count, state.config.quiz_question_count);
    let mut conn = db::conn(&state.db)?;
    let pool = eligible(tribe_of(query.tribe.as_deref())).load::<QuizQuestion>(&mut conn)?;

    let picked = quiz_service::sample(pool, count, &mut rand::thread_rng());
    Ok(Json(ApiResponse::ok(picked.into_iter().map(QuizQuestionView::from).collect())))
}

// --- POST /quiz/submit ---

pub async fn submit_quiz(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(submission): Json<QuizSubmission>,
) -> AppResult<Json<ApiResponse<QuizResult>>> {
    submission.validate()?;
    let threshold = state.config.pass_threshold();
    let tribe = tribe_of(submission.tribe.as_deref());

    let mut conn = db::conn(&state.db)?;
    let bank_size = eligible(tribe).count().get_result::<i64>(&mut conn)?;
    let ids: Vec<_> = submission.answers.iter().map(|a| a.question_id).collect();
    let questions = quiz_questions::table
        .filter(quiz_questions::id.eq_any(&ids))
        .load::<QuizQuestion>(&mut conn)?;

    let rules = quiz_service::QuizRules {
        pass_threshold: threshold,
        required_answers: quiz_service::required_answers(state.config.quiz_question_count, bank_size),
        tribe: tribe.map(str::to_string),
    };
    let grade = quiz_service::grade(&questions, &submission.answers, &rules)?;

    let attempt = diesel::insert_into(quiz_attempts::table)
        .values(&NewQuizAttempt {
            profile_id: user.id,
            correct_answers: grade.correct_answers,
            total_questions: grade.total_questions,
            percentage: grade.percentage,
            passed: grade.passed,
        })
        .get_result::<QuizAttempt>(&mut conn)?;

    if attempt.passed {
        diesel::update(profiles::table.find(user.id))
            .set((profiles::is_verified.eq(true), profiles::updated_at.eq(Utc::now())))
            .execute(&mut conn)?;
        tracing::info!(profile_id = %user.id, percentage = attempt.percentage, "cultural quiz passed");
        publisher::publish_quiz_passed(&state.rabbitmq, &attempt).await;
    }

    metrics::counter!("community_quiz_attempts_total", "passed" => attempt.passed.to_string()).increment(1);

    Ok(Json(ApiResponse::ok(QuizResult { attempt, pass_threshold: threshold })))
}
