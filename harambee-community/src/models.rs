use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::{community_events, endorsements, event_rsvps, profiles, quiz_attempts, quiz_questions};

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset, Deserialize, Default)]
#[diesel(table_name = profiles)]
pub struct UserStatusUpdate {
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

impl UserStatusUpdate {
    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.is_verified.is_none()
    }
}

// --- Endorsement ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndorsementType {
    Character,
    CulturalKnowledge,
    Reliability,
    FamilyValues,
}

impl EndorsementType {
    pub const ALL: [EndorsementType; 4] = [
        EndorsementType::Character,
        EndorsementType::CulturalKnowledge,
        EndorsementType::Reliability,
        EndorsementType::FamilyValues,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EndorsementType::Character => "character",
            EndorsementType::CulturalKnowledge => "cultural_knowledge",
            EndorsementType::Reliability => "reliability",
            EndorsementType::FamilyValues => "family_values",
        }
    }
}

impl fmt::Display for EndorsementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndorsementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown endorsement type: {s}"))
    }
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = endorsements)]
pub struct Endorsement {
    pub id: Uuid,
    pub endorser_id: Uuid,
    pub endorsed_id: Uuid,
    pub endorsement_type: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEndorsementRequest {
    pub endorsed_id: Uuid,
    pub endorsement_type: EndorsementType,
    #[validate(length(max = 500))]
    pub message: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = endorsements)]
pub struct NewEndorsement {
    pub endorser_id: Uuid,
    pub endorsed_id: Uuid,
    pub endorsement_type: String,
    pub message: Option<String>,
}

// --- Quiz ---

#[derive(Debug, Queryable, Identifiable, Clone)]
#[diesel(table_name = quiz_questions)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub question: String,
    pub options: serde_json::Value,
    pub correct_option: i32,
    pub category: String,
    pub tribe: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A question as shown to the member taking the quiz.
#[derive(Debug, Serialize)]
pub struct QuizQuestionView {
    pub id: Uuid,
    pub question: String,
    pub options: serde_json::Value,
    pub category: String,
    pub tribe: Option<String>,
}

impl From<QuizQuestion> for QuizQuestionView {
    fn from(q: QuizQuestion) -> Self {
        Self {
            id: q.id,
            question: q.question,
            options: q.options,
            category: q.category,
            tribe: q.tribe,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub question_id: Uuid,
    pub selected_option: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuizSubmission {
    /// Tribe the questions were fetched for; `None` means the general quiz.
    #[serde(default)]
    pub tribe: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub answers: Vec<QuizAnswer>,
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = quiz_attempts)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub passed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = quiz_attempts)]
pub struct NewQuizAttempt {
    pub profile_id: Uuid,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub passed: bool,
}

// --- CommunityEvent ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = community_events)]
pub struct CommunityEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    #[validate(range(min = 1, max = 100000))]
    pub capacity: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = community_events)]
pub struct NewCommunityEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub created_by: Uuid,
}

// --- EventRsvp ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Going,
    Interested,
    NotGoing,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Going => "going",
            RsvpStatus::Interested => "interested",
            RsvpStatus::NotGoing => "not_going",
        }
    }
}

impl FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "going" => Ok(RsvpStatus::Going),
            "interested" => Ok(RsvpStatus::Interested),
            "not_going" => Ok(RsvpStatus::NotGoing),
            _ => Err(format!("unknown rsvp status: {s}")),
        }
    }
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = event_rsvps)]
pub struct EventRsvp {
    pub id: Uuid,
    pub event_id: Uuid,
    pub profile_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RsvpRequest {
    pub status: RsvpStatus,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = event_rsvps)]
pub struct NewEventRsvp {
    pub event_id: Uuid,
    pub profile_id: Uuid,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endorsement_types_round_trip_through_storage() {
        for kind in EndorsementType::ALL {
            assert_eq!(kind.as_str().parse::<EndorsementType>(), Ok(kind));
        }
        assert!("charisma".parse::<EndorsementType>().is_err());

        let req: CreateEndorsementRequest = serde_json::from_value(serde_json::json!({
            "endorsed_id": Uuid::now_v7(),
            "endorsement_type": "family_values"
        }))
        .unwrap();
        assert_eq!(req.endorsement_type, EndorsementType::FamilyValues);
    }

    #[test]
    fn event_request_limits() {
        let req = CreateEventRequest {
            title: "Ou".into(),
            description: None,
            location: Some("Brixton".into()),
            starts_at: Utc::now(),
            capacity: Some(0),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("capacity"));
    }

    #[test]
    fn empty_quiz_submission_is_rejected() {
        let submission = QuizSubmission { tribe: None, answers: vec![] };
        assert!(submission.validate().is_err());
    }

    #[test]
    fn status_update_requires_a_field() {
        assert!(UserStatusUpdate::default().is_empty());
        let update: UserStatusUpdate = serde_json::from_str(r#"{"is_active":false}"#).unwrap();
        assert!(!update.is_empty());
    }

    #[test]
    fn rsvp_status_parses_snake_case() {
        let req: RsvpRequest = serde_json::from_str(r#"{"status":"not_going"}"#).unwrap();
        assert_eq!(req.status, RsvpStatus::NotGoing);
        assert_eq!("interested".parse::<RsvpStatus>(), Ok(RsvpStatus::Interested));
    }
}
