use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope for every domain event published on the topic exchange.
///
/// Routing key format: `harambee.{domain}.{entity}.{action}`
/// Example: `harambee.matching.match.mutual`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

pub mod routing_keys {
    // Profile events
    pub const USER_PROFILE_UPDATED: &str = "harambee.user.profile.updated";
    pub const USER_PROFILE_DEACTIVATED: &str = "harambee.user.profile.deactivated";

    // Matching events
    pub const MATCHING_MATCH_MUTUAL: &str = "harambee.matching.match.mutual";

    // Messaging events
    pub const MESSAGING_MESSAGE_SENT: &str = "harambee.messaging.message.sent";

    // Community events
    pub const COMMUNITY_ENDORSEMENT_CREATED: &str = "harambee.community.endorsement.created";
    pub const COMMUNITY_QUIZ_PASSED: &str = "harambee.community.quiz.passed";
}

pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileUpdated {
        pub profile_id: Uuid,
        /// Which part of the profile changed: `profile`, `cultural_background`,
        /// `personality`, `preferences`, `photos`.
        pub section: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileDeactivated {
        pub profile_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MutualMatch {
        pub match_id: Uuid,
        pub user1_id: Uuid,
        pub user2_id: Uuid,
        pub overall_score: i32,
        pub conversation_id: Option<Uuid>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MessageSent {
        pub message_id: Uuid,
        pub conversation_id: Uuid,
        pub sender_id: Uuid,
        pub recipient_id: Uuid,
        pub content_preview: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct EndorsementCreated {
        pub endorsement_id: Uuid,
        pub endorser_id: Uuid,
        pub endorsed_id: Uuid,
        pub endorsement_type: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct QuizPassed {
        pub profile_id: Uuid,
        pub attempt_id: Uuid,
        pub percentage: i32,
    }
}
