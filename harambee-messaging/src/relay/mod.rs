//! Realtime fan-out for open chats over Redis pub/sub, one channel per conversation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use harambee_shared::clients::redis::RedisClient;

use crate::models::Message;

pub fn channel(conversation_id: Uuid) -> String {
    format!("chat:{conversation_id}")
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent<'a> {
    Message { message: &'a Message },
    Typing { user_id: Uuid, at: DateTime<Utc> },
    Read { user_id: Uuid, at: DateTime<Utc> },
}

/// Publishes without failing the request: the message is already stored, so a
/// relay outage only delays delivery until the client refetches.
pub async fn broadcast(redis: &RedisClient, conversation_id: Uuid, event: &ChatEvent<'_>) {
    let payload = match serde_json::to_string(event) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode chat event");
            return;
        }
    };

    match redis.publish(&channel(conversation_id), &payload).await {
        Ok(receivers) => {
            tracing::debug!(conversation = %conversation_id, receivers, "chat event relayed")
        }
        Err(e) => {
            tracing::warn!(error = %e, conversation = %conversation_id, "chat relay publish failed")
        }
    }
}
