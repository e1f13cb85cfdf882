use diesel::prelude::*;
use uuid::Uuid;

use harambee_shared::clients::db::DbConn;
use harambee_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::Conversation;
use crate::schema::conversations;

pub const MAX_MESSAGE_CHARS: usize = 2000;
const PREVIEW_CHARS: usize = 100;

/// Loads a conversation the caller takes part in.
pub fn load_for_member(conn: &mut DbConn, conversation_id: Uuid, user_id: Uuid) -> AppResult<Conversation> {
    let conversation = conversations::table
        .find(conversation_id)
        .first::<Conversation>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ConversationNotFound, "conversation not found"))?;

    ensure_member(&conversation, user_id)?;
    Ok(conversation)
}

pub fn ensure_member(conversation: &Conversation, user_id: Uuid) -> AppResult<()> {
    if !conversation.is_member(user_id) {
        return Err(AppError::new(
            ErrorCode::NotConversationMember,
            "you are not a member of this conversation",
        ));
    }
    Ok(())
}

/// Trims the body and checks it is 1 to 2000 characters.
pub fn validate_content(content: &str) -> AppResult<&str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "message content is required"));
    }
    if trimmed.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            format!("message content is limited to {MAX_MESSAGE_CHARS} characters"),
        ));
    }
    Ok(trimmed)
}

pub fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Conversation;
    use axum::http::StatusCode;
    use chrono::Utc;

    #[test]
    fn content_bounds() {
        assert!(validate_content("   ").is_err());
        assert_eq!(validate_content("  hello ").unwrap(), "hello");
        assert!(validate_content(&"a".repeat(MAX_MESSAGE_CHARS)).is_ok());
        assert!(validate_content(&"a".repeat(MAX_MESSAGE_CHARS + 1)).is_err());
        // counted in characters, not bytes
        assert!(validate_content(&"é".repeat(MAX_MESSAGE_CHARS)).is_ok());
    }

    #[test]
    fn preview_is_char_safe() {
        let long = "ọ".repeat(150);
        assert_eq!(preview(&long).chars().count(), 100);
        assert_eq!(preview("hi"), "hi");
    }

    #[test]
    fn outsiders_are_forbidden() {
        let conversation = Conversation {
            id: Uuid::now_v7(),
            match_id: Uuid::now_v7(),
            user1_id: Uuid::now_v7(),
            user2_id: Uuid::now_v7(),
            user1_unread: 0,
            user2_unread: 0,
            last_message_at: None,
            is_active: true,
            created_at: Utc::now(),
        };
        assert!(ensure_member(&conversation, conversation.user2_id).is_ok());
        let err = ensure_member(&conversation, Uuid::now_v7()).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
