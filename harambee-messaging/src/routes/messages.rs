use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use harambee_shared::clients::db;
use harambee_shared::errors::{AppError, AppResult, ErrorCode};
use harambee_shared::types::auth::AuthUser;
use harambee_shared::types::pagination::{Paginated, PaginationParams};
use harambee_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{Message, MessageType, NewMessage};
use crate::relay::{self, ChatEvent};
use crate::schema::{conversations, messages};
use crate::services::conversation_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
}

#[derive(Debug, Serialize)]
pub struct ReadReceipt {
    pub conversation_id: Uuid,
    pub messages_marked: usize,
}

// --- GET /conversations/:id/messages ---

pub async fn list_messages(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Message>>>> {
    let mut conn = db::conn(&state.db)?;
    conversation_service::load_for_member(&mut conn, conversation_id, user.id)?;

    let total: i64 = messages::table
        .filter(messages::conversation_id.eq(conversation_id))
        .count()
        .get_result(&mut conn)?;

    let items = messages::table
        .filter(messages::conversation_id.eq(conversation_id))
        .order((messages::created_at.desc(), messages::id.desc()))
        .offset(params.offset())
        .limit(params.limit() as i64)
        .load::<Message>(&mut conn)?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}

// --- POST /conversations/:id/messages ---

pub async fn send_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let content = conversation_service::validate_content(&req.content)?.to_string();

    let (message, recipient_id) = {
        let mut conn = db::conn(&state.db)?;
        conn.transaction::<_, AppError, _>(|conn| {
            let conversation = conversation_service::load_for_member(conn, conversation_id, user.id)?;
            if !conversation.is_active {
                return Err(AppError::new(ErrorCode::ConversationInactive, "conversation is closed"));
            }

            let message = diesel::insert_into(messages::table)
                .values(&NewMessage {
                    conversation_id,
                    sender_id: user.id,
                    content,
                    message_type: req.message_type.as_str().to_string(),
                })
                .get_result::<Message>(conn)?;

            let target = conversations::table.find(conversation_id);
            if conversation.user1_id == user.id {
                diesel::update(target)
                    .set((
                        conversations::user2_unread.eq(conversations::user2_unread + 1),
                        conversations::last_message_at.eq(message.created_at),
                    ))
                    .execute(conn)?;
            } else {
                diesel::update(target)
                    .set((
                        conversations::user1_unread.eq(conversations::user1_unread + 1),
                        conversations::last_message_at.eq(message.created_at),
                    ))
                    .execute(conn)?;
            }

            Ok((message, conversation.partner_of(user.id)))
        })?
    };

    metrics::counter!("messaging_messages_sent_total").increment(1);
    tracing::debug!(conversation = %conversation_id, message_id = %message.id, "message stored");

    relay::broadcast(&state.redis, conversation_id, &ChatEvent::Message { message: &message }).await;
    publisher::publish_message_sent(&state.rabbitmq, &message, recipient_id).await;

    Ok(Json(ApiResponse::ok(message)))
}

// --- POST /conversations/:id/read ---

pub async fn mark_read(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ReadReceipt>>> {
    let messages_marked = {
        let mut conn = db::conn(&state.db)?;
        conn.transaction::<_, AppError, _>(|conn| {
            let conversation = conversation_service::load_for_member(conn, conversation_id, user.id)?;

            let target = conversations::table.find(conversation_id);
            if conversation.user1_id == user.id {
                diesel::update(target).set(conversations::user1_unread.eq(0)).execute(conn)?;
            } else {
                diesel::update(target).set(conversations::user2_unread.eq(0)).execute(conn)?;
            }

            let marked = diesel::update(
                messages::table
                    .filter(messages::conversation_id.eq(conversation_id))
                    .filter(messages::sender_id.ne(user.id))
                    .filter(messages::is_read.eq(false)),
            )
            .set(messages::is_read.eq(true))
            .execute(conn)?;
            Ok(marked)
        })?
    };

    if messages_marked > 0 {
        relay::broadcast(
            &state.redis,
            conversation_id,
            &ChatEvent::Read { user_id: user.id, at: Utc::now() },
        )
        .await;
    }

    Ok(Json(ApiResponse::ok(ReadReceipt { conversation_id, messages_marked })))
}

// --- POST /conversations/:id/typing ---

pub async fn typing(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    {
        let mut conn = db::conn(&state.db)?;
        conversation_service::load_for_member(&mut conn, conversation_id, user.id)?;
    }

    relay::broadcast(
        &state.redis,
        conversation_id,
        &ChatEvent::Typing { user_id: user.id, at: Utc::now() },
    )
    .await;

    Ok(Json(ApiResponse::ok(())))
}
