use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use harambee_shared::clients::db;
use harambee_shared::errors::AppResult;
use harambee_shared::types::auth::AuthUser;
use harambee_shared::types::ApiResponse;

use crate::models::Conversation;
use crate::schema::{conversations, profiles};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub match_id: Uuid,
    pub partner_id: Uuid,
    pub partner_name: Option<String>,
    pub unread_count: i32,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ConversationSummary {
    fn for_member(conversation: &Conversation, user_id: Uuid, names: &HashMap<Uuid, Option<String>>) -> Self {
        let partner_id = conversation.partner_of(user_id);
        Self {
            id: conversation.id,
            match_id: conversation.match_id,
            partner_id,
            partner_name: names.get(&partner_id).cloned().flatten(),
            unread_count: conversation.unread_for(user_id),
            last_message_at: conversation.last_message_at,
            created_at: conversation.created_at,
        }
    }
}

// --- GET /conversations ---

pub async fn list_conversations(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ConversationSummary>>>> {
    let mut conn = db::conn(&state.db)?;

    let rows = conversations::table
        .filter(conversations::user1_id.eq(user.id).or(conversations::user2_id.eq(user.id)))
        .filter(conversations::is_active.eq(true))
        .order((
            conversations::last_message_at.desc().nulls_last(),
            conversations::created_at.desc(),
        ))
        .load::<Conversation>(&mut conn)?;

    let partner_ids: Vec<Uuid> = rows.iter().map(|c| c.partner_of(user.id)).collect();
    let names: HashMap<Uuid, Option<String>> = profiles::table
        .filter(profiles::id.eq_any(&partner_ids))
        .select((profiles::id, profiles::display_name))
        .load::<(Uuid, Option<String>)>(&mut conn)?
        .into_iter()
        .collect();

    let items = rows
        .iter()
        .map(|c| ConversationSummary::for_member(c, user.id, &names))
        .collect();

    Ok(Json(ApiResponse::ok(items)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_is_seen_from_the_caller() {
        let (amara, kwame) = (Uuid::now_v7(), Uuid::now_v7());
        let conversation = Conversation {
            id: Uuid::now_v7(),
            match_id: Uuid::now_v7(),
            user1_id: amara,
            user2_id: kwame,
            user1_unread: 0,
            user2_unread: 4,
            last_message_at: Some(Utc::now()),
            is_active: true,
            created_at: Utc::now(),
        };
        let names = HashMap::from([(amara, Some("Amara".to_string())), (kwame, None)]);

        let for_kwame = ConversationSummary::for_member(&conversation, kwame, &names);
        assert_eq!(for_kwame.partner_id, amara);
        assert_eq!(for_kwame.partner_name.as_deref(), Some("Amara"));
        assert_eq!(for_kwame.unread_count, 4);

        let for_amara = ConversationSummary::for_member(&conversation, amara, &names);
        assert_eq!(for_amara.partner_name, None);
        assert_eq!(for_amara.unread_count, 0);
    }
}
