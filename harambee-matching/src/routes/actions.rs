use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use harambee_shared::errors::AppResult;
use harambee_shared::types::auth::AuthUser;
use harambee_shared::types::ApiResponse;

use crate::events::publisher;
use crate::matching::RequestedAction;
use crate::models::Match;
use crate::services::match_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub target_id: Uuid,
    pub action: RequestedAction,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    #[serde(rename = "match")]
    pub record: Match,
    pub became_mutual: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<Uuid>,
}

// --- POST /actions ---

pub async fn record_action(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ActionRequest>,
) -> AppResult<Json<ApiResponse<ActionResponse>>> {
    let now = Utc::now();
    let outcome = match_service::apply_action(
        state.store.as_ref(),
        user.id,
        req.target_id,
        req.action,
        now.date_naive(),
        now,
    )?;

    // Only the request that opened the conversation announces the match.
    if outcome.became_mutual && outcome.conversation_id.is_some() {
        publisher::publish_mutual_match(&state.rabbitmq, &outcome.record, outcome.conversation_id)
            .await;
    }

    let message = if outcome.became_mutual {
        "It's a match"
    } else {
        "action recorded"
    };

    Ok(Json(ApiResponse::ok_with_message(
        ActionResponse {
            record: outcome.record,
            became_mutual: outcome.became_mutual,
            conversation_id: outcome.conversation_id,
        },
        message,
    )))
}
