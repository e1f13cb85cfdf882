use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use harambee_shared::clients::db;
use harambee_shared::types::api::{HealthCheck, HealthResponse};

use crate::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = HealthCheck::from_result("database", db::ping(&state.db));
    Json(
        HealthResponse::healthy("harambee-matching", env!("CARGO_PKG_VERSION"))
            .with_checks(vec![database]),
    )
}
