use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use harambee_shared::clients::db::{self, DbConn};
use harambee_shared::errors::{AppError, AppResult, ErrorCode};
use harambee_shared::middleware::AdminUser;
use harambee_shared::types::auth::AuthUser;
use harambee_shared::types::pagination::{Paginated, PaginationParams};
use harambee_shared::types::ApiResponse;

use crate::models::{
    CommunityEvent, CreateEventRequest, EventRsvp, NewCommunityEvent, NewEventRsvp, RsvpRequest,
    RsvpStatus,
};
use crate::schema::{community_events, event_rsvps, profiles};
use crate::services::event_service;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: CommunityEvent,
    pub going_count: i64,
    pub spots_left: Option<i64>,
}

impl EventView {
    fn new(event: CommunityEvent, going_count: i64) -> Self {
        let spots_left = event.capacity.map(|c| (i64::from(c) - going_count).max(0));
        Self { event, going_count, spots_left }
    }
}

#[derive(Debug, Serialize)]
pub struct Attendee {
    pub profile_id: Uuid,
    pub display_name: Option<String>,
    pub status: String,
}

fn going_counts(conn: &mut DbConn, event_ids: &[Uuid]) -> AppResult<HashMap<Uuid, i64>> {
    let rows = event_rsvps::table
        .filter(event_rsvps::event_id.eq_any(event_ids))
        .filter(event_rsvps::status.eq(RsvpStatus::Going.as_str()))
        .group_by(event_rsvps::event_id)
        .select((event_rsvps::event_id, diesel::dsl::count_star()))
        .load::<(Uuid, i64)>(conn)?;
    Ok(rows.into_iter().collect())
}

fn find_event(conn: &mut DbConn, event_id: Uuid) -> AppResult<CommunityEvent> {
    community_events::table
        .find(event_id)
        .first::<CommunityEvent>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::EventNotFound, "event not found"))
}

// --- GET /events ---

pub async fn list_events(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<EventView>>>> {
    let mut conn = db::conn(&state.db)?;
    let now = Utc::now();

    let total: i64 = community_events::table
        .filter(community_events::starts_at.gt(now))
        .count()
        .get_result(&mut conn)?;

    let events = community_events::table
        .filter(community_events::starts_at.gt(now))
        .order((community_events::starts_at.asc(), community_events::id.asc()))
        .offset(params.offset())
        .limit(params.limit() as i64)
        .load::<CommunityEvent>(&mut conn)?;

    let ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
    let counts = going_counts(&mut conn, &ids)?;

    let items = events
        .into_iter()
        .map(|event| {
            let going = counts.get(&event.id).copied().unwrap_or(0);
            EventView::new(event, going)
        })
        .collect();

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}

// --- POST /events ---

pub async fn create_event(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<Json<ApiResponse<CommunityEvent>>> {
    req.validate()?;
    event_service::ensure_future_start(req.starts_at, Utc::now())?;

    let mut conn = db::conn(&state.db)?;
    let event = diesel::insert_into(community_events::table)
        .values(&NewCommunityEvent {
            title: req.title.trim().to_string(),
            description: req.description,
            location: req.location,
            starts_at: req.starts_at,
            capacity: req.capacity,
            created_by: admin.id,
        })
        .get_result::<CommunityEvent>(&mut conn)?;

    tracing::info!(event_id = %event.id, admin = %admin.id, "community event created");

    Ok(Json(ApiResponse::ok(event)))
}

// --- POST /events/:id/rsvp ---

pub async fn rsvp(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<RsvpRequest>,
) -> AppResult<Json<ApiResponse<EventRsvp>>> {
    let mut conn = db::conn(&state.db)?;

    let saved = conn.transaction::<_, AppError, _>(|conn| {
        // Row lock serializes seat checks for the same event.
        let event = community_events::table
            .find(event_id)
            .for_update()
            .get_result::<CommunityEvent>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::EventNotFound, "event not found"))?;
        event_service::ensure_upcoming(&event, Utc::now())?;

        let current = event_rsvps::table
            .filter(event_rsvps::event_id.eq(event_id))
            .filter(event_rsvps::profile_id.eq(user.id))
            .select(event_rsvps::status)
            .first::<String>(conn)
            .optional()?
            .and_then(|s| s.parse::<RsvpStatus>().ok());

        let going = going_counts(conn, &[event_id])?.get(&event_id).copied().unwrap_or(0);
        event_service::check_capacity(event.capacity, going, current, req.status)?;

        let row = diesel::insert_into(event_rsvps::table)
            .values(&NewEventRsvp {
                event_id,
                profile_id: user.id,
                status: req.status.as_str().to_string(),
            })
            .on_conflict((event_rsvps::event_id, event_rsvps::profile_id))
            .do_update()
            .set((
                event_rsvps::status.eq(req.status.as_str()),
                event_rsvps::updated_at.eq(Utc::now()),
            ))
            .get_result::<EventRsvp>(conn)?;
        Ok(row)
    })?;

    tracing::debug!(event_id = %event_id, profile_id = %user.id, status = %saved.status, "rsvp saved");

    Ok(Json(ApiResponse::ok(saved)))
}

// --- GET /events/:id/attendees ---

pub async fn list_attendees(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Attendee>>>> {
    let mut conn = db::conn(&state.db)?;
    find_event(&mut conn, event_id)?;

    let rsvps = event_rsvps::table
        .filter(event_rsvps::event_id.eq(event_id))
        .filter(event_rsvps::status.ne(RsvpStatus::NotGoing.as_str()))
        .order(event_rsvps::created_at.asc())
        .load::<EventRsvp>(&mut conn)?;

    let ids: Vec<Uuid> = rsvps.iter().map(|r| r.profile_id).collect();
    let names: HashMap<Uuid, Option<String>> = profiles::table
        .filter(profiles::id.eq_any(&ids))
        .filter(profiles::is_active.eq(true))
        .select((profiles::id, profiles::display_name))
        .load::<(Uuid, Option<String>)>(&mut conn)?
        .into_iter()
        .collect();

    // Deactivated members drop off the list.
    let attendees = rsvps
        .into_iter()
        .filter_map(|r| {
            names.get(&r.profile_id).map(|name| Attendee {
                profile_id: r.profile_id,
                display_name: name.clone(),
                status: r.status,
            })
        })
        .collect();

    Ok(Json(ApiResponse::ok(attendees)))
}
