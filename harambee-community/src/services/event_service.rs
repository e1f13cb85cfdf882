use chrono::{DateTime, Utc};

use harambee_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{CommunityEvent, RsvpStatus};

/// Only a switch *to* `going` consumes a seat; members already going keep theirs.
pub fn check_capacity(
    capacity: Option<i32>,
    going: i64,
    current: Option<RsvpStatus>,
    requested: RsvpStatus,
) -> AppResult<()> {
    if requested != RsvpStatus::Going || current == Some(RsvpStatus::Going) {
        return Ok(());
    }
    match capacity {
        Some(limit) if going >= i64::from(limit) => {
            Err(AppError::new(ErrorCode::EventFull, "event is at capacity"))
        }
        _ => Ok(()),
    }
}

pub fn ensure_upcoming(event: &CommunityEvent, now: DateTime<Utc>) -> AppResult<()> {
    if event.starts_at <= now {
        return Err(AppError::bad_request("event has already started"));
    }
    Ok(())
}

pub fn ensure_future_start(starts_at: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<()> {
    if starts_at <= now {
        return Err(AppError::new(ErrorCode::ValidationError, "starts_at must be in the future"));
    }
    Ok(())
}
