use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use harambee_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::EndorsementType;

pub const RECENT_LIMIT: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndorsementCount {
    pub endorsement_type: EndorsementType,
    pub count: i64,
}

pub fn ensure_not_self(endorser_id: Uuid, endorsed_id: Uuid) -> AppResult<()> {
    if endorser_id == endorsed_id {
        return Err(AppError::new(ErrorCode::CannotEndorseSelf, "you cannot endorse yourself"));
    }
    Ok(())
}

/// One entry per endorsement type, zero-filled, in a fixed order.
pub fn tally(grouped: &[(String, i64)]) -> Vec<EndorsementCount> {
    let counts: HashMap<&str, i64> = grouped.iter().map(|(kind, n)| (kind.as_str(), *n)).collect();
    EndorsementType::ALL
        .into_iter()
        .map(|endorsement_type| EndorsementCount {
            endorsement_type,
            count: counts.get(endorsement_type.as_str()).copied().unwrap_or(0),
        })
        .collect()
}
