use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{service}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E2xxx: Profile errors
/// - E3xxx: Matching errors
/// - E4xxx: Messaging errors
/// - E5xxx: Community errors (endorsements, quiz, events, admin)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    ServiceUnavailable,
    BadRequest,
    PayloadTooLarge,
    Conflict,
    TokenExpired,
    TokenInvalid,

    // Profile (E2xxx)
    ProfileNotFound,
    ProfileInactive,
    PhotoUploadFailed,
    PhotoNotFound,
    PhotoLimitReached,
    Underage,

    // Matching (E3xxx)
    MatchNotFound,
    CannotActOnSelf,
    InvalidAction,

    // Messaging (E4xxx)
    ConversationNotFound,
    NotConversationMember,
    ConversationInactive,

    // Community (E5xxx)
    CannotEndorseSelf,
    DuplicateEndorsement,
    QuizQuestionNotFound,
    EventNotFound,
    EventFull,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::ServiceUnavailable => "E0007",
            Self::BadRequest => "E0008",
            Self::PayloadTooLarge => "E0009",
            Self::Conflict => "E0010",
            Self::TokenExpired => "E0011",
            Self::TokenInvalid => "E0012",

            // Profile
            Self::ProfileNotFound => "E2001",
            Self::ProfileInactive => "E2002",
            Self::PhotoUploadFailed => "E2003",
            Self::PhotoNotFound => "E2004",
            Self::PhotoLimitReached => "E2005",
            Self::Underage => "E2006",

            // Matching
            Self::MatchNotFound => "E3001",
            Self::CannotActOnSelf => "E3002",
            Self::InvalidAction => "E3003",

            // Messaging
            Self::ConversationNotFound => "E4001",
            Self::NotConversationMember => "E4002",
            Self::ConversationInactive => "E4003",

            // Community
            Self::CannotEndorseSelf => "E5001",
            Self::DuplicateEndorsement => "E5002",
            Self::QuizQuestionNotFound => "E5003",
            Self::EventNotFound => "E5004",
            Self::EventFull => "E5005",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::ServiceUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::Underage
            | Self::CannotActOnSelf | Self::InvalidAction | Self::CannotEndorseSelf
            | Self::PhotoUploadFailed | Self::PhotoLimitReached => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound | Self::ProfileNotFound | Self::PhotoNotFound
            | Self::MatchNotFound | Self::ConversationNotFound | Self::QuizQuestionNotFound
            | Self::EventNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotConversationMember | Self::ProfileInactive
            | Self::ConversationInactive => StatusCode::FORBIDDEN,
            Self::Conflict | Self::DuplicateEndorsement | Self::EventFull => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Field-level validation failure, carrying the `validator` error map as details.
    pub fn invalid(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(errors.field_errors())
            .unwrap_or(serde_json::Value::Null);
        Self::with_details(ErrorCode::ValidationError, "request validation failed", details)
    }

    /// Status code this error will be rendered with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Known { code, .. } => code.status_code(),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(err) => match err {
                diesel::result::Error::NotFound => StatusCode::NOT_FOUND,
                diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    StatusCode::CONFLICT
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::invalid(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_response = match &self {
            AppError::Known { code, message, details } => {
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                resp
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                ApiErrorResponse::new("E0001", "internal server error")
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => {
                        ApiErrorResponse::new("E0003", "resource not found")
                    }
                    diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ApiErrorResponse::new("E0010", "resource already exists")
                    }
                    _ => ApiErrorResponse::new("E0001", "database error"),
                }
            }
            AppError::Validation(msg) => ApiErrorResponse::new("E0002", msg),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
