use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{service}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: User errors
/// - E2xxx: Matching errors
/// - E3xxx: Messaging errors
/// - E4xxx: Moderation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    RateLimited,
    ServiceUnavailable,
    BadRequest,
    TokenExpired,
    TokenInvalid,

    // User (E1xxx)
    UserNotFound,
    EmailAlreadyExists,
    PasswordTooWeak,
    PhotoNotFound,
    OnboardingIncomplete,

    // Matching (E2xxx)
    CannotSwipeSelf,
    AlreadySwiped,
    SwipeNotFound,
    BlockedPair,
    MatchNotFound,
    NotMatchParticipant,
    CannotBlockSelf,

    // Messaging (E3xxx)
    MatchUnmatched,
    MessageNotFound,

    // Moderation (E4xxx)
    ReportNotFound,
    CannotReportSelf,
    ReportAlreadyResolved,
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
            Self::RateLimited => "E0006",
            Self::ServiceUnavailable => "E0007",
            Self::BadRequest => "E0008",
            Self::TokenExpired => "E0009",
            Self::TokenInvalid => "E0010",

            // User
            Self::UserNotFound => "E1001",
            Self::EmailAlreadyExists => "E1002",
            Self::PasswordTooWeak => "E1003",
            Self::PhotoNotFound => "E1004",
            Self::OnboardingIncomplete => "E1005",

            // Matching
            Self::CannotSwipeSelf => "E2001",
            Self::AlreadySwiped => "E2002",
            Self::SwipeNotFound => "E2003",
            Self::BlockedPair => "E2004",
            Self::MatchNotFound => "E2005",
            Self::NotMatchParticipant => "E2006",
            Self::CannotBlockSelf => "E2007",

            // Messaging
            Self::MatchUnmatched => "E3001",
            Self::MessageNotFound => "E3002",

            // Moderation
            Self::ReportNotFound => "E4001",
            Self::CannotReportSelf => "E4002",
            Self::ReportAlreadyResolved => "E4003",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::ServiceUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::PasswordTooWeak
            | Self::CannotSwipeSelf | Self::CannotBlockSelf => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::UserNotFound | Self::PhotoNotFound | Self::SwipeNotFound
            | Self::MatchNotFound | Self::MessageNotFound | Self::ReportNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::BlockedPair | Self::NotMatchParticipant
            | Self::MatchUnmatched | Self::OnboardingIncomplete | Self::CannotReportSelf => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::EmailAlreadyExists | Self::AlreadySwiped | Self::ReportAlreadyResolved => StatusCode::CONFLICT,
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

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The error code this error will surface as, if it is a known domain error.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Known { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_error_taxonomy() {
        // InvalidOperation-style errors are 400
        assert_eq!(ErrorCode::CannotSwipeSelf.status_code(), StatusCode::BAD_REQUEST);
        // Missing entities are 404
        assert_eq!(ErrorCode::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::SwipeNotFound.status_code(), StatusCode::NOT_FOUND);
        // Duplicate swipes conflict
        assert_eq!(ErrorCode::AlreadySwiped.status_code(), StatusCode::CONFLICT);
        // Blocked pairs and non-participants are forbidden
        assert_eq!(ErrorCode::BlockedPair.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotMatchParticipant.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn codes_are_unique() {
        let all = [
            ErrorCode::InternalError,
            ErrorCode::ValidationError,
            ErrorCode::NotFound,
            ErrorCode::Unauthorized,
            ErrorCode::Forbidden,
            ErrorCode::RateLimited,
            ErrorCode::ServiceUnavailable,
            ErrorCode::BadRequest,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::UserNotFound,
            ErrorCode::EmailAlreadyExists,
            ErrorCode::PasswordTooWeak,
            ErrorCode::PhotoNotFound,
            ErrorCode::OnboardingIncomplete,
            ErrorCode::CannotSwipeSelf,
            ErrorCode::AlreadySwiped,
            ErrorCode::SwipeNotFound,
            ErrorCode::BlockedPair,
            ErrorCode::MatchNotFound,
            ErrorCode::NotMatchParticipant,
            ErrorCode::CannotBlockSelf,
            ErrorCode::MatchUnmatched,
            ErrorCode::MessageNotFound,
            ErrorCode::ReportNotFound,
            ErrorCode::CannotReportSelf,
            ErrorCode::ReportAlreadyResolved,
        ];
        let mut codes: Vec<&str> = all.iter().map(|c| c.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
