//! Engine error types with HTTP status code mapping.
//!
//! [`GameError`] is the central error type for the engine. Each variant
//! maps to a stable numeric code and an HTTP status. Soft move rejections
//! (wrong length, unknown word, duplicate guess) are not errors at all; they
//! travel as [`crate::service::MoveOutcome::Rejected`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1101,
///     "message": "cannot play future games"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`GameError`] code ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Engine error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category                  | HTTP Status                  |
/// |-----------|---------------------------|------------------------------|
/// | 1000–1999 | Client input / temporal   | 400 Bad Request              |
/// | 2000–2999 | State / Not Found         | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server                    | 500 Internal Server Error    |
/// | 4000–4999 | Access                    | 401 / 403                    |
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// No plugin is registered under the given game identifier.
    #[error("game {0} not found")]
    GameNotFound(String),

    /// A move was submitted against a session that already ended.
    #[error("game is already complete")]
    GameAlreadyComplete,

    /// A daily game was initialized without a date.
    #[error("game date is required for daily games")]
    DateRequired,

    /// A date string could not be parsed as `YYYY-MM-DD`.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The requested game date lies after today in the canonical time zone.
    #[error("cannot play future games ({0})")]
    FutureDate(NaiveDate),

    /// The requested game date lies outside the replay window.
    #[error("date {date} too far in past (max {max_days} days)")]
    DateTooOld {
        /// The rejected date.
        date: NaiveDate,
        /// Size of the replay window in days.
        max_days: i64,
    },

    /// The leaderboard period type is not one of the known buckets.
    #[error("invalid period type: {0}")]
    InvalidPeriod(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Another request committed a move on the same session first.
    #[error("session was updated concurrently; reload and retry")]
    ConcurrentMove,

    /// A plugin with the same identifier is already registered.
    #[error("game {0} is already registered")]
    AlreadyRegistered(String),

    /// Word lists could not be loaded or are unusable.
    #[error("word list error: {0}")]
    WordList(String),

    /// A persisted game payload does not match the plugin's state shape.
    #[error("corrupt game state: {0}")]
    CorruptState(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// The illustration collaborator failed.
    #[error("content generation failed: {0}")]
    Content(String),

    /// No authenticated identity accompanied the request.
    #[error("authentication required")]
    MissingIdentity,

    /// The caller's email is not on the whitelist.
    #[error("email is not whitelisted")]
    NotWhitelisted,

    /// The caller lacks the privileges for this operation.
    #[error("forbidden")]
    Forbidden,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GameError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::DateRequired => 1002,
            Self::InvalidDate(_) => 1003,
            Self::InvalidPeriod(_) => 1004,
            Self::FutureDate(_) => 1101,
            Self::DateTooOld { .. } => 1102,
            Self::GameNotFound(_) => 2001,
            Self::GameAlreadyComplete => 2002,
            Self::ConcurrentMove => 2003,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::CorruptState(_) => 3002,
            Self::WordList(_) => 3003,
            Self::AlreadyRegistered(_) => 3004,
            Self::Content(_) => 3005,
            Self::MissingIdentity => 4001,
            Self::NotWhitelisted => 4002,
            Self::Forbidden => 4003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::DateRequired
            | Self::InvalidDate(_)
            | Self::InvalidPeriod(_)
            | Self::FutureDate(_)
            | Self::DateTooOld { .. } => StatusCode::BAD_REQUEST,
            Self::GameNotFound(_) => StatusCode::NOT_FOUND,
            Self::GameAlreadyComplete | Self::ConcurrentMove => StatusCode::CONFLICT,
            Self::MissingIdentity => StatusCode::UNAUTHORIZED,
            Self::NotWhitelisted | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_)
            | Self::PersistenceError(_)
            | Self::CorruptState(_)
            | Self::WordList(_)
            | Self::AlreadyRegistered(_)
            | Self::Content(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` for faults whose details must not reach the client.
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        matches!(
            self,
            Self::Internal(_)
                | Self::PersistenceError(_)
                | Self::CorruptState(_)
                | Self::WordList(_)
                | Self::AlreadyRegistered(_)
                | Self::Content(_)
        )
    }
}

impl From<sqlx::Error> for GameError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for GameError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if self.is_opaque() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn temporal_errors_are_client_faults() {
        let Some(date) = NaiveDate::from_ymd_opt(2030, 1, 1) else {
            panic!("valid date");
        };
        assert_eq!(
            GameError::FutureDate(date).status_code(),
            StatusCode::BAD_REQUEST
        );
        let too_old = GameError::DateTooOld { date, max_days: 30 };
        assert_eq!(too_old.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(too_old.error_code(), 1102);
    }

    #[test]
    fn state_errors_conflict() {
        assert_eq!(
            GameError::GameAlreadyComplete.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            GameError::GameNotFound("chess".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn storage_errors_are_opaque() {
        assert!(GameError::PersistenceError("connection reset".into()).is_opaque());
        assert!(!GameError::GameAlreadyComplete.is_opaque());
    }

    #[test]
    fn opaque_response_hides_details() {
        let response = GameError::PersistenceError("password=hunter2".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
