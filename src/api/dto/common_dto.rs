//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::calendar::parse_game_date;
use crate::error::GameError;
use chrono::NaiveDate;

/// Optional `?date=YYYY-MM-DD` selector for daily games.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateParams {
    /// Puzzle date; today in the canonical time zone when absent.
    #[serde(default)]
    pub date: Option<String>,
}

impl DateParams {
    /// Parses the date, if one was given.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidDate`] for malformed input.
    pub fn parsed(&self) -> Result<Option<NaiveDate>, GameError> {
        parse_optional_date(self.date.as_deref())
    }
}

/// Pagination query parameters for the history endpoint.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Maximum number of items (1-100). Defaults to 20.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Items to skip. Defaults to 0.
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    20
}

/// Response body for simple acknowledgements.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

/// Parses an optional `YYYY-MM-DD` string; blank counts as absent.
///
/// # Errors
///
/// Returns [`GameError::InvalidDate`] for malformed input.
pub fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, GameError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_game_date)
        .transpose()
}
