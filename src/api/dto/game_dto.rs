//! Game DTOs: catalog, session state, moves and history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{GameConfig, Illustration};
use crate::service::{MoveOutcome, SessionState, SessionView};

/// Response body for `GET /games`.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameListResponse {
    /// Every registered game.
    pub games: Vec<GameConfig>,
}

/// Response body for `GET /games/today`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TodayResponse {
    /// Today's puzzle date in the canonical time zone.
    pub date: NaiveDate,
    /// Name of that time zone.
    pub time_zone: String,
}

/// Session plus illustration, returned by the state and move endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameStateResponse {
    /// Player-facing session.
    pub state: SessionView,
    /// Illustration of the answer once won.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub illustration: Option<Illustration>,
}

impl From<SessionState> for GameStateResponse {
    fn from(s: SessionState) -> Self {
        Self {
            state: s.view,
            illustration: s.illustration,
        }
    }
}

/// Request body for `POST /games/{game_id}/move`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveRequest {
    /// Game-specific move, e.g. `{"guess": "crane"}`.
    #[serde(rename = "move")]
    #[schema(value_type = Object)]
    pub mv: serde_json::Value,
    /// Puzzle date for daily games; today when absent.
    #[serde(default)]
    pub date: Option<String>,
}

/// Response body for `POST /games/{game_id}/move`.
///
/// A refused move is a normal outcome and is answered with `200` and an
/// `error` field instead of an HTTP error.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum MoveResponse {
    /// The move was applied.
    Applied(GameStateResponse),
    /// The move was refused.
    Refused {
        /// Reason from the game.
        error: String,
    },
}

impl From<MoveOutcome> for MoveResponse {
    fn from(outcome: MoveOutcome) -> Self {
        match outcome {
            MoveOutcome::Accepted(result) => Self::Applied(GameStateResponse {
                state: result.view,
                illustration: result.illustration,
            }),
            MoveOutcome::Rejected { reason } => Self::Refused { error: reason },
        }
    }
}

/// Response body for `GET /games/{game_id}/history`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    /// Sessions, newest first.
    pub sessions: Vec<SessionView>,
}
