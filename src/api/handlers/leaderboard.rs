//! Leaderboard handlers, always scoped to the caller's group.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{LeaderboardParams, LeaderboardResponse, UserRankResponse};
use crate::api::identity::Player;
use crate::app_state::AppState;
use crate::domain::PeriodType;
use crate::error::{ErrorResponse, GameError};

/// `GET /leaderboard/{game_id}/{period}` — Ranked rows of the caller's group.
///
/// # Errors
///
/// Returns [`GameError`] for an unknown game or period, or a storage
/// failure.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard/{game_id}/{period}",
    tag = "Leaderboard",
    summary = "Group leaderboard",
    description = "Ranks the caller's group for the current period by success rate, then streak, then fewest average attempts, then wins.",
    params(
        ("game_id" = String, Path, description = "Game identifier"),
        ("period" = String, Path, description = "daily, weekly, monthly or all_time"),
        LeaderboardParams,
    ),
    responses(
        (status = 200, description = "Ranked entries", body = LeaderboardResponse),
        (status = 400, description = "Unknown period", body = ErrorResponse),
        (status = 404, description = "Game not found", body = ErrorResponse),
    )
)]
pub async fn leaderboard(
    State(state): State<AppState>,
    player: Player,
    Path((game_id, period)): Path<(String, String)>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, GameError> {
    let period: PeriodType = period.parse()?;
    let page = state
        .leaderboard
        .leaderboard(&game_id, period, &player.group, params.limit)
        .await?;
    Ok(Json(LeaderboardResponse::from(page)))
}

/// `GET /leaderboard/{game_id}/{period}/me` — The caller's own entry.
///
/// # Errors
///
/// Returns [`GameError`] for an unknown game or period, or a storage
/// failure.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard/{game_id}/{period}/me",
    tag = "Leaderboard",
    summary = "Own leaderboard entry",
    description = "Returns the caller's stats and rank within their group, or null before their first completed game in the period.",
    params(
        ("game_id" = String, Path, description = "Game identifier"),
        ("period" = String, Path, description = "daily, weekly, monthly or all_time"),
    ),
    responses(
        (status = 200, description = "Own entry", body = UserRankResponse),
        (status = 400, description = "Unknown period", body = ErrorResponse),
        (status = 404, description = "Game not found", body = ErrorResponse),
    )
)]
pub async fn my_rank(
    State(state): State<AppState>,
    player: Player,
    Path((game_id, period)): Path<(String, String)>,
) -> Result<impl IntoResponse, GameError> {
    let period: PeriodType = period.parse()?;
    let entry = state
        .leaderboard
        .user_rank(&player.id, &game_id, period, &player.group)
        .await?;
    Ok(Json(UserRankResponse {
        entry: entry.map(Into::into),
    }))
}

/// Leaderboard routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leaderboard/{game_id}/{period}", get(leaderboard))
        .route("/leaderboard/{game_id}/{period}/me", get(my_rank))
}
