//! Game handlers: catalog, state, moves and history.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    DateParams, GameListResponse, GameStateResponse, HistoryResponse, MoveRequest, MoveResponse,
    PaginationParams, TodayResponse, parse_optional_date,
};
use crate::api::identity::Player;
use crate::app_state::AppState;
use crate::domain::calendar::CANONICAL_TIME_ZONE;
use crate::error::{ErrorResponse, GameError};

/// `GET /games` — List registered games.
#[utoipa::path(
    get,
    path = "/api/v1/games",
    tag = "Games",
    summary = "List games",
    description = "Returns the configuration of every registered game.",
    responses(
        (status = 200, description = "Game catalog", body = GameListResponse),
    )
)]
pub async fn list_games(State(state): State<AppState>) -> impl IntoResponse {
    Json(GameListResponse {
        games: state.sessions.registry().all_configs(),
    })
}

/// `GET /games/today` — Today's puzzle date.
#[utoipa::path(
    get,
    path = "/api/v1/games/today",
    tag = "Games",
    summary = "Today's puzzle date",
    description = "Returns the current date in the time zone that defines daily puzzles.",
    responses(
        (status = 200, description = "Canonical date", body = TodayResponse),
    )
)]
pub async fn today(State(state): State<AppState>) -> impl IntoResponse {
    Json(TodayResponse {
        date: state.sessions.today(),
        time_zone: CANONICAL_TIME_ZONE.name().to_string(),
    })
}

/// `GET /games/{game_id}/state` — Current session, created on first access.
///
/// # Errors
///
/// Returns [`GameError`] for an unknown game, an invalid date or a storage
/// failure.
#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}/state",
    tag = "Games",
    summary = "Get or start a session",
    description = "Loads the caller's session for the game and date, creating it if needed. The answer is hidden until the session is complete.",
    params(
        ("game_id" = String, Path, description = "Game identifier"),
        DateParams,
    ),
    responses(
        (status = 200, description = "Session state", body = GameStateResponse),
        (status = 400, description = "Invalid, future or expired date", body = ErrorResponse),
        (status = 404, description = "Game not found", body = ErrorResponse),
    )
)]
pub async fn game_state(
    State(state): State<AppState>,
    player: Player,
    Path(game_id): Path<String>,
    Query(params): Query<DateParams>,
) -> Result<impl IntoResponse, GameError> {
    let date = params.parsed()?;
    let session = state.sessions.state(&player.id, &game_id, date).await?;
    Ok(Json(GameStateResponse::from(session)))
}

/// `POST /games/{game_id}/move` — Submit a move.
///
/// # Errors
///
/// Returns [`GameError`] for a finished session, a lost race, an invalid
/// date or a storage failure. A move the game refuses is answered with
/// `200 {"error": ...}`.
#[utoipa::path(
    post,
    path = "/api/v1/games/{game_id}/move",
    tag = "Games",
    summary = "Submit a move",
    description = "Validates and applies one move. Refused moves return 200 with an `error` field and change nothing.",
    params(("game_id" = String, Path, description = "Game identifier")),
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Updated state, or the refusal reason", body = MoveResponse),
        (status = 400, description = "Invalid, future or expired date", body = ErrorResponse),
        (status = 404, description = "Game not found", body = ErrorResponse),
        (status = 409, description = "Game already complete or updated concurrently", body = ErrorResponse),
    )
)]
pub async fn submit_move(
    State(state): State<AppState>,
    player: Player,
    Path(game_id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<impl IntoResponse, GameError> {
    let date = parse_optional_date(req.date.as_deref())?;
    let outcome = state
        .sessions
        .submit_move(&player.id, &game_id, &req.mv, date)
        .await?;
    Ok(Json(MoveResponse::from(outcome)))
}

/// `GET /games/{game_id}/history` — The caller's past sessions.
///
/// # Errors
///
/// Returns [`GameError`] for an unknown game or a storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/games/{game_id}/history",
    tag = "Games",
    summary = "Session history",
    description = "Returns the caller's sessions for the game, newest first.",
    params(
        ("game_id" = String, Path, description = "Game identifier"),
        PaginationParams,
    ),
    responses(
        (status = 200, description = "Sessions", body = HistoryResponse),
        (status = 404, description = "Game not found", body = ErrorResponse),
    )
)]
pub async fn history(
    State(state): State<AppState>,
    player: Player,
    Path(game_id): Path<String>,
    Query(page): Query<PaginationParams>,
) -> Result<impl IntoResponse, GameError> {
    let sessions = state
        .sessions
        .history(&player.id, Some(&game_id), page.limit, page.offset)
        .await?;
    Ok(Json(HistoryResponse { sessions }))
}

/// Game routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/games", get(list_games))
        .route("/games/today", get(today))
        .route("/games/{game_id}/state", get(game_state))
        .route("/games/{game_id}/move", post(submit_move))
        .route("/games/{game_id}/history", get(history))
}
