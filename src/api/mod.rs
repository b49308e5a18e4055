//! REST API layer: route handlers, DTOs, identity and router composition.
//!
//! Game endpoints are mounted under `/api/v1`; `/health` sits at the root.

pub mod dto;
pub mod handlers;
pub mod identity;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "Ferdle game server", description = "Daily word games with group leaderboards"),
    paths(
        handlers::games::list_games,
        handlers::games::today,
        handlers::games::game_state,
        handlers::games::submit_move,
        handlers::games::history,
        handlers::leaderboard::leaderboard,
        handlers::leaderboard::my_rank,
        handlers::admin::reload_whitelist,
        handlers::admin::content_queue,
        handlers::system::health_handler,
    ),
    components(schemas(
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
        crate::domain::GameConfig,
        crate::domain::Illustration,
        crate::domain::PeriodType,
        crate::service::SessionView,
        crate::persistence::ContentRetry,
        dto::GameListResponse,
        dto::TodayResponse,
        dto::GameStateResponse,
        dto::MoveRequest,
        dto::MoveResponse,
        dto::HistoryResponse,
        dto::LeaderboardEntryDto,
        dto::LeaderboardResponse,
        dto::UserRankResponse,
        dto::WhitelistReloadResponse,
        dto::ContentQueueResponse,
        handlers::system::HealthResponse,
    )),
    tags(
        (name = "Games", description = "Sessions and moves"),
        (name = "Leaderboard", description = "Group-scoped rankings"),
        (name = "Admin", description = "Operator endpoints"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    with_docs(
        Router::new()
            .nest("/api/v1", handlers::routes())
            .merge(handlers::system::routes()),
    )
}

#[cfg(feature = "swagger-ui")]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    router
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/games",
            "/api/v1/games/today",
            "/api/v1/games/{game_id}/state",
            "/api/v1/games/{game_id}/move",
            "/api/v1/games/{game_id}/history",
            "/api/v1/leaderboard/{game_id}/{period}",
            "/api/v1/leaderboard/{game_id}/{period}/me",
            "/api/v1/admin/whitelist/reload",
            "/api/v1/admin/content-queue",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
