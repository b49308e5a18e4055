//! Admin handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{ContentQueueResponse, WhitelistReloadResponse};
use crate::api::identity::Admin;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GameError};

/// `POST /admin/whitelist/reload` — Re-read the whitelist file.
///
/// # Errors
///
/// Returns [`GameError::Forbidden`] for non-admins, or an error if the file
/// cannot be read.
#[utoipa::path(
    post,
    path = "/api/v1/admin/whitelist/reload",
    tag = "Admin",
    summary = "Reload whitelist",
    description = "Re-reads the whitelist file. Takes effect on the next request.",
    responses(
        (status = 200, description = "Whitelist reloaded", body = WhitelistReloadResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
    )
)]
pub async fn reload_whitelist(
    State(state): State<AppState>,
    Admin(admin): Admin,
) -> Result<impl IntoResponse, GameError> {
    let entries = state.whitelist.reload()?;
    tracing::info!(admin = %admin.id, entries, "whitelist reloaded");
    Ok(Json(WhitelistReloadResponse {
        message: "Whitelist reloaded".to_string(),
        entries,
    }))
}

/// `GET /admin/content-queue` — Pending illustration retries.
///
/// # Errors
///
/// Returns [`GameError::Forbidden`] for non-admins, or a storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/admin/content-queue",
    tag = "Admin",
    summary = "Illustration retry queue",
    description = "Lists illustration requests that failed and wait for another attempt.",
    responses(
        (status = 200, description = "Pending retries", body = ContentQueueResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
    )
)]
pub async fn content_queue(
    State(state): State<AppState>,
    _admin: Admin,
) -> Result<impl IntoResponse, GameError> {
    let queue = state.content.pending_retries().await?;
    Ok(Json(ContentQueueResponse { queue }))
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/whitelist/reload", post(reload_whitelist))
        .route("/admin/content-queue", get(content_queue))
}
