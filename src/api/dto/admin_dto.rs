//! Admin DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::persistence::ContentRetry;

/// Response body for `POST /admin/whitelist/reload`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WhitelistReloadResponse {
    /// Confirmation text.
    pub message: String,
    /// Entries loaded.
    pub entries: usize,
}

/// Response body for `GET /admin/content-queue`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContentQueueResponse {
    /// Pending illustration retries, oldest first.
    pub queue: Vec<ContentRetry>,
}
