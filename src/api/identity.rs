//! Caller identity, taken from headers set by the authenticating proxy.
//!
//! Every request resolves the caller's group through the whitelist, so a
//! reload takes effect on the next request without a restart.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::error::GameError;
use crate::persistence::User;

/// Header carrying the stable user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the verified email.
pub const USER_EMAIL_HEADER: &str = "x-user-email";
/// Optional display name.
pub const USER_NAME_HEADER: &str = "x-user-name";
/// Optional profile picture.
pub const USER_AVATAR_HEADER: &str = "x-user-avatar";

/// An authenticated, whitelisted player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Stable user id.
    pub id: String,
    /// Lower-cased email.
    pub email: String,
    /// Whitelist group; scopes every leaderboard query.
    pub group: String,
    /// Whether the email is in `ADMIN_EMAILS`.
    pub is_admin: bool,
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl FromRequestParts<AppState> for Player {
    type Rejection = GameError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let (Some(id), Some(email)) = (
            header(&parts.headers, USER_ID_HEADER),
            header(&parts.headers, USER_EMAIL_HEADER),
        ) else {
            return Err(GameError::MissingIdentity);
        };
        let email = email.to_lowercase();

        let Some(group) = state.whitelist.group_for(&email) else {
            tracing::warn!(user_id = %id, "sign-in refused: not whitelisted");
            return Err(GameError::NotWhitelisted);
        };

        let now = state.clock.now();
        let name = header(&parts.headers, USER_NAME_HEADER)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        state
            .users
            .upsert_user(&User {
                id: id.clone(),
                email: email.clone(),
                name,
                avatar_url: header(&parts.headers, USER_AVATAR_HEADER),
                group_name: group.clone(),
                created_at: now,
                last_login: now,
            })
            .await?;

        Ok(Self {
            is_admin: state.is_admin(&email),
            id,
            email,
            group,
        })
    }
}

/// A [`Player`] whose email is listed as an admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admin(pub Player);

impl FromRequestParts<AppState> for Admin {
    type Rejection = GameError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let player = Player::from_request_parts(parts, state).await?;
        if !player.is_admin {
            return Err(GameError::Forbidden);
        }
        Ok(Self(player))
    }
}
