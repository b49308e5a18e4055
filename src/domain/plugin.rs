//! The contract every game implements.
//!
//! A plugin describes itself with a [`GameConfig`], creates fresh sessions,
//! judges and applies moves, and optionally names what to illustrate once a
//! session is won. Plugins are plain synchronous values; anything that talks
//! to the outside world lives in the services.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use super::{ContentRequest, GameConfig, GameSession};
use crate::error::GameError;

/// Verdict on a candidate move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveValidation {
    /// The move may be applied.
    Valid,
    /// The move is refused; the reason is shown to the player verbatim.
    Rejected(String),
}

impl MoveValidation {
    /// Convenience constructor for a rejection.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    /// Returns `true` for [`MoveValidation::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Capability set of a registered game.
pub trait GamePlugin: Send + Sync + fmt::Debug {
    /// Static descriptor; identical for the lifetime of the plugin.
    fn config(&self) -> &GameConfig;

    /// Builds a fresh session for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DateRequired`] when a daily game gets no date.
    fn initialize(
        &self,
        user_id: &str,
        game_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<GameSession, GameError>;

    /// Judges `mv` against the session without mutating it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CorruptState`] when the stored payload cannot be
    /// read; ordinary bad moves are a [`MoveValidation::Rejected`] value.
    fn validate_move(&self, session: &GameSession, mv: &Value)
    -> Result<MoveValidation, GameError>;

    /// Applies a move that passed validation, updating attempts, terminal
    /// flags and the payload in place.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CorruptState`] or [`GameError::InvalidRequest`]
    /// if the payload or move is unreadable.
    fn apply_move(&self, session: &mut GameSession, mv: &Value) -> Result<(), GameError>;

    /// Names what to illustrate for a won session; `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CorruptState`] when the payload cannot be read.
    fn win_content(&self, _session: &GameSession) -> Result<Option<ContentRequest>, GameError> {
        Ok(None)
    }

    /// Payload as shown to the player, with secrets removed while the
    /// session is still in progress.
    fn client_state(&self, session: &GameSession) -> Value {
        session.state_data.clone()
    }
}
