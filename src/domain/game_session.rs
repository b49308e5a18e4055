//! Per-(user, game, date) progress records.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Uniqueness key of a session. `game_date` is `None` for unlimited games.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    /// Owning user.
    pub user_id: String,
    /// Game identifier.
    pub game_id: String,
    /// Puzzle date for daily games.
    pub game_date: Option<NaiveDate>,
}

impl SessionKey {
    /// Creates a session key.
    #[must_use]
    pub fn new(user_id: &str, game_id: &str, game_date: Option<NaiveDate>) -> Self {
        Self {
            user_id: user_id.to_string(),
            game_id: game_id.to_string(),
            game_date,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.game_date {
            Some(date) => write!(f, "{}/{}/{date}", self.user_id, self.game_id),
            None => write!(f, "{}/{}/-", self.user_id, self.game_id),
        }
    }
}

/// One user's progress on one puzzle instance.
///
/// `state_data` is opaque to everything except the owning plugin and the
/// store adapter that serializes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    /// Owning user.
    pub user_id: String,
    /// Game identifier.
    pub game_id: String,
    /// Puzzle date for daily games.
    pub game_date: Option<NaiveDate>,
    /// Whether the session reached a terminal state.
    pub is_complete: bool,
    /// Whether the terminal state is a win.
    pub won: bool,
    /// Accepted moves so far.
    pub attempts: u32,
    /// Attempt cap copied from the game config at creation.
    pub max_attempts: Option<u32>,
    /// Creation instant.
    pub started_at: DateTime<Utc>,
    /// Instant the session first became terminal.
    pub completed_at: Option<DateTime<Utc>>,
    /// Game-specific payload.
    pub state_data: serde_json::Value,
}

impl GameSession {
    /// Creates a fresh, in-progress session.
    #[must_use]
    pub fn new(
        key: SessionKey,
        max_attempts: Option<u32>,
        started_at: DateTime<Utc>,
        state_data: serde_json::Value,
    ) -> Self {
        Self {
            user_id: key.user_id,
            game_id: key.game_id,
            game_date: key.game_date,
            is_complete: false,
            won: false,
            attempts: 0,
            max_attempts,
            started_at,
            completed_at: None,
            state_data,
        }
    }

    /// Returns this session's uniqueness key.
    #[must_use]
    pub fn key(&self) -> SessionKey {
        SessionKey::new(&self.user_id, &self.game_id, self.game_date)
    }

    /// Seconds between start and completion; `None` while in progress.
    #[must_use]
    pub fn elapsed_seconds(&self) -> Option<i64> {
        self.completed_at
            .map(|done| done.signed_duration_since(self.started_at).num_seconds().max(0))
    }

    /// Moves left before the cap; `None` for uncapped games.
    #[must_use]
    pub fn attempts_remaining(&self) -> Option<u32> {
        self.max_attempts
            .map(|max| max.saturating_sub(self.attempts))
    }

    /// Returns `true` once the attempt cap has been reached.
    #[must_use]
    pub fn has_exhausted_attempts(&self) -> bool {
        self.max_attempts.is_some_and(|max| self.attempts >= max)
    }
}
