//! Static game descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Broad category a game is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameCategory {
    /// Word games.
    Word,
    /// Arithmetic and number games.
    Math,
    /// Maps and places.
    Geography,
    /// Logic puzzles.
    Logic,
    /// Question and answer games.
    Trivia,
    /// Anything else.
    Other,
}

impl GameCategory {
    /// Returns the wire name of this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Math => "math",
            Self::Geography => "geography",
            Self::Logic => "logic",
            Self::Trivia => "trivia",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for GameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How puzzle instances are scoped in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// One shared puzzle per calendar date.
    Daily,
    /// No date scoping; the session key carries a null date.
    Unlimited,
}

/// Immutable descriptor a plugin registers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GameConfig {
    /// Unique game identifier, e.g. `ferdle-en-5`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Listing category.
    pub category: GameCategory,
    /// Daily or unlimited play.
    pub play_mode: PlayMode,
    /// Attempt cap; `None` means unlimited.
    pub max_attempts: Option<u32>,
    /// Whether completed sessions feed the leaderboard.
    pub supports_leaderboard: bool,
    /// Whether won sessions are illustrated.
    pub produces_content: bool,
    /// Game-specific descriptive data.
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}

impl GameConfig {
    /// Returns `true` when sessions are keyed by calendar date.
    #[must_use]
    pub fn is_daily(&self) -> bool {
        self.play_mode == PlayMode::Daily
    }
}
