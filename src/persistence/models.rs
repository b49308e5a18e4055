//! Stored records and their database row shapes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{GameSession, LeaderboardStat, PeriodType, StatRow};
use crate::error::GameError;

/// A signed-in player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Stable identifier from the identity provider.
    pub id: String,
    /// Lower-cased email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Profile picture.
    pub avatar_url: Option<String>,
    /// Whitelist group at the last sign-in.
    pub group_name: String,
    /// First sign-in.
    pub created_at: DateTime<Utc>,
    /// Most recent request.
    pub last_login: DateTime<Utc>,
}

/// An illustration request waiting for another attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ContentRetry {
    /// Queue row id.
    pub id: i64,
    /// Word to illustrate.
    pub word: String,
    /// Language tag.
    pub language: String,
    /// Prompt description.
    pub description: String,
    /// Failure that caused the enqueue.
    pub last_error: String,
    /// `pending` until a worker picks it up.
    pub status: String,
    /// Failed attempts folded into this row.
    pub failures: i32,
    /// First enqueue time.
    pub created_at: DateTime<Utc>,
}

/// `users` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub group_name: String,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            avatar_url: row.avatar_url,
            group_name: row.group_name,
            created_at: row.created_at,
            last_login: row.last_login,
        }
    }
}

/// `game_sessions` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SessionRow {
    pub user_id: String,
    pub game_id: String,
    pub game_date: Option<NaiveDate>,
    pub is_complete: bool,
    pub won: bool,
    pub attempts: i32,
    pub max_attempts: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub state_json: serde_json::Value,
}

impl TryFrom<SessionRow> for GameSession {
    type Error = GameError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            attempts: to_count(row.attempts, "attempts")?,
            max_attempts: row
                .max_attempts
                .map(|m| to_count(m, "max_attempts"))
                .transpose()?,
            user_id: row.user_id,
            game_id: row.game_id,
            game_date: row.game_date,
            is_complete: row.is_complete,
            won: row.won,
            started_at: row.started_at,
            completed_at: row.completed_at,
            state_data: row.state_json,
        })
    }
}

/// `leaderboard_stats` row, optionally joined with the owner's profile.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct StatRecord {
    pub user_id: String,
    pub game_id: String,
    pub period_type: String,
    pub period_key: String,
    pub games_played: i32,
    pub games_won: i32,
    pub total_attempts: i64,
    pub total_time_seconds: i64,
    pub current_streak: i32,
    pub best_streak: i32,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<StatRecord> for LeaderboardStat {
    type Error = GameError;

    fn try_from(row: StatRecord) -> Result<Self, Self::Error> {
        let period_type: PeriodType = row
            .period_type
            .parse()
            .map_err(|_| GameError::CorruptState(format!("period type {}", row.period_type)))?;
        Ok(Self {
            games_played: to_count(row.games_played, "games_played")?,
            games_won: to_count(row.games_won, "games_won")?,
            total_attempts: u64::try_from(row.total_attempts)
                .map_err(|_| GameError::CorruptState("negative total_attempts".to_string()))?,
            current_streak: to_count(row.current_streak, "current_streak")?,
            best_streak: to_count(row.best_streak, "best_streak")?,
            user_id: row.user_id,
            game_id: row.game_id,
            period_type,
            period_key: row.period_key,
            total_time_seconds: row.total_time_seconds,
            updated_at: row.updated_at,
        })
    }
}

/// Leaderboard row joined with `users`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct RankedStatRecord {
    #[sqlx(flatten)]
    pub stat: StatRecord,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl TryFrom<RankedStatRecord> for StatRow {
    type Error = GameError;

    fn try_from(row: RankedStatRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            stat: row.stat.try_into()?,
            name: row.name,
            avatar_url: row.avatar_url,
        })
    }
}

fn to_count(value: i32, column: &str) -> Result<u32, GameError> {
    u32::try_from(value).map_err(|_| GameError::CorruptState(format!("negative {column}")))
}

/// Converts a counter to the signed column type.
pub(crate) fn to_column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
