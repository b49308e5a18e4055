//! Leaderboard DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::leaderboard::display_ratio;
use crate::domain::{PeriodType, RankedStat};
use crate::service::LeaderboardPage;

/// Query parameters for `GET /leaderboard/{game_id}/{period}`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardParams {
    /// Rows to return (1-100); server default when absent.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// One ranked player.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LeaderboardEntryDto {
    /// 1-based position; equal keys share a rank.
    pub rank: u32,
    /// Player id.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Profile picture.
    pub avatar_url: Option<String>,
    /// Completed games.
    pub games_played: u32,
    /// Won games.
    pub games_won: u32,
    /// Wins over games played, rounded to 6 decimals.
    pub success_rate: f64,
    /// Mean attempts over wins, rounded to 6 decimals.
    pub average_attempts: Option<f64>,
    /// Consecutive wins up to now.
    pub current_streak: u32,
    /// Longest run of wins.
    pub best_streak: u32,
    /// Seconds spent over all completed games.
    pub total_time_seconds: i64,
}

impl From<RankedStat> for LeaderboardEntryDto {
    fn from(entry: RankedStat) -> Self {
        let stat = entry.row.stat;
        Self {
            rank: entry.rank,
            success_rate: display_ratio(stat.success_rate()),
            average_attempts: stat.average_attempts().map(display_ratio),
            user_id: stat.user_id,
            name: entry.row.name,
            avatar_url: entry.row.avatar_url,
            games_played: stat.games_played,
            games_won: stat.games_won,
            current_streak: stat.current_streak,
            best_streak: stat.best_streak,
            total_time_seconds: stat.total_time_seconds,
        }
    }
}

/// Response body for `GET /leaderboard/{game_id}/{period}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Game identifier.
    pub game_id: String,
    /// Aggregation window.
    pub period_type: PeriodType,
    /// Bucket key that was ranked.
    pub period_key: String,
    /// Best first.
    pub entries: Vec<LeaderboardEntryDto>,
}

impl From<LeaderboardPage> for LeaderboardResponse {
    fn from(page: LeaderboardPage) -> Self {
        Self {
            game_id: page.game_id,
            period_type: page.bucket.period_type,
            period_key: page.bucket.period_key,
            entries: page.entries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response body for `GET /leaderboard/{game_id}/{period}/me`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserRankResponse {
    /// The caller's row; `null` before their first completed game in the
    /// bucket.
    pub entry: Option<LeaderboardEntryDto>,
}
