//! Per-period player statistics and the ranking order over them.
//!
//! Only integer counters are authoritative. Success rate and the wins-only
//! attempt average are recomputed from them on demand, and every ranking
//! decision compares those ratios after rounding to
//! [`RANKING_DECIMALS`] decimal digits, so that 2/3 and 4/6 are the same
//! number everywhere.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PeriodBucket, PeriodType};

/// Decimal digits kept when comparing derived ratios.
pub const RANKING_DECIMALS: u32 = 6;

const RANKING_SCALE: f64 = 1_000_000.0;

/// Rounds `value` to [`RANKING_DECIMALS`] digits, as a scaled integer.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn rounded_ratio(value: f64) -> i64 {
    (value * RANKING_SCALE).round() as i64
}

/// `value` rounded to [`RANKING_DECIMALS`] digits, for display.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn display_ratio(value: f64) -> f64 {
    rounded_ratio(value) as f64 / RANKING_SCALE
}

/// Facts about one finished session that feed the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedGame {
    /// Whether the session was won.
    pub won: bool,
    /// Moves it took.
    pub attempts: u32,
    /// Seconds from start to completion.
    pub time_seconds: i64,
}

/// What one finished session adds to the leaderboard: its facts and the
/// four buckets they are folded into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionStats {
    /// Daily, weekly, monthly and all-time bucket of the completion.
    pub buckets: [PeriodBucket; 4],
    /// The finished session.
    pub game: CompletedGame,
    /// Stamped as `updated_at` on every touched row.
    pub recorded_at: DateTime<Utc>,
}

/// Cumulative statistics of one user, game and period bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardStat {
    /// Player.
    pub user_id: String,
    /// Game identifier.
    pub game_id: String,
    /// Aggregation window.
    pub period_type: PeriodType,
    /// Bucket key within the window.
    pub period_key: String,
    /// Completed sessions.
    pub games_played: u32,
    /// Won sessions.
    pub games_won: u32,
    /// Attempts summed over won sessions only.
    pub total_attempts: u64,
    /// Elapsed seconds summed over all completed sessions.
    pub total_time_seconds: i64,
    /// Consecutive wins ending with the latest session.
    pub current_streak: u32,
    /// Longest run of consecutive wins.
    pub best_streak: u32,
    /// Last modification instant.
    pub updated_at: DateTime<Utc>,
}

impl LeaderboardStat {
    /// Creates an all-zero row for `bucket`.
    #[must_use]
    pub fn empty(user_id: &str, game_id: &str, bucket: &PeriodBucket, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            game_id: game_id.to_string(),
            period_type: bucket.period_type,
            period_key: bucket.period_key.clone(),
            games_played: 0,
            games_won: 0,
            total_attempts: 0,
            total_time_seconds: 0,
            current_streak: 0,
            best_streak: 0,
            updated_at: now,
        }
    }

    /// Folds one completed session into the counters.
    pub fn record(&mut self, game: &CompletedGame, now: DateTime<Utc>) {
        self.games_played = self.games_played.saturating_add(1);
        if game.won {
            self.games_won = self.games_won.saturating_add(1);
            self.total_attempts = self.total_attempts.saturating_add(u64::from(game.attempts));
            self.current_streak = self.current_streak.saturating_add(1);
            self.best_streak = self.best_streak.max(self.current_streak);
        } else {
            self.current_streak = 0;
        }
        self.total_time_seconds = self.total_time_seconds.saturating_add(game.time_seconds.max(0));
        self.updated_at = now;
    }

    /// Wins divided by games played; zero before the first game.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        f64::from(self.games_won) / f64::from(self.games_played)
    }

    /// Mean attempts over won sessions; `None` without a win.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_attempts(&self) -> Option<f64> {
        if self.games_won == 0 {
            return None;
        }
        Some(self.total_attempts as f64 / f64::from(self.games_won))
    }

    /// Returns the rounded values the ranking order is defined on.
    #[must_use]
    pub fn ranking_key(&self) -> RankingKey {
        RankingKey {
            success_rate: rounded_ratio(self.success_rate()),
            current_streak: self.current_streak,
            average_attempts: self.average_attempts().map(rounded_ratio),
            games_won: self.games_won,
        }
    }
}

/// Rounded projection of a stat row used for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RankingKey {
    /// Success rate scaled by 10^6.
    pub success_rate: i64,
    /// Current win streak.
    pub current_streak: u32,
    /// Wins-only attempt average scaled by 10^6.
    pub average_attempts: Option<i64>,
    /// Won sessions.
    pub games_won: u32,
}

impl Ord for RankingKey {
    /// `Less` means "ranks higher".
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .success_rate
            .cmp(&self.success_rate)
            .then_with(|| other.current_streak.cmp(&self.current_streak))
            .then_with(|| match (self.average_attempts, other.average_attempts) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| other.games_won.cmp(&self.games_won))
    }
}

impl PartialOrd for RankingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A stat row joined with the player's display data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    /// The statistics.
    pub stat: LeaderboardStat,
    /// Player display name.
    pub name: String,
    /// Player avatar.
    pub avatar_url: Option<String>,
}

/// A stat row with its 1-based position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStat {
    /// 1 + number of rows that strictly precede this one.
    pub rank: u32,
    /// The ranked row.
    pub row: StatRow,
}

/// Number of rows in `rows` that rank strictly above `key`, plus one.
#[must_use]
pub fn rank_of(key: &RankingKey, rows: &[StatRow]) -> u32 {
    let ahead = rows
        .iter()
        .filter(|r| r.stat.ranking_key() < *key)
        .count();
    u32::try_from(ahead).unwrap_or(u32::MAX).saturating_add(1)
}

/// Orders rows best first and assigns ranks.
///
/// Rows with identical ranking keys share a rank and are listed by user id.
#[must_use]
pub fn rank_rows(mut rows: Vec<StatRow>) -> Vec<RankedStat> {
    rows.sort_by(|a, b| {
        a.stat
            .ranking_key()
            .cmp(&b.stat.ranking_key())
            .then_with(|| a.stat.user_id.cmp(&b.stat.user_id))
    });

    let mut ranked: Vec<RankedStat> = Vec::with_capacity(rows.len());
    let mut previous: Option<(RankingKey, u32)> = None;
    for (index, row) in rows.into_iter().enumerate() {
        let key = row.stat.ranking_key();
        let position = u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1);
        let rank = match previous {
            Some((prev_key, prev_rank)) if prev_key == key => prev_rank,
            _ => position,
        };
        previous = Some((key, rank));
        ranked.push(RankedStat { rank, row });
    }
    ranked
}
