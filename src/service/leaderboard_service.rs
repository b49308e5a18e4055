//! Leaderboard service: turns completed sessions into group-scoped rankings.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::leaderboard::{rank_of, rank_rows};
use crate::domain::{
    Clock, CompletedGame, CompletionStats, GameCalendar, GameRegistry, GameSession, PeriodBucket,
    PeriodType, RankedStat,
};
use crate::error::GameError;
use crate::persistence::StatsStore;

/// Largest page a leaderboard query may return.
pub const MAX_LEADERBOARD_LIMIT: u32 = 100;

/// One ranked page of a period bucket.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardPage {
    /// Game identifier.
    pub game_id: String,
    /// The bucket that was ranked.
    pub bucket: PeriodBucket,
    /// Best first.
    pub entries: Vec<RankedStat>,
}

/// Aggregation on completion and ranking on query.
#[derive(Debug, Clone)]
pub struct LeaderboardService {
    registry: Arc<GameRegistry>,
    stats: Arc<dyn StatsStore>,
    calendar: GameCalendar,
    clock: Arc<dyn Clock>,
    default_limit: u32,
}

impl LeaderboardService {
    /// Creates a new `LeaderboardService`.
    #[must_use]
    pub fn new(
        registry: Arc<GameRegistry>,
        stats: Arc<dyn StatsStore>,
        calendar: GameCalendar,
        clock: Arc<dyn Clock>,
        default_limit: u32,
    ) -> Self {
        Self {
            registry,
            stats,
            calendar,
            clock,
            default_limit: default_limit.clamp(1, MAX_LEADERBOARD_LIMIT),
        }
    }

    /// What a completed session adds to the leaderboard: its daily,
    /// weekly, monthly and all-time buckets and the game's facts.
    ///
    /// Buckets come from the completion instant in the canonical zone, not
    /// from the puzzle date. The stats are written by the session store
    /// together with the move that ended the session.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRequest`] for a session that is not
    /// complete.
    pub fn completion_stats(&self, session: &GameSession) -> Result<CompletionStats, GameError> {
        let (true, Some(completed_at)) = (session.is_complete, session.completed_at) else {
            return Err(GameError::InvalidRequest(format!(
                "session {} is not complete",
                session.key()
            )));
        };
        Ok(CompletionStats {
            buckets: PeriodBucket::all_for(self.calendar.local_date(completed_at)),
            game: CompletedGame {
                won: session.won,
                attempts: session.attempts,
                time_seconds: session.elapsed_seconds().unwrap_or(0),
            },
            recorded_at: self.clock.now(),
        })
    }

    /// Ranks `group`'s rows for the current bucket of `period`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameNotFound`] for an unknown game, or the
    /// store's error.
    pub async fn leaderboard(
        &self,
        game_id: &str,
        period: PeriodType,
        group: &str,
        limit: Option<u32>,
    ) -> Result<LeaderboardPage, GameError> {
        self.registry.resolve(game_id)?;
        let bucket = self.current_bucket(period);
        let rows = self.stats.group_stats(game_id, &bucket, group).await?;

        let limit = limit
            .unwrap_or(self.default_limit)
            .clamp(1, MAX_LEADERBOARD_LIMIT) as usize;
        let mut entries = rank_rows(rows);
        entries.truncate(limit);

        Ok(LeaderboardPage {
            game_id: game_id.to_string(),
            bucket,
            entries,
        })
    }

    /// The caller's own row and rank in the current bucket; `None` if they
    /// have not completed a game in it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameNotFound`] for an unknown game, or the
    /// store's error.
    pub async fn user_rank(
        &self,
        user_id: &str,
        game_id: &str,
        period: PeriodType,
        group: &str,
    ) -> Result<Option<RankedStat>, GameError> {
        self.registry.resolve(game_id)?;
        let bucket = self.current_bucket(period);
        let rows = self.stats.group_stats(game_id, &bucket, group).await?;

        let Some(own) = rows.iter().find(|r| r.stat.user_id == user_id).cloned() else {
            return Ok(None);
        };
        let rank = rank_of(&own.stat.ranking_key(), &rows);
        Ok(Some(RankedStat { rank, row: own }))
    }

    fn current_bucket(&self, period: PeriodType) -> PeriodBucket {
        PeriodBucket::for_date(period, self.calendar.today(self.clock.now()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{FixedClock, SessionKey};
    use crate::persistence::memory::InMemoryStore;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    fn service() -> LeaderboardService {
        let chrono::LocalResult::Single(now) = Utc.with_ymd_and_hms(2025, 11, 28, 12, 0, 0) else {
            panic!("valid instant");
        };
        LeaderboardService::new(
            Arc::new(GameRegistry::new()),
            Arc::new(InMemoryStore::new()),
            GameCalendar::default(),
            Arc::new(FixedClock(now)),
            10,
        )
    }

    fn session() -> GameSession {
        let chrono::LocalResult::Single(started) = Utc.with_ymd_and_hms(2025, 11, 28, 3, 0, 0)
        else {
            panic!("valid instant");
        };
        let key = SessionKey::new("u1", "ferdle-en-5", NaiveDate::from_ymd_opt(2025, 11, 27));
        GameSession::new(key, Some(6), started, json!({}))
    }

    #[test]
    fn open_session_has_no_completion_stats() {
        let result = service().completion_stats(&session());
        assert!(matches!(result, Err(GameError::InvalidRequest(_))));
    }

    #[test]
    fn buckets_follow_the_local_completion_date() {
        let mut s = session();
        s.is_complete = true;
        s.won = true;
        s.attempts = 3;
        // 04:30 UTC on the 28th is still the 27th in New York.
        s.completed_at = Some(s.started_at + chrono::Duration::minutes(90));

        let Ok(stats) = service().completion_stats(&s) else {
            panic!("complete session yields stats");
        };
        let [daily, ..] = &stats.buckets;
        assert_eq!(daily.period_key, "2025-11-27");
        assert_eq!(stats.game, CompletedGame { won: true, attempts: 3, time_seconds: 5400 });
        assert_eq!(stats.recorded_at.date_naive().to_string(), "2025-11-28");
    }
}
