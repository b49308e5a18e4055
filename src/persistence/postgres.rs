//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use sqlx::postgres::PgPoolOptions;

use super::models::{
    ContentRetry, RankedStatRecord, SessionRow, StatRecord, User, UserRow, to_column,
};
use super::{ContentStore, SessionStore, StatsStore, UserStore};
use crate::domain::{
    CompletionStats, ContentKey, ContentRequest, GameSession, LeaderboardStat, PeriodBucket,
    SessionKey, StatRow,
};
use crate::error::GameError;

const SESSION_COLUMNS: &str = "user_id, game_id, game_date, is_complete, won, attempts, \
     max_attempts, started_at, completed_at, state_json";

const STAT_COLUMNS: &str = "s.user_id, s.game_id, s.period_type, s.period_key, s.games_played, \
     s.games_won, s.total_attempts, s.total_time_seconds, s.current_streak, s.best_streak, \
     s.updated_at";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wraps an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PersistenceError`] if no connection can be made.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        min_connections: u32,
        connect_timeout: Duration,
    ) -> Result<Self, GameError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(connect_timeout)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PersistenceError`] if a migration fails.
    pub async fn run_migrations(&self) -> Result<(), GameError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Compare-and-set write of a session: lands only while the stored row
/// still has `expected_attempts` and is not complete.
async fn update_session(
    conn: &mut PgConnection,
    session: &GameSession,
    expected_attempts: u32,
) -> Result<bool, GameError> {
    let result = sqlx::query(
        "UPDATE game_sessions SET is_complete = $5, won = $6, attempts = $7, \
         completed_at = $8, time_seconds = $9, state_json = $10 \
         WHERE user_id = $1 AND game_id = $2 AND game_date IS NOT DISTINCT FROM $3 \
         AND attempts = $4 AND NOT is_complete",
    )
    .bind(&session.user_id)
    .bind(&session.game_id)
    .bind(session.game_date)
    .bind(to_column(expected_attempts))
    .bind(session.is_complete)
    .bind(session.won)
    .bind(to_column(session.attempts))
    .bind(session.completed_at)
    .bind(session.elapsed_seconds())
    .bind(&session.state_data)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Folds one finished game into a single stats row, creating it if absent.
/// The row is locked with `FOR UPDATE` for the rest of the transaction.
async fn fold_bucket(
    conn: &mut PgConnection,
    user_id: &str,
    game_id: &str,
    bucket: &PeriodBucket,
    stats: &CompletionStats,
) -> Result<(), GameError> {
    let now = stats.recorded_at;
    sqlx::query(
        "INSERT INTO leaderboard_stats (user_id, game_id, period_type, period_key, updated_at) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT ON CONSTRAINT leaderboard_stats_key DO NOTHING",
    )
    .bind(user_id)
    .bind(game_id)
    .bind(bucket.period_type.as_str())
    .bind(&bucket.period_key)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let current = sqlx::query_as::<_, StatRecord>(&format!(
        "SELECT {STAT_COLUMNS} FROM leaderboard_stats s \
         WHERE s.user_id = $1 AND s.game_id = $2 AND s.period_type = $3 \
         AND s.period_key = $4 FOR UPDATE"
    ))
    .bind(user_id)
    .bind(game_id)
    .bind(bucket.period_type.as_str())
    .bind(&bucket.period_key)
    .fetch_one(&mut *conn)
    .await?;

    let mut stat = LeaderboardStat::try_from(current)?;
    stat.record(&stats.game, now);

    sqlx::query(
        "UPDATE leaderboard_stats SET games_played = $5, games_won = $6, \
         total_attempts = $7, total_time_seconds = $8, current_streak = $9, \
         best_streak = $10, average_attempts = $11, success_rate = $12, updated_at = $13 \
         WHERE user_id = $1 AND game_id = $2 AND period_type = $3 AND period_key = $4",
    )
    .bind(user_id)
    .bind(game_id)
    .bind(bucket.period_type.as_str())
    .bind(&bucket.period_key)
    .bind(to_column(stat.games_played))
    .bind(to_column(stat.games_won))
    .bind(i64::try_from(stat.total_attempts).unwrap_or(i64::MAX))
    .bind(stat.total_time_seconds)
    .bind(to_column(stat.current_streak))
    .bind(to_column(stat.best_streak))
    .bind(stat.average_attempts())
    .bind(stat.success_rate())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[async_trait]
impl SessionStore for PostgresStore {
    async fn load_session(&self, key: &SessionKey) -> Result<Option<GameSession>, GameError> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM game_sessions \
             WHERE user_id = $1 AND game_id = $2 AND game_date IS NOT DISTINCT FROM $3"
        ))
        .bind(&key.user_id)
        .bind(&key.game_id)
        .bind(key.game_date)
        .fetch_optional(&self.pool)
        .await?;

        row.map(GameSession::try_from).transpose()
    }

    async fn create_session(&self, session: &GameSession) -> Result<GameSession, GameError> {
        let inserted = sqlx::query_as::<_, SessionRow>(&format!(
            "INSERT INTO game_sessions ({SESSION_COLUMNS}, time_seconds) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT ON CONSTRAINT game_sessions_key DO NOTHING \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(&session.user_id)
        .bind(&session.game_id)
        .bind(session.game_date)
        .bind(session.is_complete)
        .bind(session.won)
        .bind(to_column(session.attempts))
        .bind(session.max_attempts.map(to_column))
        .bind(session.started_at)
        .bind(session.completed_at)
        .bind(&session.state_data)
        .bind(session.elapsed_seconds())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return GameSession::try_from(row);
        }

        let key = session.key();
        tracing::debug!(session = %key, "session created concurrently; reloading");
        self.load_session(&key)
            .await?
            .ok_or_else(|| GameError::PersistenceError(format!("session {key} vanished")))
    }

    async fn commit_move(
        &self,
        session: &GameSession,
        expected_attempts: u32,
    ) -> Result<bool, GameError> {
        let mut conn = self.pool.acquire().await?;
        update_session(&mut *conn, session, expected_attempts).await
    }

    async fn commit_completion(
        &self,
        session: &GameSession,
        expected_attempts: u32,
        stats: &CompletionStats,
    ) -> Result<bool, GameError> {
        let mut tx = self.pool.begin().await?;
        if !update_session(&mut *tx, session, expected_attempts).await? {
            // Dropping the transaction rolls it back.
            return Ok(false);
        }
        for bucket in &stats.buckets {
            fold_bucket(&mut *tx, &session.user_id, &session.game_id, bucket, stats).await?;
        }
        tx.commit().await?;
        Ok(true)
    }

    async fn list_sessions(
        &self,
        user_id: &str,
        game_id: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<GameSession>, GameError> {
        let rows = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM game_sessions \
             WHERE user_id = $1 AND ($2::TEXT IS NULL OR game_id = $2) \
             ORDER BY started_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(user_id)
        .bind(game_id)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(GameSession::try_from).collect()
    }
}

#[async_trait]
impl StatsStore for PostgresStore {
    async fn group_stats(
        &self,
        game_id: &str,
        bucket: &PeriodBucket,
        group: &str,
    ) -> Result<Vec<StatRow>, GameError> {
        let rows = sqlx::query_as::<_, RankedStatRecord>(&format!(
            "SELECT {STAT_COLUMNS}, u.name, u.avatar_url \
             FROM leaderboard_stats s JOIN users u ON u.id = s.user_id \
             WHERE s.game_id = $1 AND s.period_type = $2 AND s.period_key = $3 \
             AND u.group_name = $4"
        ))
        .bind(game_id)
        .bind(bucket.period_type.as_str())
        .bind(&bucket.period_key)
        .bind(group)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StatRow::try_from).collect()
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn upsert_user(&self, user: &User) -> Result<(), GameError> {
        sqlx::query(
            "INSERT INTO users (id, email, name, avatar_url, group_name, created_at, last_login) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email, name = EXCLUDED.name, \
             avatar_url = EXCLUDED.avatar_url, group_name = EXCLUDED.group_name, \
             last_login = EXCLUDED.last_login",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.avatar_url)
        .bind(&user.group_name)
        .bind(user.created_at)
        .bind(user.last_login)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, GameError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, avatar_url, group_name, created_at, last_login \
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }
}

#[async_trait]
impl ContentStore for PostgresStore {
    async fn cached_content(&self, key: &ContentKey) -> Result<Option<String>, GameError> {
        let url = sqlx::query_scalar::<_, String>(
            "SELECT url FROM content_cache WHERE word = $1 AND language = $2",
        )
        .bind(&key.word)
        .bind(&key.language)
        .fetch_optional(&self.pool)
        .await?;
        Ok(url)
    }

    async fn store_content(
        &self,
        key: &ContentKey,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        sqlx::query(
            "INSERT INTO content_cache (word, language, url, created_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT ON CONSTRAINT content_cache_key DO NOTHING",
        )
        .bind(&key.word)
        .bind(&key.language)
        .bind(url)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn enqueue_retry(
        &self,
        request: &ContentRequest,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        let key = request.key();
        sqlx::query(
            "INSERT INTO content_retry_queue \
             (word, language, description, last_error, status, failures, created_at) \
             VALUES ($1, $2, $3, $4, 'pending', 1, $5) \
             ON CONFLICT (word, language) WHERE status = 'pending' DO UPDATE SET \
             description = EXCLUDED.description, last_error = EXCLUDED.last_error, \
             failures = content_retry_queue.failures + 1",
        )
        .bind(&key.word)
        .bind(&key.language)
        .bind(&request.description)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn pending_retries(&self) -> Result<Vec<ContentRetry>, GameError> {
        let rows = sqlx::query_as::<_, ContentRetry>(
            "SELECT id, word, language, description, last_error, status, failures, created_at \
             FROM content_retry_queue WHERE status = 'pending' ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
