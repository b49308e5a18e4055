//! In-process store for tests and database-less runs.
//!
//! All tables sit behind one `tokio::sync::RwLock`, so every trait method is
//! a single critical section and the multi-bucket leaderboard update is
//! atomic in the same sense as the PostgreSQL transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::models::{ContentRetry, User};
use super::{ContentStore, SessionStore, StatsStore, UserStore};
use crate::domain::{
    CompletionStats, ContentKey, ContentRequest, GameSession, LeaderboardStat, PeriodBucket,
    SessionKey, StatRow,
};
use crate::error::GameError;

type StatKey = (String, String, PeriodBucket);

#[derive(Debug, Default)]
struct Tables {
    sessions: HashMap<SessionKey, GameSession>,
    stats: HashMap<StatKey, LeaderboardStat>,
    users: HashMap<String, User>,
    content: HashMap<ContentKey, String>,
    retries: Vec<ContentRetry>,
}

impl Tables {
    fn can_commit(&self, session: &GameSession, expected_attempts: u32) -> bool {
        self.sessions
            .get(&session.key())
            .is_some_and(|stored| stored.attempts == expected_attempts && !stored.is_complete)
    }

    fn fold_completion(&mut self, user_id: &str, game_id: &str, stats: &CompletionStats) {
        for bucket in &stats.buckets {
            let key = (user_id.to_string(), game_id.to_string(), bucket.clone());
            let now = stats.recorded_at;
            self.stats
                .entry(key)
                .or_insert_with(|| LeaderboardStat::empty(user_id, game_id, bucket, now))
                .record(&stats.game, now);
        }
    }
}

/// Volatile store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored leaderboard rows.
    pub async fn stat_row_count(&self) -> usize {
        self.tables.read().await.stats.len()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn load_session(&self, key: &SessionKey) -> Result<Option<GameSession>, GameError> {
        Ok(self.tables.read().await.sessions.get(key).cloned())
    }

    async fn create_session(&self, session: &GameSession) -> Result<GameSession, GameError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .sessions
            .entry(session.key())
            .or_insert_with(|| session.clone());
        Ok(stored.clone())
    }

    async fn commit_move(
        &self,
        session: &GameSession,
        expected_attempts: u32,
    ) -> Result<bool, GameError> {
        let mut tables = self.tables.write().await;
        if !tables.can_commit(session, expected_attempts) {
            return Ok(false);
        }
        tables.sessions.insert(session.key(), session.clone());
        Ok(true)
    }

    async fn commit_completion(
        &self,
        session: &GameSession,
        expected_attempts: u32,
        stats: &CompletionStats,
    ) -> Result<bool, GameError> {
        let mut tables = self.tables.write().await;
        if !tables.can_commit(session, expected_attempts) {
            return Ok(false);
        }
        tables.sessions.insert(session.key(), session.clone());
        tables.fold_completion(&session.user_id, &session.game_id, stats);
        Ok(true)
    }

    async fn list_sessions(
        &self,
        user_id: &str,
        game_id: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<GameSession>, GameError> {
        let tables = self.tables.read().await;
        let mut sessions: Vec<GameSession> = tables
            .sessions
            .values()
            .filter(|s| s.user_id == user_id && game_id.is_none_or(|g| s.game_id == g))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(sessions
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[async_trait]
impl StatsStore for InMemoryStore {
    async fn group_stats(
        &self,
        game_id: &str,
        bucket: &PeriodBucket,
        group: &str,
    ) -> Result<Vec<StatRow>, GameError> {
        let tables = self.tables.read().await;
        let rows = tables
            .stats
            .iter()
            .filter(|((_, g, b), _)| g == game_id && b == bucket)
            .filter_map(|((user_id, _, _), stat)| {
                let user = tables.users.get(user_id)?;
                (user.group_name == group).then(|| StatRow {
                    stat: stat.clone(),
                    name: user.name.clone(),
                    avatar_url: user.avatar_url.clone(),
                })
            })
            .collect();
        Ok(rows)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn upsert_user(&self, user: &User) -> Result<(), GameError> {
        let mut tables = self.tables.write().await;
        tables
            .users
            .entry(user.id.clone())
            .and_modify(|existing| {
                existing.email.clone_from(&user.email);
                existing.name.clone_from(&user.name);
                existing.avatar_url.clone_from(&user.avatar_url);
                existing.group_name.clone_from(&user.group_name);
                existing.last_login = user.last_login;
            })
            .or_insert_with(|| user.clone());
        Ok(())
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, GameError> {
        Ok(self.tables.read().await.users.get(user_id).cloned())
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn cached_content(&self, key: &ContentKey) -> Result<Option<String>, GameError> {
        Ok(self.tables.read().await.content.get(key).cloned())
    }

    async fn store_content(
        &self,
        key: &ContentKey,
        url: &str,
        _now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        self.tables
            .write()
            .await
            .content
            .entry(key.clone())
            .or_insert_with(|| url.to_string());
        Ok(())
    }

    async fn enqueue_retry(
        &self,
        request: &ContentRequest,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        let mut tables = self.tables.write().await;
        let key = request.key();
        if let Some(pending) = tables
            .retries
            .iter_mut()
            .find(|r| r.status == "pending" && r.word == key.word && r.language == key.language)
        {
            pending.description.clone_from(&request.description);
            pending.last_error = error.to_string();
            pending.failures = pending.failures.saturating_add(1);
            return Ok(());
        }
        let id = i64::try_from(tables.retries.len()).unwrap_or(i64::MAX).saturating_add(1);
        tables.retries.push(ContentRetry {
            id,
            word: key.word,
            language: key.language,
            description: request.description.clone(),
            last_error: error.to_string(),
            status: "pending".to_string(),
            failures: 1,
            created_at: now,
        });
        Ok(())
    }

    async fn pending_retries(&self) -> Result<Vec<ContentRetry>, GameError> {
        let tables = self.tables.read().await;
        Ok(tables
            .retries
            .iter()
            .filter(|r| r.status == "pending")
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{CompletedGame, PeriodType};
    use chrono::NaiveDate;
    use serde_json::json;

    fn day() -> NaiveDate {
        let Some(d) = NaiveDate::from_ymd_opt(2025, 11, 27) else {
            panic!("valid date");
        };
        d
    }

    fn session(user: &str) -> GameSession {
        let key = SessionKey::new(user, "ferdle-en-5", Some(day()));
        GameSession::new(key, Some(10), Utc::now(), json!({ "n": 0 }))
    }

    fn user(id: &str, group: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            name: id.to_uppercase(),
            avatar_url: None,
            group_name: group.to_string(),
            created_at: Utc::now(),
            last_login: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_keeps_first_writer() {
        let store = InMemoryStore::new();
        let first = session("u1");
        let mut second = session("u1");
        second.state_data = json!({ "n": 99 });

        let Ok(a) = store.create_session(&first).await else {
            panic!("create succeeds");
        };
        let Ok(b) = store.create_session(&second).await else {
            panic!("racing create succeeds");
        };
        assert_eq!(a, b);
        assert_eq!(b.state_data, json!({ "n": 0 }));
    }

    #[tokio::test]
    async fn commit_is_compare_and_set() {
        let store = InMemoryStore::new();
        let s = session("u1");
        let _ = store.create_session(&s).await;

        let mut next = s.clone();
        next.attempts = 1;
        assert!(matches!(store.commit_move(&next, 0).await, Ok(true)));
        assert!(matches!(store.commit_move(&next, 0).await, Ok(false)));

        let Ok(Some(stored)) = store.load_session(&s.key()).await else {
            panic!("session stored");
        };
        assert_eq!(stored.attempts, 1);
    }

    fn win(attempts: u32) -> CompletionStats {
        CompletionStats {
            buckets: PeriodBucket::all_for(day()),
            game: CompletedGame { won: true, attempts, time_seconds: 30 },
            recorded_at: Utc::now(),
        }
    }

    async fn finish(store: &InMemoryStore, user: &str, stats: &CompletionStats) -> bool {
        let s = session(user);
        let _ = store.create_session(&s).await;
        let mut done = s.clone();
        done.attempts = stats.game.attempts;
        done.is_complete = true;
        matches!(store.commit_completion(&done, 0, stats).await, Ok(true))
    }

    #[tokio::test]
    async fn completion_touches_every_bucket_once() {
        let store = InMemoryStore::new();
        let stats = win(4);
        assert!(finish(&store, "u1", &stats).await);
        assert_eq!(store.stat_row_count().await, 4);

        // A replay of the same ending loses the compare-and-set.
        let mut done = session("u1");
        done.attempts = 4;
        done.is_complete = true;
        assert!(matches!(store.commit_completion(&done, 0, &stats).await, Ok(false)));

        let bucket = PeriodBucket::for_date(PeriodType::AllTime, day());
        let key = ("u1".to_string(), "ferdle-en-5".to_string(), bucket);
        let tables = store.tables.read().await;
        let Some(stat) = tables.stats.get(&key) else {
            panic!("all-time row exists");
        };
        assert_eq!(stat.games_played, 1);
    }

    #[tokio::test]
    async fn lost_completion_writes_no_stats() {
        let store = InMemoryStore::new();
        let s = session("u1");
        let _ = store.create_session(&s).await;
        let mut done = s.clone();
        done.attempts = 1;
        done.is_complete = true;
        assert!(matches!(store.commit_completion(&done, 3, &win(1)).await, Ok(false)));
        assert_eq!(store.stat_row_count().await, 0);
    }

    #[tokio::test]
    async fn group_stats_filter_by_group() {
        let store = InMemoryStore::new();
        let _ = store.upsert_user(&user("a", "family")).await;
        let _ = store.upsert_user(&user("b", "work")).await;
        for id in ["a", "b"] {
            assert!(finish(&store, id, &win(3)).await);
        }

        let bucket = PeriodBucket::for_date(PeriodType::AllTime, day());
        let Ok(rows) = store.group_stats("ferdle-en-5", &bucket, "family").await else {
            panic!("query succeeds");
        };
        assert_eq!(rows.len(), 1);
        assert!(rows.iter().all(|r| r.stat.user_id == "a"));
    }

    #[tokio::test]
    async fn repeated_failures_share_one_pending_retry() {
        let store = InMemoryStore::new();
        let request = ContentRequest {
            word: "Crane".to_string(),
            language: "en".to_string(),
            description: "a bird".to_string(),
        };
        let _ = store.enqueue_retry(&request, "timeout", Utc::now()).await;
        let _ = store.enqueue_retry(&request, "status 502", Utc::now()).await;

        let Ok(pending) = store.pending_retries().await else {
            panic!("query succeeds");
        };
        let [retry] = pending.as_slice() else {
            panic!("one pending retry, got {}", pending.len());
        };
        assert_eq!(retry.failures, 2);
        assert_eq!(retry.last_error, "status 502");
        assert_eq!(retry.word, "crane");
    }

    #[tokio::test]
    async fn history_is_newest_first_and_paged() {
        let store = InMemoryStore::new();
        for offset in 0..3_i64 {
            let key = SessionKey::new("u1", &format!("g{offset}"), None);
            let started = Utc::now() + chrono::Duration::seconds(offset);
            let _ = store
                .create_session(&GameSession::new(key, None, started, json!({})))
                .await;
        }
        let Ok(page) = store.list_sessions("u1", None, 2, 0).await else {
            panic!("list succeeds");
        };
        let ids: Vec<&str> = page.iter().map(|s| s.game_id.as_str()).collect();
        assert_eq!(ids, vec!["g2", "g1"]);

        let Ok(rest) = store.list_sessions("u1", None, 2, 2).await else {
            panic!("list succeeds");
        };
        assert_eq!(rest.len(), 1);
    }
}
