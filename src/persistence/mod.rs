//! Persistence layer: sessions, leaderboard stats, users and content cache.
//!
//! Each concern is an `async_trait` seam so the services never name a
//! backend. [`postgres::PostgresStore`] is the production implementation;
//! [`memory::InMemoryStore`] backs tests and `PERSISTENCE_ENABLED=false`.
//! Both honour the same atomicity rules: session creation is
//! insert-if-absent, move commits are compare-and-set on the attempt count,
//! and the move that ends a session is written together with the four
//! period buckets it counts toward, all or nothing.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CompletionStats, ContentKey, ContentRequest, GameSession, PeriodBucket, SessionKey, StatRow,
};
use crate::error::GameError;
pub use models::{ContentRetry, User};

/// Storage of per-(user, game, date) sessions.
#[async_trait]
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Loads the session stored under `key`.
    async fn load_session(&self, key: &SessionKey) -> Result<Option<GameSession>, GameError>;

    /// Inserts `session` unless its key already exists, and returns the row
    /// that is stored afterwards. A racing insert is not an error: the
    /// winner's row is returned.
    async fn create_session(&self, session: &GameSession) -> Result<GameSession, GameError>;

    /// Writes `session` only if the stored row still has
    /// `expected_attempts` attempts and is not complete.
    ///
    /// Returns `false` when another writer got there first.
    async fn commit_move(
        &self,
        session: &GameSession,
        expected_attempts: u32,
    ) -> Result<bool, GameError>;

    /// [`Self::commit_move`] for the move that ends a session: the session
    /// write and the update of every bucket in `stats` happen as one unit.
    ///
    /// Returns `false`, with nothing written, when another writer got there
    /// first. On error nothing is written either, so the move can be
    /// retried.
    async fn commit_completion(
        &self,
        session: &GameSession,
        expected_attempts: u32,
        stats: &CompletionStats,
    ) -> Result<bool, GameError>;

    /// Sessions of `user_id`, newest start first.
    async fn list_sessions(
        &self,
        user_id: &str,
        game_id: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<GameSession>, GameError>;
}

/// Storage of cumulative leaderboard statistics.
#[async_trait]
pub trait StatsStore: Send + Sync + fmt::Debug {
    /// All rows of `game_id` in `bucket` whose user belongs to `group`.
    async fn group_stats(
        &self,
        game_id: &str,
        bucket: &PeriodBucket,
        group: &str,
    ) -> Result<Vec<StatRow>, GameError>;
}

/// Storage of signed-in users.
#[async_trait]
pub trait UserStore: Send + Sync + fmt::Debug {
    /// Creates or refreshes a user, updating profile, group and last login.
    async fn upsert_user(&self, user: &User) -> Result<(), GameError>;

    /// Loads a user by id.
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, GameError>;
}

/// Storage of generated illustrations and failed generation attempts.
#[async_trait]
pub trait ContentStore: Send + Sync + fmt::Debug {
    /// URL of the artifact cached under `key`.
    async fn cached_content(&self, key: &ContentKey) -> Result<Option<String>, GameError>;

    /// Records an artifact. An existing entry for the same key is kept.
    async fn store_content(
        &self,
        key: &ContentKey,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<(), GameError>;

    /// Queues `request` for a later generation attempt.
    async fn enqueue_retry(
        &self,
        request: &ContentRequest,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<(), GameError>;

    /// Queued requests still waiting, oldest first.
    async fn pending_retries(&self) -> Result<Vec<ContentRetry>, GameError>;
}

/// Everything the server persists.
pub trait Store: SessionStore + StatsStore + UserStore + ContentStore {}

impl<T> Store for T where T: SessionStore + StatsStore + UserStore + ContentStore {}

/// One handle per storage concern, all usually backed by the same store.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Session storage.
    pub sessions: Arc<dyn SessionStore>,
    /// Leaderboard storage.
    pub stats: Arc<dyn StatsStore>,
    /// User storage.
    pub users: Arc<dyn UserStore>,
    /// Illustration cache and retry queue.
    pub content: Arc<dyn ContentStore>,
}

impl Stores {
    /// Splits one backend into per-concern handles.
    #[must_use]
    pub fn from_backend<S: Store + 'static>(store: Arc<S>) -> Self {
        Self {
            sessions: Arc::clone(&store) as Arc<dyn SessionStore>,
            stats: Arc::clone(&store) as Arc<dyn StatsStore>,
            users: Arc::clone(&store) as Arc<dyn UserStore>,
            content: store,
        }
    }
}
