//! Game session service: the play lifecycle of one (user, game, date).
//!
//! A session moves from absent to in progress on first access and from in
//! progress to won or lost on the move that ends it. Every accepted move is
//! committed with a compare-and-set on the previous attempt count. The move
//! that ends a leaderboard game is committed together with its stats, so
//! the terminal transition and the leaderboard update land exactly once per
//! session or not at all.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{
    Clock, GameCalendar, GamePlugin, GameRegistry, GameSession, Illustration, MoveValidation,
    SessionKey,
};
use crate::error::GameError;
use crate::persistence::SessionStore;

use super::{IllustrationService, LeaderboardService};

/// Largest history page.
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// A session as shown to its player.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SessionView {
    /// Owning user.
    pub user_id: String,
    /// Game identifier.
    pub game_id: String,
    /// Puzzle date for daily games.
    pub game_date: Option<NaiveDate>,
    /// Whether the session ended.
    pub is_complete: bool,
    /// Whether it ended in a win.
    pub won: bool,
    /// Moves made.
    pub attempts: u32,
    /// Attempt cap; `null` for uncapped games.
    pub max_attempts: Option<u32>,
    /// Moves left; `null` for uncapped games.
    pub attempts_remaining: Option<u32>,
    /// Creation instant.
    pub started_at: DateTime<Utc>,
    /// Completion instant.
    pub completed_at: Option<DateTime<Utc>>,
    /// Seconds from start to completion.
    pub elapsed_seconds: Option<i64>,
    /// Game payload with secrets removed while in progress.
    #[schema(value_type = Object)]
    pub state_data: Value,
}

impl SessionView {
    fn new(plugin: &dyn GamePlugin, session: &GameSession) -> Self {
        Self {
            user_id: session.user_id.clone(),
            game_id: session.game_id.clone(),
            game_date: session.game_date,
            is_complete: session.is_complete,
            won: session.won,
            attempts: session.attempts,
            max_attempts: session.max_attempts,
            attempts_remaining: session.attempts_remaining(),
            started_at: session.started_at,
            completed_at: session.completed_at,
            elapsed_seconds: session.elapsed_seconds(),
            state_data: plugin.client_state(session),
        }
    }
}

/// Current state of a session plus its illustration, if it was won.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    /// Player-facing session.
    pub view: SessionView,
    /// Illustration of the answer for won sessions.
    pub illustration: Option<Illustration>,
}

/// An applied move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveResult {
    /// Session after the move.
    pub view: SessionView,
    /// `true` only on the move that ended the session.
    pub completed: bool,
    /// Illustration produced on a winning move.
    pub illustration: Option<Illustration>,
}

/// Result of submitting a move.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The move was applied and committed.
    Accepted(MoveResult),
    /// The game refused the move; nothing was stored.
    Rejected {
        /// Reason to show the player, verbatim from the game.
        reason: String,
    },
}

/// Orchestrates sessions across the registry, store, leaderboard and
/// illustrations.
#[derive(Debug, Clone)]
pub struct GameSessionService {
    registry: Arc<GameRegistry>,
    sessions: Arc<dyn SessionStore>,
    leaderboard: LeaderboardService,
    illustrations: Option<IllustrationService>,
    calendar: GameCalendar,
    clock: Arc<dyn Clock>,
}

impl GameSessionService {
    /// Creates a new `GameSessionService`.
    ///
    /// Without an [`IllustrationService`] no content is requested at all.
    #[must_use]
    pub fn new(
        registry: Arc<GameRegistry>,
        sessions: Arc<dyn SessionStore>,
        leaderboard: LeaderboardService,
        illustrations: Option<IllustrationService>,
        calendar: GameCalendar,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            sessions,
            leaderboard,
            illustrations,
            calendar,
            clock,
        }
    }

    /// Returns the game registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<GameRegistry> {
        &self.registry
    }

    /// Today's date in the canonical time zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.calendar.today(self.clock.now())
    }

    /// Loads the session for `(user_id, game_id, date)`, creating it if it
    /// does not exist yet.
    ///
    /// Daily games default to today and refuse future dates and dates older
    /// than the replay window before touching storage. Unlimited games
    /// ignore `date`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameNotFound`], [`GameError::FutureDate`],
    /// [`GameError::DateTooOld`], or a storage error.
    pub async fn get_or_create(
        &self,
        user_id: &str,
        game_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<GameSession, GameError> {
        let plugin = self.registry.resolve(game_id)?;
        self.get_or_create_with(plugin.as_ref(), user_id, date).await
    }

    /// [`Self::get_or_create`] as the player sees it, with the illustration
    /// of a won session.
    ///
    /// # Errors
    ///
    /// See [`Self::get_or_create`].
    pub async fn state(
        &self,
        user_id: &str,
        game_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<SessionState, GameError> {
        let plugin = self.registry.resolve(game_id)?;
        let session = self.get_or_create_with(plugin.as_ref(), user_id, date).await?;
        let illustration = if session.won {
            self.illustrate(plugin.as_ref(), &session).await?
        } else {
            None
        };
        Ok(SessionState {
            view: SessionView::new(plugin.as_ref(), &session),
            illustration,
        })
    }

    /// Validates and applies one move.
    ///
    /// A move the game refuses comes back as [`MoveOutcome::Rejected`] and
    /// changes nothing. The move that ends the session stamps the
    /// completion time, updates the leaderboard and, on a win, fetches the
    /// illustration.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameAlreadyComplete`] for a finished session,
    /// [`GameError::ConcurrentMove`] if another move was committed first,
    /// the date errors of [`Self::get_or_create`], or a storage error.
    pub async fn submit_move(
        &self,
        user_id: &str,
        game_id: &str,
        mv: &Value,
        date: Option<NaiveDate>,
    ) -> Result<MoveOutcome, GameError> {
        let plugin = self.registry.resolve(game_id)?;
        let session = self.load_or_init(plugin.as_ref(), user_id, date).await?;
        if session.is_complete {
            return Err(GameError::GameAlreadyComplete);
        }

        if let MoveValidation::Rejected(reason) = plugin.validate_move(&session, mv)? {
            tracing::debug!(session = %session.key(), %reason, "move rejected");
            return Ok(MoveOutcome::Rejected { reason });
        }

        let expected_attempts = session.attempts;
        let mut next = session;
        plugin.apply_move(&mut next, mv)?;
        if next.is_complete && next.completed_at.is_none() {
            next.completed_at = Some(self.clock.now());
        }

        let counts = next.is_complete && plugin.config().supports_leaderboard;
        let committed = if counts {
            let stats = self.leaderboard.completion_stats(&next)?;
            self.sessions
                .commit_completion(&next, expected_attempts, &stats)
                .await?
        } else {
            self.sessions.commit_move(&next, expected_attempts).await?
        };
        if !committed {
            tracing::debug!(session = %next.key(), "lost move race");
            return Err(GameError::ConcurrentMove);
        }

        let completed = next.is_complete;
        let mut illustration = None;
        if completed {
            tracing::info!(
                session = %next.key(),
                won = next.won,
                attempts = next.attempts,
                leaderboard = counts,
                "session completed"
            );
            if next.won {
                illustration = self.illustrate(plugin.as_ref(), &next).await?;
            }
        } else {
            self.prewarm(plugin.as_ref(), &next);
        }

        Ok(MoveOutcome::Accepted(MoveResult {
            view: SessionView::new(plugin.as_ref(), &next),
            completed,
            illustration,
        }))
    }

    /// Sessions of `user_id`, newest first. `limit` is clamped to
    /// `1..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameNotFound`] for an unknown `game_id` filter,
    /// or a storage error.
    pub async fn history(
        &self,
        user_id: &str,
        game_id: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<SessionView>, GameError> {
        if let Some(id) = game_id {
            self.registry.resolve(id)?;
        }
        let limit = limit.clamp(1, MAX_HISTORY_LIMIT);
        let sessions = self
            .sessions
            .list_sessions(user_id, game_id, limit, offset)
            .await?;
        Ok(sessions
            .iter()
            .filter_map(|s| {
                self.registry
                    .get(&s.game_id)
                    .map(|plugin| SessionView::new(plugin.as_ref(), s))
            })
            .collect())
    }

    async fn get_or_create_with(
        &self,
        plugin: &dyn GamePlugin,
        user_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<GameSession, GameError> {
        let session = self.load_or_init(plugin, user_id, date).await?;
        if !session.is_complete {
            self.prewarm(plugin, &session);
        }
        Ok(session)
    }

    async fn load_or_init(
        &self,
        plugin: &dyn GamePlugin,
        user_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<GameSession, GameError> {
        let now = self.clock.now();
        let game_date = if plugin.config().is_daily() {
            Some(self.calendar.resolve_date(date, now)?)
        } else {
            None
        };
        let key = SessionKey::new(user_id, &plugin.config().id, game_date);
        if let Some(existing) = self.sessions.load_session(&key).await? {
            return Ok(existing);
        }

        let fresh = plugin.initialize(user_id, game_date, now)?;
        let stored = self.sessions.create_session(&fresh).await?;
        tracing::info!(session = %key, "session created");
        Ok(stored)
    }

    async fn illustrate(
        &self,
        plugin: &dyn GamePlugin,
        session: &GameSession,
    ) -> Result<Option<Illustration>, GameError> {
        let Some(service) = &self.illustrations else {
            return Ok(None);
        };
        let Some(request) = plugin.win_content(session)? else {
            return Ok(None);
        };
        Ok(service.illustrate(&request).await)
    }

    /// Starts generating the illustration the session would get if won.
    fn prewarm(&self, plugin: &dyn GamePlugin, session: &GameSession) {
        let Some(service) = &self.illustrations else {
            return;
        };
        if !plugin.config().produces_content {
            return;
        }
        let mut as_won = session.clone();
        as_won.won = true;
        as_won.is_complete = true;
        match plugin.win_content(&as_won) {
            Ok(Some(request)) => service.prewarm(request),
            Ok(None) => {}
            Err(e) => tracing::warn!(session = %session.key(), error = %e, "skipping prewarm"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{FixedClock, GameCategory, GameConfig, PlayMode};
    use crate::persistence::memory::InMemoryStore;
    use crate::persistence::StatsStore;
    use chrono::TimeZone;
    use serde_json::json;

    /// Unlimited counting game: each move adds one; reaching three wins.
    #[derive(Debug)]
    struct ToThree {
        config: GameConfig,
    }

    impl ToThree {
        fn new() -> Self {
            Self {
                config: GameConfig {
                    id: "to-three".to_string(),
                    name: "To Three".to_string(),
                    description: "count".to_string(),
                    category: GameCategory::Math,
                    play_mode: PlayMode::Unlimited,
                    max_attempts: None,
                    supports_leaderboard: true,
                    produces_content: false,
                    metadata: Value::Null,
                },
            }
        }
    }

    impl GamePlugin for ToThree {
        fn config(&self) -> &GameConfig {
            &self.config
        }

        fn initialize(
            &self,
            user_id: &str,
            game_date: Option<NaiveDate>,
            now: DateTime<Utc>,
        ) -> Result<GameSession, GameError> {
            let key = SessionKey::new(user_id, &self.config.id, game_date);
            Ok(GameSession::new(key, None, now, json!({ "total": 0 })))
        }

        fn validate_move(&self, _s: &GameSession, mv: &Value) -> Result<MoveValidation, GameError> {
            Ok(if mv.get("add").and_then(Value::as_u64) == Some(1) {
                MoveValidation::Valid
            } else {
                MoveValidation::rejected("add exactly one")
            })
        }

        fn apply_move(&self, s: &mut GameSession, _mv: &Value) -> Result<(), GameError> {
            s.attempts += 1;
            s.state_data = json!({ "total": s.attempts });
            if s.attempts == 3 {
                s.is_complete = true;
                s.won = true;
            }
            Ok(())
        }
    }

    fn service() -> (GameSessionService, Arc<InMemoryStore>) {
        let mut registry = GameRegistry::new();
        let Ok(()) = registry.register(Arc::new(ToThree::new())) else {
            panic!("registers");
        };
        let registry = Arc::new(registry);
        let store = Arc::new(InMemoryStore::new());
        let chrono::LocalResult::Single(now) = Utc.with_ymd_and_hms(2025, 11, 27, 15, 0, 0) else {
            panic!("valid instant");
        };
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(now));
        let leaderboard = LeaderboardService::new(
            Arc::clone(&registry),
            Arc::clone(&store) as Arc<dyn StatsStore>,
            GameCalendar::default(),
            Arc::clone(&clock),
            10,
        );
        let svc = GameSessionService::new(
            registry,
            Arc::clone(&store) as Arc<dyn SessionStore>,
            leaderboard,
            None,
            GameCalendar::default(),
            clock,
        );
        (svc, store)
    }

    async fn play(svc: &GameSessionService, mv: Value) -> MoveOutcome {
        match svc.submit_move("u1", "to-three", &mv, None).await {
            Ok(outcome) => outcome,
            Err(e) => panic!("move failed: {e}"),
        }
    }

    #[tokio::test]
    async fn unlimited_games_ignore_date() {
        let (svc, _) = service();
        let Ok(s) = svc.get_or_create("u1", "to-three", None).await else {
            panic!("session created");
        };
        assert_eq!(s.game_date, None);
    }

    #[tokio::test]
    async fn unknown_game_is_an_error() {
        let (svc, _) = service();
        let result = svc.get_or_create("u1", "nope", None).await;
        assert!(matches!(result, Err(GameError::GameNotFound(_))));
    }

    #[tokio::test]
    async fn rejection_leaves_state_untouched() {
        let (svc, _) = service();
        let outcome = play(&svc, json!({ "add": 2 })).await;
        assert_eq!(
            outcome,
            MoveOutcome::Rejected {
                reason: "add exactly one".to_string()
            }
        );
        let Ok(s) = svc.get_or_create("u1", "to-three", None).await else {
            panic!("session loads");
        };
        assert_eq!(s.attempts, 0);
    }

    #[tokio::test]
    async fn terminal_move_is_reported_once_and_counted() {
        let (svc, store) = service();
        for expected in [false, false, true] {
            let MoveOutcome::Accepted(result) = play(&svc, json!({ "add": 1 })).await else {
                panic!("move accepted");
            };
            assert_eq!(result.completed, expected);
        }
        assert_eq!(store.stat_row_count().await, 4);

        let again = svc.submit_move("u1", "to-three", &json!({ "add": 1 }), None).await;
        assert!(matches!(again, Err(GameError::GameAlreadyComplete)));
        let Ok(s) = svc.get_or_create("u1", "to-three", None).await else {
            panic!("session loads");
        };
        assert_eq!(s.attempts, 3);
        assert_eq!(s.elapsed_seconds(), Some(0));
    }

    #[tokio::test]
    async fn history_is_limited() {
        let (svc, _) = service();
        let _ = svc.get_or_create("u1", "to-three", None).await;
        let Ok(history) = svc.history("u1", None, 0, 0).await else {
            panic!("history loads");
        };
        assert_eq!(history.len(), 1);
        assert!(matches!(
            svc.history("u1", Some("nope"), 10, 0).await,
            Err(GameError::GameNotFound(_))
        ));
    }
}
