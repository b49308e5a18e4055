//! Shared application state injected into all Axum handlers.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::{Clock, GameCalendar, GameRegistry, Whitelist};
use crate::persistence::{ContentStore, Stores, UserStore};
use crate::service::{
    GameSessionService, IllustrationService, ImageGenerator, LeaderboardService,
};

/// Tunables the services are built with.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Canonical calendar and replay window.
    pub calendar: GameCalendar,
    /// Leaderboard rows returned when the client gives no limit.
    pub leaderboard_default_limit: u32,
    /// Lower-cased admin emails.
    pub admin_emails: HashSet<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            calendar: GameCalendar::default(),
            leaderboard_default_limit: 10,
            admin_emails: HashSet::new(),
        }
    }
}

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session lifecycle.
    pub sessions: Arc<GameSessionService>,
    /// Rankings.
    pub leaderboard: Arc<LeaderboardService>,
    /// Email to group mapping, reloadable at runtime.
    pub whitelist: Arc<Whitelist>,
    /// Player records.
    pub users: Arc<dyn UserStore>,
    /// Illustration cache and retry queue.
    pub content: Arc<dyn ContentStore>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Lower-cased admin emails.
    pub admin_emails: Arc<HashSet<String>>,
}

impl AppState {
    /// Wires the services over `stores`. Illustrations are disabled when
    /// `generator` is `None`.
    #[must_use]
    pub fn new(
        stores: Stores,
        registry: Arc<GameRegistry>,
        whitelist: Arc<Whitelist>,
        generator: Option<Arc<dyn ImageGenerator>>,
        settings: EngineSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let leaderboard = LeaderboardService::new(
            Arc::clone(&registry),
            Arc::clone(&stores.stats),
            settings.calendar,
            Arc::clone(&clock),
            settings.leaderboard_default_limit,
        );
        let illustrations = generator.map(|g| {
            IllustrationService::new(Arc::clone(&stores.content), g, Arc::clone(&clock))
        });
        let sessions = GameSessionService::new(
            registry,
            Arc::clone(&stores.sessions),
            leaderboard.clone(),
            illustrations,
            settings.calendar,
            Arc::clone(&clock),
        );

        Self {
            sessions: Arc::new(sessions),
            leaderboard: Arc::new(leaderboard),
            whitelist,
            users: stores.users,
            content: stores.content,
            clock,
            admin_emails: Arc::new(settings.admin_emails),
        }
    }

    /// Whether `email` may call admin endpoints.
    #[must_use]
    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails.contains(&email.trim().to_lowercase())
    }
}
