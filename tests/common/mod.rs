//! Shared fixtures: an in-memory server pinned to a fixed instant.

#![allow(dead_code, clippy::panic)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use ferdle_server::app_state::{AppState, EngineSettings};
use ferdle_server::domain::{
    Clock, ContentRequest, FixedClock, GameCalendar, GameRegistry, Illustration, Whitelist,
};
use ferdle_server::error::GameError;
use ferdle_server::games::ferdle::{FerdleGame, Language, WordLists};
use ferdle_server::persistence::memory::InMemoryStore;
use ferdle_server::persistence::{SessionStore, Stores, User, UserStore};
use ferdle_server::service::ImageGenerator;

pub const GAME_ID: &str = "ferdle-en-5";

pub const TARGETS: [&str; 3] = ["crane", "slate", "robot"];

/// Valid words that are never an answer.
pub const NON_TARGETS: [&str; 11] = [
    "adieu", "floor", "speed", "abbey", "erase", "ghost", "plumb", "vivid", "jumpy", "quart",
    "zesty",
];

pub const WHITELIST: &str = "\
# test players
alice@example.com,family
bob@example.com,family
carol@example.com,work
";

pub const ADMIN_EMAIL: &str = "alice@example.com";

/// Noon in New York on 2025-11-27.
pub fn now() -> DateTime<Utc> {
    let Some(t) = Utc.with_ymd_and_hms(2025, 11, 27, 17, 0, 0).single() else {
        panic!("valid instant");
    };
    t
}

pub fn today() -> NaiveDate {
    now().date_naive()
}

pub fn days_ago(days: i64) -> NaiveDate {
    today() - chrono::Duration::days(days)
}

/// Image generator that records calls and answers with a fixed URL.
#[derive(Debug, Default)]
pub struct StubGenerator {
    pub calls: AtomicUsize,
}

impl StubGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for StubGenerator {
    async fn generate(&self, request: &ContentRequest) -> Result<Illustration, GameError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Illustration {
            url: format!("https://img.test/{}-{}.png", request.language, request.word),
            cached: false,
        })
    }
}

pub fn ferdle() -> FerdleGame {
    let dictionary = TARGETS.iter().chain(NON_TARGETS.iter()).copied();
    let words = WordLists::from_words(dictionary, TARGETS, 5);
    let Ok(game) = FerdleGame::new(Language::En, 5, words) else {
        panic!("word lists are usable");
    };
    game
}

/// Everything a test needs to drive and inspect the engine.
#[derive(Debug)]
pub struct Harness {
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
    pub generator: Arc<StubGenerator>,
    pub answer: String,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_sessions(|store| store as Arc<dyn SessionStore>)
    }

    /// Builds the harness with session storage wrapped by `wrap`; the other
    /// stores stay the plain in-memory backend.
    pub fn with_sessions<F>(wrap: F) -> Self
    where
        F: FnOnce(Arc<InMemoryStore>) -> Arc<dyn SessionStore>,
    {
        let game = ferdle();
        let answer = game.daily_word(today()).to_string();

        let mut registry = GameRegistry::new();
        if registry.register(Arc::new(game)).is_err() {
            panic!("registers once");
        }

        let store = Arc::new(InMemoryStore::new());
        let generator = Arc::new(StubGenerator::default());
        let settings = EngineSettings {
            calendar: GameCalendar::new(30),
            leaderboard_default_limit: 10,
            admin_emails: HashSet::from([ADMIN_EMAIL.to_string()]),
        };
        let mut stores = Stores::from_backend(Arc::clone(&store));
        stores.sessions = wrap(Arc::clone(&store));
        let state = AppState::new(
            stores,
            Arc::new(registry),
            Arc::new(Whitelist::from_contents(WHITELIST)),
            Some(Arc::clone(&generator) as Arc<dyn ImageGenerator>),
            settings,
            Arc::new(FixedClock(now())) as Arc<dyn Clock>,
        );

        Self {
            state,
            store,
            generator,
            answer,
        }
    }

    /// A word that is valid but not today's answer.
    pub fn wrong_word(&self, nth: usize) -> &'static str {
        let Some(word) = NON_TARGETS.get(nth) else {
            panic!("only {} wrong words available", NON_TARGETS.len());
        };
        word
    }

    /// Registers a user the way the identity layer does.
    pub async fn sign_in(&self, id: &str, group: &str) {
        let user = User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            name: id.to_string(),
            avatar_url: None,
            group_name: group.to_string(),
            created_at: now(),
            last_login: now(),
        };
        if self.state.users.upsert_user(&user).await.is_err() {
            panic!("user stored");
        }
    }
}
