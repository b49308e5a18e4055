//! Domain layer: game contract, sessions, calendar and leaderboard model.
//!
//! Everything here is synchronous and storage-agnostic. The game plugin
//! contract and registry describe what a game is; sessions and leaderboard
//! stats are the records the services persist; the calendar and period
//! helpers pin all date arithmetic to one canonical time zone.

pub mod calendar;
pub mod content;
pub mod game_config;
pub mod game_registry;
pub mod game_session;
pub mod leaderboard;
pub mod period;
pub mod plugin;
pub mod whitelist;

pub use calendar::{Clock, FixedClock, GameCalendar, SystemClock};
pub use content::{ContentKey, ContentRequest, Illustration};
pub use game_config::{GameCategory, GameConfig, PlayMode};
pub use game_registry::GameRegistry;
pub use game_session::{GameSession, SessionKey};
pub use leaderboard::{
    CompletedGame, CompletionStats, LeaderboardStat, RankedStat, RankingKey, StatRow,
};
pub use period::{PeriodBucket, PeriodType};
pub use plugin::{GamePlugin, MoveValidation};
pub use whitelist::Whitelist;
