//! Service layer: business logic orchestration.
//!
//! [`GameSessionService`] drives the play lifecycle and calls into
//! [`LeaderboardService`] when a session ends and into
//! [`IllustrationService`] for won puzzles. Services hold their
//! collaborators behind `Arc` and are cheap to clone.

pub mod content_service;
pub mod leaderboard_service;
pub mod session_service;

pub use content_service::{HttpImageGenerator, IllustrationService, ImageGenerator};
pub use leaderboard_service::{LeaderboardPage, LeaderboardService};
pub use session_service::{
    GameSessionService, MoveOutcome, MoveResult, SessionState, SessionView,
};
