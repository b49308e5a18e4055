//! # ferdle-server
//!
//! Game session and leaderboard engine for a small, invitation-only daily
//! word-guessing platform.
//!
//! Games are plugins behind one [`domain::GamePlugin`] contract. The engine
//! owns what they share: per-day sessions with date validation in a single
//! canonical time zone, attempt accounting, group-scoped leaderboards over
//! daily, weekly, monthly and all-time buckets, and best-effort
//! illustrations of solved words. The built-in game is Ferdle (English
//! 5-letter and Russian 4-letter).
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers + identity (api/)
//!     │
//!     ├── GameSessionService ── LeaderboardService
//!     │        └── IllustrationService (service/)
//!     │
//!     ├── GameRegistry, GameCalendar, Whitelist (domain/)
//!     ├── Ferdle plugin (games/)
//!     │
//!     └── PostgreSQL or in-memory store (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod games;
pub mod persistence;
pub mod service;
