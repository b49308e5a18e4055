//! Data Transfer Objects for REST request/response serialization.

pub mod admin_dto;
pub mod common_dto;
pub mod game_dto;
pub mod leaderboard_dto;

pub use admin_dto::*;
pub use common_dto::*;
pub use game_dto::*;
pub use leaderboard_dto::*;
