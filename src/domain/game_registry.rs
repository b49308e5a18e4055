//! Catalog of registered games.
//!
//! [`GameRegistry`] maps game identifiers to plugin instances. It is filled
//! once at startup and shared behind an `Arc` afterwards; nothing mutates it
//! while requests are being served, so lookups take no lock.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{GameCategory, GameConfig, GamePlugin};
use crate::error::GameError;

/// Uniqueness-enforcing map from game identifier to plugin.
///
/// Iteration order is the lexical order of identifiers, so listings are
/// stable across restarts.
#[derive(Debug, Default)]
pub struct GameRegistry {
    games: BTreeMap<String, Arc<dyn GamePlugin>>,
}

impl GameRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plugin under its configured identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AlreadyRegistered`] if the identifier is taken.
    pub fn register(&mut self, plugin: Arc<dyn GamePlugin>) -> Result<(), GameError> {
        let config = plugin.config();
        let id = config.id.clone();
        if self.games.contains_key(&id) {
            return Err(GameError::AlreadyRegistered(id));
        }
        tracing::info!(game_id = %id, name = %config.name, "registered game");
        self.games.insert(id, plugin);
        Ok(())
    }

    /// Looks up a plugin; `None` when the identifier is unknown.
    #[must_use]
    pub fn get(&self, game_id: &str) -> Option<Arc<dyn GamePlugin>> {
        self.games.get(game_id).map(Arc::clone)
    }

    /// Looks up a plugin, treating an unknown identifier as an error.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameNotFound`] if no plugin has the identifier.
    pub fn resolve(&self, game_id: &str) -> Result<Arc<dyn GamePlugin>, GameError> {
        self.get(game_id)
            .ok_or_else(|| GameError::GameNotFound(game_id.to_string()))
    }

    /// Returns `true` if a plugin is registered under `game_id`.
    #[must_use]
    pub fn contains(&self, game_id: &str) -> bool {
        self.games.contains_key(game_id)
    }

    /// Returns every registered plugin.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<dyn GamePlugin>> {
        self.games.values().map(Arc::clone).collect()
    }

    /// Returns the configuration of every registered plugin.
    #[must_use]
    pub fn all_configs(&self) -> Vec<GameConfig> {
        self.games.values().map(|g| g.config().clone()).collect()
    }

    /// Returns the plugins listed under `category`.
    #[must_use]
    pub fn by_category(&self, category: GameCategory) -> Vec<Arc<dyn GamePlugin>> {
        self.games
            .values()
            .filter(|g| g.config().category == category)
            .map(Arc::clone)
            .collect()
    }

    /// Returns the number of registered games.
    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
