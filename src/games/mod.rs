//! Concrete games shipped with the server.

pub mod ferdle;

use std::path::Path;
use std::sync::Arc;

use crate::domain::GameRegistry;
use crate::error::GameError;
use ferdle::{FerdleGame, Language};

/// Language and word length of every Ferdle variant the server offers.
pub const FERDLE_VARIANTS: [(Language, usize); 2] = [(Language::En, 5), (Language::Ru, 4)];

/// Builds a registry holding every built-in game, reading word lists from
/// `data_dir`.
///
/// # Errors
///
/// Returns [`GameError::WordList`] if a variant's lists cannot be loaded.
pub fn builtin_registry(data_dir: &Path) -> Result<GameRegistry, GameError> {
    let mut registry = GameRegistry::new();
    for (language, word_length) in FERDLE_VARIANTS {
        let game = FerdleGame::from_data_dir(data_dir, language, word_length)?;
        registry.register(Arc::new(game))?;
    }
    Ok(registry)
}
