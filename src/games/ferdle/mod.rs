//! Ferdle: a daily Wordle-style word game.
//!
//! One [`FerdleGame`] instance serves one language and word length. At
//! construction the answer pool is permuted with a generator seeded from
//! `ferdle-{lang}-{len}`; the answer for a date is the entry at
//! `day_number mod pool_size`. Editing the word list shifts every later
//! answer.

mod clues;
mod shuffle;
mod word_list;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::calendar::GameCalendar;
use crate::domain::{
    ContentRequest, GameCategory, GameConfig, GamePlugin, GameSession, MoveValidation, PlayMode,
    SessionKey,
};
use crate::error::GameError;

pub use clues::{Clue, generate_clues, update_letter_states};
pub use shuffle::{SeededRng, shuffled_with_key};
pub use word_list::{WordLists, normalize};

/// Guesses allowed per daily puzzle.
pub const MAX_ATTEMPTS: u32 = 10;

/// Key of the hidden answer inside the state payload.
pub const TARGET_WORD_FIELD: &str = "targetWord";

/// Supported word-list languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    En,
    /// Russian.
    Ru,
}

impl Language {
    /// Two-letter tag used in identifiers and file names.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ru => "ru",
        }
    }

    const fn display_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Ru => "Русский",
        }
    }

    const fn game_name(&self) -> &'static str {
        match self {
            Self::En => "Ferdle",
            Self::Ru => "Фердл",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One scored guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRecord {
    /// Normalised guess.
    pub word: String,
    /// One clue per character.
    pub clues: Vec<Clue>,
}

/// Ferdle's session payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FerdleState {
    /// The hidden answer.
    pub target_word: String,
    /// Guesses in submission order; its length equals the session's attempts.
    pub guesses: Vec<GuessRecord>,
    /// Best clue seen per letter.
    pub letter_states: BTreeMap<String, Clue>,
    /// Language of the puzzle.
    pub language: Language,
}

impl FerdleState {
    /// Reads the payload of `session`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CorruptState`] if the payload has another shape.
    pub fn from_session(session: &GameSession) -> Result<Self, GameError> {
        Self::deserialize(&session.state_data).map_err(|e| {
            GameError::CorruptState(format!("session {}: {e}", session.key()))
        })
    }

    fn to_value(&self) -> Result<Value, GameError> {
        serde_json::to_value(self).map_err(|e| GameError::Internal(e.to_string()))
    }
}

/// Daily word game for one language and word length.
#[derive(Debug)]
pub struct FerdleGame {
    config: GameConfig,
    language: Language,
    word_length: usize,
    words: WordLists,
    schedule: Vec<String>,
}

impl FerdleGame {
    /// Builds the game from prepared word lists.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::WordList`] if the answer pool is empty.
    pub fn new(language: Language, word_length: usize, words: WordLists) -> Result<Self, GameError> {
        if words.targets().is_empty() {
            return Err(GameError::WordList(format!(
                "ferdle-{language}-{word_length} has no answers"
            )));
        }
        let seed = Self::seed_key(language, word_length);
        let schedule = shuffled_with_key(words.targets(), &seed);
        Ok(Self {
            config: Self::build_config(language, word_length),
            language,
            word_length,
            words,
            schedule,
        })
    }

    /// Loads word lists from `data_dir` and builds the game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::WordList`] when the lists cannot be used.
    pub fn from_data_dir(
        data_dir: &Path,
        language: Language,
        word_length: usize,
    ) -> Result<Self, GameError> {
        let words = WordLists::load(data_dir, language, word_length)?;
        Self::new(language, word_length, words)
    }

    /// Seed string of the answer permutation, also the game identifier.
    #[must_use]
    pub fn seed_key(language: Language, word_length: usize) -> String {
        format!("ferdle-{}-{word_length}", language.code())
    }

    fn build_config(language: Language, word_length: usize) -> GameConfig {
        GameConfig {
            id: Self::seed_key(language, word_length),
            name: language.game_name().to_string(),
            description: format!(
                "{} {word_length}-letter word guessing game",
                language.display_name()
            ),
            category: GameCategory::Word,
            play_mode: PlayMode::Daily,
            max_attempts: Some(MAX_ATTEMPTS),
            supports_leaderboard: true,
            produces_content: true,
            metadata: json!({
                "language": language.code(),
                "wordLength": word_length,
            }),
        }
    }

    /// Language of this variant.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Letters per word.
    #[must_use]
    pub const fn word_length(&self) -> usize {
        self.word_length
    }

    /// Answer for `date`. Dates before the epoch wrap around as well.
    #[must_use]
    pub fn daily_word(&self, date: NaiveDate) -> &str {
        let len = i64::try_from(self.schedule.len()).unwrap_or(i64::MAX);
        let index = usize::try_from(GameCalendar::day_number(date).rem_euclid(len)).unwrap_or(0);
        self.schedule.get(index).map_or("", String::as_str)
    }

    fn guess_of(mv: &Value) -> Option<String> {
        mv.get("guess")
            .and_then(Value::as_str)
            .map(|g| g.trim().to_lowercase())
    }
}

impl GamePlugin for FerdleGame {
    fn config(&self) -> &GameConfig {
        &self.config
    }

    fn initialize(
        &self,
        user_id: &str,
        game_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<GameSession, GameError> {
        let date = game_date.ok_or(GameError::DateRequired)?;
        let state = FerdleState {
            target_word: self.daily_word(date).to_string(),
            guesses: Vec::new(),
            letter_states: BTreeMap::new(),
            language: self.language,
        };
        let key = SessionKey::new(user_id, &self.config.id, Some(date));
        Ok(GameSession::new(key, Some(MAX_ATTEMPTS), now, state.to_value()?))
    }

    fn validate_move(&self, session: &GameSession, mv: &Value) -> Result<MoveValidation, GameError> {
        let Some(guess) = Self::guess_of(mv) else {
            return Ok(MoveValidation::rejected("Guess must be a string"));
        };
        if guess.chars().count() != self.word_length {
            return Ok(MoveValidation::rejected(format!(
                "Word must be {} letters",
                self.word_length
            )));
        }
        if !self.words.is_word(&guess) {
            return Ok(MoveValidation::rejected("Not a word"));
        }
        let state = FerdleState::from_session(session)?;
        if state.guesses.iter().any(|g| g.word.to_lowercase() == guess) {
            return Ok(MoveValidation::rejected("Already guessed this word"));
        }
        Ok(MoveValidation::Valid)
    }

    fn apply_move(&self, session: &mut GameSession, mv: &Value) -> Result<(), GameError> {
        if session.is_complete {
            return Err(GameError::GameAlreadyComplete);
        }
        let guess = Self::guess_of(mv)
            .ok_or_else(|| GameError::InvalidRequest("guess must be a string".to_string()))?;
        let mut state = FerdleState::from_session(session)?;

        let guess_chars: Vec<char> = guess.chars().collect();
        let target_chars: Vec<char> = state.target_word.chars().collect();
        let clues = generate_clues(&guess_chars, &target_chars);
        update_letter_states(&mut state.letter_states, &guess_chars, &clues);

        let solved = guess == state.target_word;
        state.guesses.push(GuessRecord { word: guess, clues });
        session.attempts = session.attempts.saturating_add(1);

        if solved {
            session.won = true;
            session.is_complete = true;
        } else if session.has_exhausted_attempts() {
            session.won = false;
            session.is_complete = true;
        }

        session.state_data = state.to_value()?;
        Ok(())
    }

    fn win_content(&self, session: &GameSession) -> Result<Option<ContentRequest>, GameError> {
        if !session.won {
            return Ok(None);
        }
        let state = FerdleState::from_session(session)?;
        let description = match self.language {
            Language::En => format!("the English word \"{}\"", state.target_word),
            Language::Ru => format!("русское слово «{}»", state.target_word),
        };
        Ok(Some(ContentRequest {
            word: state.target_word,
            language: self.language.code().to_string(),
            description,
        }))
    }

    fn client_state(&self, session: &GameSession) -> Value {
        let mut data = session.state_data.clone();
        if !session.is_complete {
            if let Some(obj) = data.as_object_mut() {
                obj.remove(TARGET_WORD_FIELD);
            }
        }
        data
    }
}
