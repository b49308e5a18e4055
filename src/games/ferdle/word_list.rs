//! Dictionary and answer pool for one language and word length.
//!
//! Lists are JSON arrays of strings stored as
//! `game-assets/ferdle/dictionary-{lang}.json` and
//! `game-assets/ferdle/targets-{lang}.json` under the data directory. Words
//! are trimmed, lower-cased and filtered to the configured length counted in
//! characters, not bytes.

use std::collections::HashSet;
use std::path::Path;

use super::Language;
use crate::error::GameError;

/// Accepted guesses plus the ordered pool of possible answers.
#[derive(Debug, Clone, Default)]
pub struct WordLists {
    dictionary: HashSet<String>,
    targets: Vec<String>,
}

impl WordLists {
    /// Builds the lists from raw words, normalising and length-filtering
    /// both. Every target is also accepted as a guess. Duplicate targets
    /// keep their first position.
    #[must_use]
    pub fn from_words<D, T>(dictionary: D, targets: T, word_length: usize) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let mut dict: HashSet<String> = dictionary
            .into_iter()
            .filter_map(|w| normalize(w.as_ref(), word_length))
            .collect();

        let mut seen = HashSet::new();
        let mut pool = Vec::new();
        for word in targets
            .into_iter()
            .filter_map(|w| normalize(w.as_ref(), word_length))
        {
            if seen.insert(word.clone()) {
                dict.insert(word.clone());
                pool.push(word);
            }
        }

        Self {
            dictionary: dict,
            targets: pool,
        }
    }

    /// Reads both lists for `language` from `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::WordList`] when a file is missing, is not a JSON
    /// array of strings, or leaves no answer of the requested length.
    pub fn load(data_dir: &Path, language: Language, word_length: usize) -> Result<Self, GameError> {
        let dir = data_dir.join("game-assets").join("ferdle");
        let dictionary = read_list(&dir.join(format!("dictionary-{}.json", language.code())))?;
        let targets = read_list(&dir.join(format!("targets-{}.json", language.code())))?;
        let lists = Self::from_words(dictionary, targets, word_length);
        if lists.targets.is_empty() {
            return Err(GameError::WordList(format!(
                "no {word_length}-letter answers for language {language}"
            )));
        }
        tracing::info!(
            language = %language,
            word_length,
            dictionary = lists.dictionary.len(),
            targets = lists.targets.len(),
            "loaded word lists"
        );
        Ok(lists)
    }

    /// Returns `true` if `word` (already normalised) is an accepted guess.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        self.dictionary.contains(word)
    }

    /// The answer pool in file order.
    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Number of accepted guesses.
    #[must_use]
    pub fn dictionary_len(&self) -> usize {
        self.dictionary.len()
    }
}

/// Trims and lower-cases `word`; `None` unless it has `word_length` characters.
#[must_use]
pub fn normalize(word: &str, word_length: usize) -> Option<String> {
    let w = word.trim().to_lowercase();
    (w.chars().count() == word_length).then_some(w)
}

fn read_list(path: &Path) -> Result<Vec<String>, GameError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| GameError::WordList(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw).map_err(|e| GameError::WordList(format!("{}: {e}", path.display())))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_character_length() {
        let lists = WordLists::from_words(["Crane", " slate ", "toolong", "ab"], ["CRANE"], 5);
        assert!(lists.is_word("crane"));
        assert!(lists.is_word("slate"));
        assert!(!lists.is_word("toolong"));
        assert_eq!(lists.targets(), ["crane".to_string()]);
    }

    #[test]
    fn cyrillic_counts_characters_not_bytes() {
        let lists = WordLists::from_words(["Кура", "рука"], ["кура", "кошка"], 4);
        assert!(lists.is_word("кура"));
        assert!(lists.is_word("рука"));
        assert_eq!(lists.targets().len(), 1);
    }

    #[test]
    fn targets_are_accepted_guesses_and_deduplicated() {
        let lists = WordLists::from_words(Vec::<String>::new(), ["apple", "Apple", "berry"], 5);
        assert!(lists.is_word("berry"));
        assert_eq!(lists.targets(), ["apple".to_string(), "berry".to_string()]);
        assert_eq!(lists.dictionary_len(), 2);
    }

    #[test]
    fn missing_files_are_word_list_errors() {
        let dir = std::env::temp_dir().join("ferdle-no-such-assets");
        let result = WordLists::load(&dir, Language::En, 5);
        assert!(matches!(result, Err(GameError::WordList(_))));
    }

    #[test]
    fn loads_from_data_dir() {
        let dir = std::env::temp_dir().join(format!("ferdle-assets-{}", std::process::id()));
        let assets = dir.join("game-assets").join("ferdle");
        let Ok(()) = std::fs::create_dir_all(&assets) else {
            panic!("create asset dir");
        };
        let Ok(()) = std::fs::write(assets.join("dictionary-en.json"), r#"["crane","slate"]"#) else {
            panic!("write dictionary");
        };
        let Ok(()) = std::fs::write(assets.join("targets-en.json"), r#"["CRANE"]"#) else {
            panic!("write targets");
        };

        let Ok(lists) = WordLists::load(&dir, Language::En, 5) else {
            panic!("lists should load");
        };
        assert_eq!(lists.targets().len(), 1);
        assert!(matches!(
            WordLists::load(&dir, Language::En, 6),
            Err(GameError::WordList(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
