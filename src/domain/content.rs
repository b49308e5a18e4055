//! Illustration requests and references.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What a plugin asks to have illustrated for a won session.
///
/// Never carries guess history; only the answer and a short description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContentRequest {
    /// The answer being illustrated.
    pub word: String,
    /// Language tag of the word, e.g. `en`.
    pub language: String,
    /// Short prompt text describing the concept.
    pub description: String,
}

impl ContentRequest {
    /// Returns the de-duplication and cache key for this request.
    #[must_use]
    pub fn key(&self) -> ContentKey {
        ContentKey {
            word: self.word.to_lowercase(),
            language: self.language.clone(),
        }
    }
}

/// (lower-cased word, language) pair identifying one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    /// Lower-cased word.
    pub word: String,
    /// Language tag.
    pub language: String,
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.word, self.language)
    }
}

/// Reference to a generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Illustration {
    /// Where the artifact can be fetched.
    pub url: String,
    /// Whether it came from a cache rather than a fresh generation.
    pub cached: bool,
}
