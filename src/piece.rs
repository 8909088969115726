use std::fmt;

use crate::composer::{self, ComposerKey};

/// A single catalog entry: one musical work with its display metadata.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Piece {
    /// Identifier shared by every language edition of the catalog.
    pub id: String,
    pub title: String,
    /// Composer name as spelled in the catalog language.
    pub composer: String,
    pub genre: String,
    /// Location of the audio excerpt played for `audio-to-title` questions.
    pub audio_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub trivia: String,
}

impl Piece {
    /// Canonical composer identity, independent of catalog language.
    pub fn composer_key(&self) -> ComposerKey {
        composer::normalize(&self.composer)
    }

    /// Title followed by the composer, as shown in answer reviews.
    pub fn display_label(&self) -> String {
        if self.composer.is_empty() {
            self.title.clone()
        } else {
            format!("{} / {}", self.title, self.composer)
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_label(), self.genre)
    }
}
