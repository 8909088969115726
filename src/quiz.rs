use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::{Category, QuestionCount};
use crate::piece::Piece;

/// Number of answer choices in a fully populated question.
pub const OPTION_COUNT: usize = 4;

/// Presentation mode pairing a prompt with the kind of answer expected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizFormat {
    /// Plays the audio excerpt and expects the title.
    #[default]
    AudioToTitle,
    /// Shows the title and expects the composer.
    TitleToComposer,
    /// Shows the title and expects the matching recording.
    TitleToTrack,
}

impl QuizFormat {
    pub const ALL: [QuizFormat; 3] = [
        QuizFormat::AudioToTitle,
        QuizFormat::TitleToComposer,
        QuizFormat::TitleToTrack,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuizFormat::AudioToTitle => "audio-to-title",
            QuizFormat::TitleToComposer => "title-to-composer",
            QuizFormat::TitleToTrack => "title-to-track",
        }
    }

    /// Text shown as the prompt for `piece`.
    pub fn prompt(self, piece: &Piece) -> String {
        match self {
            QuizFormat::AudioToTitle => piece.audio_url.clone(),
            QuizFormat::TitleToComposer | QuizFormat::TitleToTrack => piece.title.clone(),
        }
    }

    /// Text shown on the answer button for `piece`.
    pub fn option_label(self, piece: &Piece) -> String {
        match self {
            QuizFormat::AudioToTitle => piece.title.clone(),
            QuizFormat::TitleToComposer => piece.composer.clone(),
            QuizFormat::TitleToTrack => piece.audio_url.clone(),
        }
    }
}

impl fmt::Display for QuizFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown quiz format: {0}")]
pub struct ParseFormatError(pub String);

impl FromStr for QuizFormat {
    type Err = ParseFormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        QuizFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == value)
            .ok_or_else(|| ParseFormatError(value.to_string()))
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub correct_answer: Piece,
    /// Answer choices in presentation order; contains `correct_answer` once.
    pub options: Vec<Piece>,
    pub format: QuizFormat,
}

impl Question {
    pub fn is_correct(&self, selected_id: &str) -> bool {
        self.correct_answer.id == selected_id
    }

    pub fn correct_index(&self) -> Option<usize> {
        self.options
            .iter()
            .position(|piece| piece.id == self.correct_answer.id)
    }

    /// False when the pool was too small to supply every distractor.
    pub fn is_complete(&self) -> bool {
        self.options.len() == OPTION_COUNT
    }

    pub fn prompt(&self) -> String {
        self.format.prompt(&self.correct_answer)
    }
}

/// Pieces eligible for a quiz in `category`, in catalog order.
pub fn filter_pool<'a>(pieces: &'a [Piece], category: &Category) -> Vec<&'a Piece> {
    pieces
        .iter()
        .filter(|piece| category.matches(&piece.composer))
        .collect()
}

/// Builds the question sequence for a quiz.
///
/// Correct answers are drawn without replacement from the category's pool;
/// each question's distractors come from that same pool. When the pool holds
/// fewer than [`OPTION_COUNT`] pieces the questions carry fewer options.
pub fn generate_questions<R: Rng + ?Sized>(
    rng: &mut R,
    pieces: &[Piece],
    format: QuizFormat,
    category: &Category,
    count: QuestionCount,
) -> Vec<Question> {
    let pool = filter_pool(pieces, category);
    let question_count = count.resolve(pool.len());

    debug!(
        "generating {} {} questions from {} pieces in category {}",
        question_count,
        format,
        pool.len(),
        category
    );

    if pool.len() < OPTION_COUNT && !pool.is_empty() {
        warn!(
            "category {} has only {} pieces, questions will offer fewer than {} options",
            category,
            pool.len(),
            OPTION_COUNT
        );
    }

    let mut selected = pool.clone();
    selected.shuffle(rng);
    selected.truncate(question_count);

    selected
        .into_iter()
        .map(|correct| build_question(rng, &pool, correct, format))
        .collect()
}

fn build_question<R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[&Piece],
    correct: &Piece,
    format: QuizFormat,
) -> Question {
    let mut distractors: Vec<&Piece> = pool
        .iter()
        .copied()
        .filter(|piece| piece.id != correct.id)
        .collect();

    distractors.shuffle(rng);
    distractors.truncate(OPTION_COUNT - 1);

    let mut options: Vec<Piece> = distractors.into_iter().cloned().collect();
    options.push(correct.clone());
    options.shuffle(rng);

    Question {
        correct_answer: correct.clone(),
        options,
        format,
    }
}
