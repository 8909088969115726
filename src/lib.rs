pub mod catalog;
pub mod composer;
pub mod config;
pub mod demo;
pub mod language;
pub mod piece;
pub mod quiz;
pub mod ranking;
pub mod session;
pub mod wasm;

pub use catalog::{
    Catalog, CatalogError, CatalogSource, DirectorySource, FetchTicket, StaticSource,
};
pub use composer::{ComposerKey, known_composers, normalize};
pub use config::{Category, ConfigError, QuestionCount, QuizConfig};
pub use demo::{DEMO_QUESTION_COUNT, demo_pieces, demo_source};
pub use language::{FilePreferences, Language, MemoryPreferences, PreferenceError, PreferenceStore};
pub use piece::Piece;
pub use quiz::{OPTION_COUNT, Question, QuizFormat, generate_questions};
pub use ranking::{
    ParseRankingTypeError, Rank, RankingError, RankingQuery, RankingType, ScoreSubmission,
};
pub use session::{
    AnswerRecord, Clock, ManualClock, QuizEngine, QuizSession, QuizState, SystemClock,
};
