use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::catalog::Catalog;
use crate::config::{Category, QuestionCount, QuizConfig};
use crate::quiz::{self, Question, QuizFormat};
use crate::ranking::ScoreSubmission;

/// Points awarded per correct answer.
pub const POINTS_PER_CORRECT: u64 = 1000;
/// Points deducted per elapsed second, after rounding to whole seconds.
pub const PENALTY_PER_SECOND: u64 = 10;

/// Wall-clock source in epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance_ms(&self, delta_ms: u64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizState {
    Unconfigured,
    Configured,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnswerRecord {
    pub question: Question,
    pub selected_id: String,
    pub is_correct: bool,
}

/// Everything about one play-through: its configuration, questions and progress.
///
/// Timestamps are epoch milliseconds; `0` means not yet set.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuizSession {
    pub nickname: String,
    pub format: QuizFormat,
    pub category: Category,
    pub requested_count: QuestionCount,
    pub questions: Vec<Question>,
    pub position: usize,
    pub correct_count: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    pub history: Vec<AnswerRecord>,
}

impl QuizSession {
    fn from_config(config: &QuizConfig) -> Self {
        Self {
            nickname: config.nickname().to_string(),
            format: config.format,
            category: config.category.clone(),
            requested_count: config.count,
            questions: Vec::new(),
            position: 0,
            correct_count: 0,
            start_ms: 0,
            end_ms: 0,
            history: Vec::new(),
        }
    }

    /// Elapsed seconds between start and end, or 0 until both are set.
    pub fn total_time(&self) -> f64 {
        if self.start_ms == 0 || self.end_ms == 0 {
            return 0.0;
        }

        self.end_ms.saturating_sub(self.start_ms) as f64 / 1000.0
    }

    /// `max(0, correct * 1000 - round(seconds) * 10)`, or 0 until finished.
    pub fn final_score(&self) -> u64 {
        if self.start_ms == 0 || self.end_ms == 0 {
            return 0;
        }

        let seconds = self.total_time().round() as u64;
        (self.correct_count as u64 * POINTS_PER_CORRECT)
            .saturating_sub(seconds * PENALTY_PER_SECOND)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.position)
    }

    pub fn is_complete(&self) -> bool {
        self.end_ms > 0
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::from_config(&QuizConfig::default())
    }
}

/// Drives a single player's quiz from setup to final score.
///
/// The engine owns its session, random source and clock; the catalog is
/// borrowed only while questions are generated.
pub struct QuizEngine<R = StdRng, C = SystemClock> {
    rng: R,
    clock: C,
    config: QuizConfig,
    session: QuizSession,
    state: QuizState,
}

impl<C: Clock> QuizEngine<StdRng, C> {
    pub fn from_entropy(clock: C) -> Self {
        Self::new(StdRng::from_entropy(), clock)
    }
}

impl<R: Rng, C: Clock> QuizEngine<R, C> {
    pub fn new(rng: R, clock: C) -> Self {
        Self {
            rng,
            clock,
            config: QuizConfig::default(),
            session: QuizSession::default(),
            state: QuizState::Unconfigured,
        }
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// Replaces any previous session with a freshly generated one.
    pub fn setup_quiz(&mut self, catalog: &Catalog, config: QuizConfig) {
        self.session = QuizSession::from_config(&config);
        self.config = config;
        self.generate_questions(catalog);
        self.state = QuizState::Configured;

        info!(
            "quiz configured for {}: {} questions ({}, {}, {})",
            self.session.nickname,
            self.session.questions.len(),
            self.session.format,
            self.session.category,
            self.session.requested_count
        );
    }

    /// Draws a new question sequence for the current configuration.
    ///
    /// Any progress on the previous questions is dropped and the session
    /// goes back to `Configured`, waiting for `start_quiz`.
    pub fn generate_questions(&mut self, catalog: &Catalog) {
        self.session.questions = quiz::generate_questions(
            &mut self.rng,
            catalog.pieces(),
            self.config.format,
            &self.config.category,
            self.config.count,
        );
        self.session.history.clear();
        self.session.correct_count = 0;
        self.session.position = 0;
        self.session.start_ms = 0;
        self.session.end_ms = 0;
        self.state = QuizState::Configured;
    }

    /// Starts, or restarts in place, the configured questions.
    ///
    /// Returns `false` when there is nothing configured to start.
    pub fn start_quiz(&mut self) -> bool {
        if !matches!(self.state, QuizState::Configured | QuizState::Completed) {
            debug!("start ignored in state {:?}", self.state);
            return false;
        }

        self.session.correct_count = 0;
        self.session.position = 0;
        self.session.history.clear();
        self.session.start_ms = self.clock.now_ms().max(1);
        self.session.end_ms = 0;
        self.state = QuizState::InProgress;

        true
    }

    /// Records an answer for the current question and advances.
    ///
    /// Returns `None` without touching the session when no question is
    /// awaiting an answer.
    pub fn answer_question(&mut self, selected_id: &str) -> Option<&AnswerRecord> {
        if self.state != QuizState::InProgress {
            return None;
        }

        let question = self.session.current_question()?.clone();
        let is_correct = question.is_correct(selected_id);

        self.session.history.push(AnswerRecord {
            question,
            selected_id: selected_id.to_string(),
            is_correct,
        });

        if is_correct {
            self.session.correct_count += 1;
        }

        debug!(
            "question {} answered {}",
            self.session.position + 1,
            if is_correct { "correctly" } else { "incorrectly" }
        );

        if self.session.position + 1 < self.session.questions.len() {
            self.session.position += 1;
        } else {
            self.end_quiz();
        }

        self.session.history.last()
    }

    /// Stamps the end time once the last question has been answered.
    fn end_quiz(&mut self) -> bool {
        if self.state != QuizState::InProgress {
            debug!("end ignored in state {:?}", self.state);
            return false;
        }

        let now = self.clock.now_ms();
        self.session.end_ms = now.max(self.session.start_ms).max(1);
        self.state = QuizState::Completed;

        info!(
            "quiz finished: {}/{} correct in {:.1}s, score {}",
            self.session.correct_count,
            self.session.questions.len(),
            self.session.total_time(),
            self.session.final_score()
        );

        true
    }

    /// Drops the session, e.g. after the catalog language changed.
    pub fn reset(&mut self) {
        self.config = QuizConfig::default();
        self.session = QuizSession::default();
        self.state = QuizState::Unconfigured;
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.current_question()
    }

    pub fn total_time(&self) -> f64 {
        self.session.total_time()
    }

    pub fn final_score(&self) -> u64 {
        self.session.final_score()
    }

    pub fn is_complete(&self) -> bool {
        self.state == QuizState::Completed
    }

    /// Questions still waiting for an answer.
    pub fn remaining(&self) -> usize {
        match self.state {
            QuizState::Unconfigured | QuizState::Completed => 0,
            QuizState::Configured => self.session.questions.len(),
            QuizState::InProgress => self.session.questions.len() - self.session.position,
        }
    }

    /// The ranking tuple for a finished quiz.
    pub fn score_submission(&self) -> Option<ScoreSubmission> {
        if !self.is_complete() {
            return None;
        }

        Some(ScoreSubmission {
            nickname: self.session.nickname.clone(),
            score: self.session.final_score(),
            region: self.session.category.clone(),
            format: self.session.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::piece::Piece;

    const EPOCH_MS: u64 = 1_700_000_000_000;

    fn piece(id: &str, composer: &str) -> Piece {
        Piece {
            id: id.to_string(),
            title: format!("title {id}"),
            composer: composer.to_string(),
            genre: "Symphony".to_string(),
            audio_url: format!("https://example.com/{id}.ogg"),
            description: String::new(),
            trivia: String::new(),
        }
    }

    fn catalog_of(count: usize) -> Catalog {
        let pieces = (1..=count)
            .map(|i| piece(&i.to_string(), "ベートーヴェン"))
            .collect();
        Catalog::with_pieces(Language::Ja, pieces)
    }

    fn engine(seed: u64) -> (QuizEngine<StdRng, ManualClock>, ManualClock) {
        let clock = ManualClock::new(EPOCH_MS);
        (QuizEngine::new(StdRng::seed_from_u64(seed), clock.clone()), clock)
    }

    fn config(count: QuestionCount) -> QuizConfig {
        QuizConfig::new("Test", QuizFormat::AudioToTitle, Category::All, count)
            .expect("test nickname is valid")
    }

    #[test]
    fn new_engine_is_unconfigured() {
        let (engine, _) = engine(1);

        assert_eq!(engine.state(), QuizState::Unconfigured);
        assert_eq!(engine.session().nickname, "Guest");
        assert!(engine.current_question().is_none());
        assert_eq!(engine.final_score(), 0);
    }

    #[test]
    fn setup_stores_configuration() {
        let (mut engine, _) = engine(2);
        let config = QuizConfig::new(
            "TestUser",
            QuizFormat::TitleToComposer,
            Category::All,
            QuestionCount::Limit(5),
        )
        .expect("nickname is valid");

        engine.setup_quiz(&catalog_of(3), config);

        let session = engine.session();
        assert_eq!(session.nickname, "TestUser");
        assert_eq!(session.format, QuizFormat::TitleToComposer);
        assert_eq!(session.category, Category::All);
        assert_eq!(session.requested_count, QuestionCount::Limit(5));
        assert_eq!(session.questions.len(), 3);
        assert_eq!(engine.state(), QuizState::Configured);
    }

    #[test]
    fn start_before_setup_is_ignored() {
        let (mut engine, _) = engine(3);

        assert!(!engine.start_quiz());
        assert!(engine.answer_question("1").is_none());
        assert_eq!(engine.state(), QuizState::Unconfigured);
    }

    #[test]
    fn setup_then_start_resets_progress() {
        let (mut engine, _) = engine(4);
        engine.setup_quiz(&catalog_of(10), config(QuestionCount::Limit(5)));

        assert!(engine.start_quiz());

        let session = engine.session();
        assert_eq!(session.correct_count, 0);
        assert_eq!(session.position, 0);
        assert_eq!(session.end_ms, 0);
        assert_eq!(session.start_ms, EPOCH_MS);
        assert_eq!(engine.remaining(), 5);
    }

    #[test]
    fn answers_before_start_are_ignored() {
        let (mut engine, _) = engine(5);
        engine.setup_quiz(&catalog_of(10), config(QuestionCount::Limit(5)));

        assert!(engine.answer_question("1").is_none());
        assert!(engine.session().history.is_empty());
    }

    #[test]
    fn answering_every_question_completes_and_scores() {
        let (mut engine, clock) = engine(6);
        engine.setup_quiz(&catalog_of(50), config(QuestionCount::Limit(10)));
        engine.start_quiz();

        for _ in 0..10 {
            let correct = engine
                .current_question()
                .map(|q| q.correct_answer.id.clone())
                .expect("question available while in progress");
            clock.advance_ms(1_200);
            let record = engine.answer_question(&correct).expect("answer recorded");
            assert!(record.is_correct);
        }

        assert!(engine.is_complete());
        assert_eq!(engine.session().end_ms, EPOCH_MS + 12_000);
        assert_eq!(engine.total_time(), 12.0);
        assert_eq!(engine.final_score(), 10 * 1000 - 12 * 10);
        // Position stays on the last question once finished.
        assert_eq!(engine.session().position, 9);
        assert!(engine.current_question().is_some());
        assert!(engine.answer_question("1").is_none());
        assert_eq!(engine.session().history.len(), 10);
    }

    #[test]
    fn wrong_answers_are_recorded_without_points() {
        let (mut engine, clock) = engine(7);
        engine.setup_quiz(&catalog_of(8), config(QuestionCount::Limit(4)));
        engine.start_quiz();

        let mut expected = 0;
        for round in 0..4 {
            let question = engine.current_question().cloned().expect("question available");
            let selected = if round % 2 == 0 {
                expected += 1;
                question.correct_answer.id.clone()
            } else {
                question
                    .options
                    .iter()
                    .find(|p| p.id != question.correct_answer.id)
                    .map(|p| p.id.clone())
                    .expect("distractor available")
            };
            engine.answer_question(&selected);
        }
        clock.advance_ms(2_500);

        let session = engine.session();
        let correct_in_history = session.history.iter().filter(|h| h.is_correct).count();
        assert_eq!(session.correct_count, expected);
        assert_eq!(correct_in_history, expected);
        // Ended on the last answer, before the clock moved.
        assert_eq!(engine.final_score(), 2000);
    }

    #[test]
    fn score_rounds_seconds_and_floors_at_zero() {
        let (mut engine, clock) = engine(8);
        engine.setup_quiz(&catalog_of(4), config(QuestionCount::Limit(1)));
        engine.start_quiz();
        clock.advance_ms(2_500);
        let correct = engine.current_question().map(|q| q.correct_answer.id.clone());
        engine.answer_question(&correct.expect("one question"));

        // 2.5s rounds half away from zero to 3s.
        assert_eq!(engine.final_score(), 1000 - 30);

        engine.start_quiz();
        clock.advance_ms(500_000);
        engine.answer_question("not-an-option");
        assert_eq!(engine.final_score(), 0);
    }

    #[test]
    fn restart_keeps_questions_and_clears_progress() {
        let (mut engine, clock) = engine(9);
        engine.setup_quiz(&catalog_of(6), config(QuestionCount::Limit(2)));
        let questions = engine.session().questions.clone();
        engine.start_quiz();
        engine.answer_question("x");
        engine.answer_question("y");
        assert!(engine.is_complete());

        clock.advance_ms(10_000);
        assert!(engine.start_quiz());

        let session = engine.session();
        assert_eq!(session.questions, questions);
        assert!(session.history.is_empty());
        assert_eq!(session.end_ms, 0);
        assert_eq!(session.start_ms, EPOCH_MS + 10_000);
        assert_eq!(engine.state(), QuizState::InProgress);
    }

    #[test]
    fn start_while_in_progress_is_ignored() {
        let (mut engine, _) = engine(10);
        engine.setup_quiz(&catalog_of(6), config(QuestionCount::Limit(3)));
        engine.start_quiz();
        engine.answer_question("x");

        assert!(!engine.start_quiz());
        assert_eq!(engine.session().position, 1);
    }

    #[test]
    fn new_setup_discards_previous_session() {
        let (mut engine, _) = engine(11);
        engine.setup_quiz(&catalog_of(6), config(QuestionCount::Limit(3)));
        engine.start_quiz();
        engine.answer_question("x");

        engine.setup_quiz(&catalog_of(6), config(QuestionCount::Limit(2)));

        let session = engine.session();
        assert_eq!(session.questions.len(), 2);
        assert!(session.history.is_empty());
        assert_eq!(session.start_ms, 0);
        assert_eq!(engine.state(), QuizState::Configured);
    }

    #[test]
    fn empty_catalog_configures_zero_questions() {
        let (mut engine, _) = engine(12);
        engine.setup_quiz(&catalog_of(0), config(QuestionCount::All));

        assert!(engine.session().questions.is_empty());
        assert!(engine.current_question().is_none());
        assert!(engine.start_quiz());
        assert!(engine.answer_question("1").is_none());
        assert!(!engine.session().is_complete());
    }

    #[test]
    fn submission_only_after_completion() {
        let (mut engine, _) = engine(13);
        let config = QuizConfig::new(
            "Player",
            QuizFormat::TitleToComposer,
            Category::composer("Beethoven"),
            QuestionCount::Limit(1),
        )
        .expect("nickname is valid");
        engine.setup_quiz(&catalog_of(5), config);
        engine.start_quiz();
        assert!(engine.score_submission().is_none());

        let correct = engine.current_question().map(|q| q.correct_answer.id.clone());
        engine.answer_question(&correct.expect("one question"));

        let submission = engine.score_submission().expect("quiz is complete");
        assert_eq!(submission.nickname, "Player");
        assert_eq!(submission.score, 1000);
        assert_eq!(submission.region, Category::composer("Beethoven"));
        assert_eq!(submission.format, QuizFormat::TitleToComposer);
    }

    #[test]
    fn regenerating_after_completion_starts_over() {
        let (mut engine, _) = engine(16);
        let catalog = catalog_of(6);
        engine.setup_quiz(&catalog, config(QuestionCount::Limit(3)));
        engine.start_quiz();
        while !engine.is_complete() {
            let correct = engine.current_question().map(|q| q.correct_answer.id.clone());
            engine.answer_question(&correct.expect("question pending until complete"));
        }
        assert_eq!(engine.final_score(), 3000);

        engine.generate_questions(&catalog);

        let session = engine.session();
        assert_eq!(engine.state(), QuizState::Configured);
        assert!(session.correct_count <= session.history.len());
        assert_eq!(session.correct_count, 0);
        assert_eq!(session.position, 0);
        assert_eq!(session.end_ms, 0);
        assert_eq!(session.questions.len(), 3);
        assert_eq!(engine.final_score(), 0);
        assert!(engine.score_submission().is_none());
        assert!(engine.start_quiz());
    }

    #[test]
    fn end_before_start_is_ignored() {
        let (mut engine, _) = engine(17);
        assert!(!engine.end_quiz());
        assert_eq!(engine.state(), QuizState::Unconfigured);

        engine.setup_quiz(&catalog_of(6), config(QuestionCount::Limit(3)));
        assert!(!engine.end_quiz());

        assert_eq!(engine.state(), QuizState::Configured);
        assert_eq!(engine.session().end_ms, 0);
        assert!(!engine.session().is_complete());
        assert!(engine.score_submission().is_none());
    }

    #[test]
    fn last_answer_stamps_end_once() {
        let (mut engine, clock) = engine(18);
        engine.setup_quiz(&catalog_of(6), config(QuestionCount::Limit(1)));
        engine.start_quiz();
        clock.advance_ms(4_000);
        let correct = engine.current_question().map(|q| q.correct_answer.id.clone());
        engine.answer_question(&correct.expect("only question"));
        clock.advance_ms(4_000);

        assert!(!engine.end_quiz());

        assert_eq!(engine.state(), QuizState::Completed);
        assert_eq!(engine.session().end_ms, EPOCH_MS + 4_000);
        assert_eq!(engine.final_score(), 1000 - 40);
    }

    #[test]
    fn reset_returns_to_unconfigured() {
        let (mut engine, _) = engine(14);
        engine.setup_quiz(&catalog_of(6), config(QuestionCount::Limit(3)));
        engine.start_quiz();

        engine.reset();

        assert_eq!(engine.state(), QuizState::Unconfigured);
        assert!(engine.session().questions.is_empty());
        assert_eq!(engine.remaining(), 0);
    }

    #[test]
    fn session_serializes_for_presentation() {
        let (mut engine, _) = engine(15);
        engine.setup_quiz(&catalog_of(4), config(QuestionCount::Limit(1)));

        let json = serde_json::to_value(engine.session()).expect("session should serialize");

        assert_eq!(json["nickname"], "Test");
        assert_eq!(json["format"], "audio-to-title");
        assert_eq!(json["category"], "all");
        assert_eq!(json["requested_count"], "1");
        assert_eq!(json["questions"].as_array().map(Vec::len), Some(1));
    }
}
