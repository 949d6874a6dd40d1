use std::fmt;

use chrono::{DateTime, Utc};

use crate::engine::difficulty::Difficulty;
use crate::engine::question::{OPTION_COUNT, Question, QuestionSetBuilder};
use crate::engine::rng::NumberSource;
use crate::error::{QuizError, Result};
use crate::session::result::ScoreRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::NotStarted => "not started",
            SessionState::InProgress => "in progress",
            SessionState::Completed => "completed",
        })
    }
}

/// Running tallies used for achievements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub correct: u32,
    pub total: u32,
    pub fast_answers: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub perfect_awarded: bool,
}

impl SessionStats {
    fn record(&mut self, correct: bool, fast: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
            self.current_streak += 1;
            self.best_streak = self.best_streak.max(self.current_streak);
            if fast {
                self.fast_answers += 1;
            }
        } else {
            self.current_streak = 0;
        }
    }
}

/// What the caller needs to give feedback on one answer.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub chosen: u32,
    pub correct_product: u32,
    pub factor_a: u32,
    pub factor_b: u32,
    pub response_millis: u64,
    /// Present when this answer finished the quiz.
    pub record: Option<ScoreRecord>,
}

/// One run through a question set.
pub struct QuizSession {
    difficulty: Difficulty,
    count: usize,
    questions: Vec<Question>,
    current: usize,
    score: u32,
    state: SessionState,
    stats: SessionStats,
    started_at: Option<DateTime<Utc>>,
    question_shown_at: Option<DateTime<Utc>>,
    last_advanced_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

fn millis_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    (end - start).num_milliseconds().max(0) as u64
}

impl QuizSession {
    pub fn new(difficulty: Difficulty, count: usize) -> Self {
        Self {
            difficulty,
            count,
            questions: Vec::new(),
            current: 0,
            score: 0,
            state: SessionState::NotStarted,
            stats: SessionStats::default(),
            started_at: None,
            question_shown_at: None,
            last_advanced_at: None,
            finished_at: None,
        }
    }

    /// Generate the question set and begin timing.
    pub fn start(&mut self, source: &mut impl NumberSource, now: DateTime<Utc>) -> Result<()> {
        if self.state != SessionState::NotStarted {
            return Err(QuizError::InvalidState {
                action: "start",
                state: self.state,
            });
        }
        let questions = QuestionSetBuilder::new(self.difficulty.band())
            .count(self.count)
            .build(source)?;
        self.begin(questions, now);
        Ok(())
    }

    fn begin(&mut self, questions: Vec<Question>, now: DateTime<Utc>) {
        self.count = questions.len();
        self.questions = questions;
        self.current = 0;
        self.score = 0;
        self.stats = SessionStats::default();
        self.started_at = Some(now);
        self.last_advanced_at = Some(now);
        self.question_shown_at = None;
        self.finished_at = None;
        self.state = if self.questions.is_empty() {
            SessionState::Completed
        } else {
            SessionState::InProgress
        };
    }

    fn require_in_progress(&self, action: &'static str) -> Result<()> {
        if self.state == SessionState::InProgress {
            Ok(())
        } else {
            Err(QuizError::InvalidState {
                action,
                state: self.state,
            })
        }
    }

    /// The question being asked. The first read after advancing starts that
    /// question's response timer.
    pub fn current_question(&mut self, now: DateTime<Utc>) -> Result<&Question> {
        self.require_in_progress("read a question")?;
        if self.question_shown_at.is_none() {
            self.question_shown_at = Some(now);
        }
        Ok(&self.questions[self.current])
    }

    /// Look at the current question without touching the timer.
    pub fn peek_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::InProgress => self.questions.get(self.current),
            _ => None,
        }
    }

    pub fn submit_answer(
        &mut self,
        option_index: usize,
        fast_answer_millis: u64,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome> {
        self.require_in_progress("submit an answer")?;
        if option_index >= OPTION_COUNT {
            return Err(QuizError::InvalidOptionIndex(option_index));
        }

        let question = &self.questions[self.current];
        let is_correct = question.is_correct(option_index);
        let asked_at = self
            .question_shown_at
            .or(self.last_advanced_at)
            .unwrap_or(now);
        let response_millis = millis_between(asked_at, now);

        let mut outcome = AnswerOutcome {
            is_correct,
            chosen: question.options[option_index],
            correct_product: question.product,
            factor_a: question.factor_a,
            factor_b: question.factor_b,
            response_millis,
            record: None,
        };

        if is_correct {
            self.score += 1;
        }
        self.stats
            .record(is_correct, response_millis < fast_answer_millis);

        self.current += 1;
        self.question_shown_at = None;
        self.last_advanced_at = Some(now);

        if self.current == self.questions.len() {
            self.finished_at = Some(now);
            self.state = SessionState::Completed;
            outcome.record = Some(ScoreRecord::new(
                self.score,
                self.questions.len() as u32,
                self.elapsed_millis(now),
                now,
            ));
        }

        Ok(outcome)
    }

    pub fn mark_perfect_awarded(&mut self) {
        self.stats.perfect_awarded = true;
    }

    /// Time since the start, frozen once the quiz is complete.
    pub fn elapsed_millis(&self, now: DateTime<Utc>) -> u64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => millis_between(start, end),
            (Some(start), None) => millis_between(start, now),
            _ => 0,
        }
    }

    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        self.current as f64 / self.questions.len() as f64
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Completed
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}
