use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::engine::achievements::{AchievementEvent, AchievementKind, AchievementRules};
use crate::engine::difficulty::Difficulty;
use crate::engine::hints;
use crate::engine::insights::{self, DifficultyStats, OverallStats};
use crate::engine::question::{DEFAULT_QUESTION_COUNT, Question};
use crate::engine::score_book::ScoreBook;
use crate::engine::table_progress::{TableProgressTracker, TableSummary};
use crate::error::{QuizError, Result};
use crate::session::clock::{Clock, SystemClock};
use crate::session::quiz::{AnswerOutcome, QuizSession, SessionState};
use crate::session::result::ScoreRecord;
use crate::store::KeyValueStore;
use crate::store::schema::{self, ExportData, StatsReport};
use crate::store::share::{ANONYMOUS_PLAYER, SharePayload};

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result of the answer that ended a quiz.
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    pub record: ScoreRecord,
    pub is_high_score: bool,
    pub insight: String,
}

/// Everything the interface shows after one answer.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerFeedback {
    pub outcome: AnswerOutcome,
    pub achievements: Vec<AchievementEvent>,
    /// Praise on a correct answer, a teaching hint on a wrong one.
    pub message: Option<String>,
    pub completion: Option<Completion>,
    /// Set when progress could not be saved. The answer still counts.
    pub save_error: Option<String>,
}

impl AnswerFeedback {
    pub fn is_correct(&self) -> bool {
        self.outcome.is_correct
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub scores: usize,
    pub tables: usize,
    pub achievements: usize,
}

/// Owns the active quiz and all persistent progress, and keeps the store in
/// step with them.
pub struct QuizEngine<S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock>,
    rng: SmallRng,
    rules: AchievementRules,
    question_count: usize,
    session: Option<QuizSession>,
    scores: ScoreBook,
    tables: TableProgressTracker,
    achievements: Vec<AchievementEvent>,
}

impl<S: KeyValueStore> QuizEngine<S> {
    /// Load saved progress from `store`. Unreadable values start fresh.
    pub fn open(mut store: S) -> Result<Self> {
        let stored_version = store.get(schema::APP_VERSION_KEY);
        if stored_version.as_deref() != Some(APP_VERSION) {
            tracing::info!(
                from = stored_version.as_deref().unwrap_or("unknown"),
                to = APP_VERSION,
                "app version changed"
            );
            store.set(schema::APP_VERSION_KEY, APP_VERSION)?;
        }

        let scores = ScoreBook::from_boards(schema::load_scores(&store));
        let tables: TableProgressTracker = schema::load_json(&store, schema::TABLE_PROGRESS_KEY);
        let achievements: Vec<AchievementEvent> =
            schema::load_json(&store, schema::ACHIEVEMENTS_KEY);

        Ok(Self {
            store,
            clock: Box::new(SystemClock),
            rng: SmallRng::from_entropy(),
            rules: AchievementRules::default(),
            question_count: DEFAULT_QUESTION_COUNT,
            session: None,
            scores,
            tables,
            achievements,
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn with_rules(mut self, rules: AchievementRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_question_count(mut self, count: usize) -> Self {
        self.question_count = count;
        self
    }

    /// Length of quizzes started from now on.
    pub fn set_question_count(&mut self, count: usize) {
        self.question_count = count;
    }

    // --- Quiz commands ---

    /// Start a quiz for a difficulty key such as `"easy"`. Any quiz already
    /// running is discarded unscored.
    pub fn start_quiz(&mut self, difficulty_key: &str) -> Result<&QuizSession> {
        let difficulty = Difficulty::from_key(difficulty_key)?;
        self.start(difficulty)
    }

    pub fn start(&mut self, difficulty: Difficulty) -> Result<&QuizSession> {
        if self.quit_session() {
            tracing::debug!("replaced an unfinished quiz");
        }
        let mut session = QuizSession::new(difficulty, self.question_count);
        session.start(&mut self.rng, self.clock.now())?;
        tracing::info!(
            difficulty = difficulty.key(),
            questions = session.len(),
            "quiz started"
        );
        Ok(&*self.session.insert(session))
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn session_state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::NotStarted, QuizSession::state)
    }

    /// The question being asked; reading it starts its response timer.
    pub fn current_question(&mut self) -> Result<&Question> {
        let now = self.clock.now();
        match self.session.as_mut() {
            Some(session) => session.current_question(now),
            None => Err(QuizError::InvalidState {
                action: "read a question",
                state: SessionState::NotStarted,
            }),
        }
    }

    pub fn submit_answer(&mut self, option_index: usize) -> Result<AnswerFeedback> {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            return Err(QuizError::InvalidState {
                action: "submit an answer",
                state: SessionState::NotStarted,
            });
        };
        let difficulty = session.difficulty();
        let outcome = session.submit_answer(option_index, self.rules.fast_answer_millis, now)?;

        self.tables.record_attempt(
            outcome.factor_a,
            outcome.factor_b,
            outcome.is_correct,
            outcome.response_millis,
        );

        let unlocked = self
            .rules
            .evaluate(session.stats(), outcome.is_correct, outcome.response_millis);
        if unlocked.iter().any(|u| u.kind == AchievementKind::Accuracy) {
            session.mark_perfect_awarded();
        }
        let unlocked: Vec<AchievementEvent> = unlocked
            .into_iter()
            .map(|u| u.stamp(difficulty, now))
            .collect();
        for event in &unlocked {
            tracing::info!(title = %event.title, "achievement unlocked");
        }
        self.achievements.extend(unlocked.iter().cloned());

        let message = if outcome.is_correct {
            let name = self.store.get(schema::USER_NAME_KEY);
            Some(hints::encouragement(name.as_deref(), &mut self.rng))
        } else {
            hints::learning_hint(outcome.factor_a, outcome.factor_b, &mut self.rng)
        };

        let completion = outcome.record.clone().map(|record| {
            let is_high_score = self.scores.record_score(difficulty, record.clone());
            tracing::info!(
                difficulty = difficulty.key(),
                percentage = record.percentage,
                elapsed_ms = record.elapsed_millis,
                is_high_score,
                "quiz completed"
            );
            Completion {
                record,
                is_high_score,
                insight: insights::progress_insight(&self.tables.stats()),
            }
        });

        let save_error = self
            .save_progress(difficulty, !unlocked.is_empty(), completion.is_some())
            .err()
            .map(|e| {
                tracing::error!("could not save progress: {e}");
                e.to_string()
            });

        Ok(AnswerFeedback {
            outcome,
            achievements: unlocked,
            message,
            completion,
            save_error,
        })
    }

    fn save_progress(&mut self, difficulty: Difficulty, achievements: bool, scores: bool) -> Result<()> {
        let mut entries = vec![schema::to_entry(schema::TABLE_PROGRESS_KEY, &self.tables)?];
        if achievements {
            entries.push(schema::to_entry(schema::ACHIEVEMENTS_KEY, &self.achievements)?);
        }
        if scores {
            entries.push(schema::to_entry(
                schema::scores_key(difficulty),
                &self.scores.top_scores(difficulty),
            )?);
        }
        self.store.set_many(&entries)?;
        Ok(())
    }

    /// Abandon the running quiz without scoring it. Returns whether there
    /// was one.
    pub fn quit_session(&mut self) -> bool {
        match self.session.take() {
            Some(session) if session.state() == SessionState::InProgress => {
                tracing::info!(
                    difficulty = session.difficulty().key(),
                    answered = session.current_index(),
                    "quiz abandoned"
                );
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Elapsed time of the running (or just finished) quiz.
    pub fn elapsed_millis(&self) -> u64 {
        self.session
            .as_ref()
            .map_or(0, |s| s.elapsed_millis(self.clock.now()))
    }

    // --- Queries ---

    pub fn top_scores(&self, difficulty: Difficulty) -> &[ScoreRecord] {
        self.scores.top_scores(difficulty)
    }

    pub fn tables(&self) -> &TableProgressTracker {
        &self.tables
    }

    pub fn table_stats(&self) -> Vec<TableSummary> {
        self.tables.stats()
    }

    pub fn achievements(&self) -> &[AchievementEvent] {
        &self.achievements
    }

    pub fn recent_achievements(&self) -> Vec<&AchievementEvent> {
        insights::recent_achievements(&self.achievements)
    }

    pub fn overall_stats(&self) -> OverallStats {
        insights::overall_stats(&self.scores, &self.achievements)
    }

    pub fn difficulty_stats(&self) -> Vec<DifficultyStats> {
        insights::difficulty_stats(&self.scores)
    }

    pub fn chart_points(&self) -> Vec<insights::ChartPoint> {
        insights::chart_points(&self.scores)
    }

    pub fn progress_insight(&self) -> String {
        insights::progress_insight(&self.tables.stats())
    }

    pub fn user_name(&self) -> Option<String> {
        self.store.get(schema::USER_NAME_KEY)
    }

    pub fn set_user_name(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QuizError::EmptyName);
        }
        self.store.set(schema::USER_NAME_KEY, name)?;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // --- Backup and sharing ---

    pub fn export_snapshot(&self) -> Result<String> {
        let scores: BTreeMap<Difficulty, Vec<ScoreRecord>> = Difficulty::ALL
            .into_iter()
            .map(|d| (d, self.scores.top_scores(d).to_vec()))
            .collect();
        let data = ExportData {
            version: schema::EXPORT_VERSION.to_string(),
            export_date: Some(self.clock.now()),
            scores,
            table_progress: Some(self.tables.clone().into()),
            achievements: Some(self.achievements.clone()),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Summary statistics as pretty JSON: overall and per-difficulty
    /// figures plus the raw scores, tables and achievements behind them.
    pub fn export_statistics(&self) -> Result<String> {
        let report = StatsReport {
            version: schema::EXPORT_VERSION.to_string(),
            export_date: self.clock.now(),
            overall_stats: (&self.overall_stats()).into(),
            difficulty_stats: self
                .difficulty_stats()
                .iter()
                .map(|d| (d.difficulty, d.into()))
                .collect(),
            table_progress: self.tables.clone().into(),
            achievements: self.achievements.clone(),
            all_scores: Difficulty::ALL
                .into_iter()
                .map(|d| (d, self.scores.top_scores(d).to_vec()))
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    /// Merge a backup into the current progress. The payload is validated
    /// and the merged state saved in one write before anything in memory
    /// changes, so a bad payload leaves everything as it was.
    pub fn import_snapshot(&mut self, payload: &str) -> Result<ImportSummary> {
        let data = ExportData::parse(payload)?;

        let mut scores = self.scores.clone();
        let mut summary = ImportSummary::default();
        for (difficulty, records) in &data.scores {
            scores.merge_import(*difficulty, records);
            summary.scores += records.len();
        }

        let mut tables = self.tables.clone();
        if let Some(progress) = &data.table_progress {
            tables.merge(progress);
            summary.tables = progress.len();
        }

        let mut achievements = self.achievements.clone();
        if let Some(incoming) = &data.achievements {
            achievements.extend(incoming.iter().cloned());
            summary.achievements = incoming.len();
        }

        let mut entries = Vec::with_capacity(Difficulty::ALL.len() + 2);
        for difficulty in Difficulty::ALL {
            entries.push(schema::to_entry(
                schema::scores_key(difficulty),
                &scores.top_scores(difficulty),
            )?);
        }
        entries.push(schema::to_entry(schema::TABLE_PROGRESS_KEY, &tables)?);
        entries.push(schema::to_entry(schema::ACHIEVEMENTS_KEY, &achievements)?);
        self.store.set_many(&entries)?;

        self.scores = scores;
        self.tables = tables;
        self.achievements = achievements;
        tracing::info!(
            version = %data.version,
            scores = summary.scores,
            tables = summary.tables,
            achievements = summary.achievements,
            "imported backup"
        );
        Ok(summary)
    }

    pub fn share_payload(&self) -> SharePayload {
        let overall = self.overall_stats();
        SharePayload {
            user_name: Some(
                self.user_name()
                    .unwrap_or_else(|| ANONYMOUS_PLAYER.to_string()),
            ),
            total_quizzes: overall.total_quizzes as u32,
            avg_score: overall.average_score,
            best_score: overall.best_score,
            mastered_tables: insights::mastered_tables(&self.tables),
            timestamp: self.clock.now().timestamp_millis(),
        }
    }

    pub fn share_url(&self, base_url: &str) -> Result<String> {
        self.share_payload().to_url(base_url)
    }

    // --- Reset ---

    pub fn clear_scores(&mut self) -> Result<()> {
        let keys: Vec<String> = Difficulty::ALL.into_iter().map(schema::scores_key).collect();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.store.remove_many(&keys)?;
        self.scores.clear();
        tracing::info!("cleared all scores");
        Ok(())
    }

    /// Forget scores, progress, achievements and the player's name.
    pub fn clear_all_data(&mut self) -> Result<()> {
        let keys = schema::all_keys();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.store.remove_many(&keys)?;
        self.scores.clear();
        self.tables = TableProgressTracker::default();
        self.achievements.clear();
        tracing::info!("cleared all data");
        Ok(())
    }
}
