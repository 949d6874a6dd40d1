use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;

use timesquiz::config::Config;
use timesquiz::engine::achievements::AchievementEvent;
use timesquiz::engine::difficulty::Difficulty;
use timesquiz::engine::question::{OPTION_COUNT, Question};
use timesquiz::engine::quiz_engine::{AnswerFeedback, Completion, QuizEngine};
use timesquiz::store::json_store::{JsonFileStore, default_data_dir};
use timesquiz::store::{KeyValueStore, MemoryStore};

use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::components::stats_dashboard::TAB_COUNT;
use crate::ui::line_input::{InputResult, LineInput};
use crate::ui::theme::Theme;

/// Correct answers move on by themselves after this long. Wrong answers
/// wait for a key so the hint can be read.
pub const CORRECT_FEEDBACK_DELAY: Duration = Duration::from_millis(1000);

const NAME_MAX_CHARS: usize = 30;

pub const SETTINGS_FIELDS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    NamePrompt,
    Menu,
    Quiz,
    QuizResult,
    HighScores,
    Stats,
    Settings,
    Share,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearTarget {
    Scores,
    Everything,
}

pub type Engine = QuizEngine<Box<dyn KeyValueStore>>;

pub struct App {
    pub screen: AppScreen,
    pub engine: Engine,
    pub config: Config,
    pub theme: &'static Theme,
    pub menu: Menu<'static>,
    pub difficulty: Difficulty,
    /// The question on screen. Kept apart from the session because the
    /// session moves past it as soon as it is answered.
    pub question: Option<Question>,
    pub selected_option: usize,
    pub feedback: Option<AnswerFeedback>,
    feedback_at: Option<Instant>,
    pub session_achievements: Vec<AchievementEvent>,
    pub last_completion: Option<Completion>,
    pub score_tab: Difficulty,
    pub stats_tab: usize,
    pub settings_selected: usize,
    pub confirm_clear: Option<ClearTarget>,
    pub name_input: LineInput,
    pub share_url: Option<String>,
    pub share_text: Option<String>,
    pub status: Option<String>,
    pub should_quit: bool,
}

/// The file store under `data_dir`, or memory only when that cannot be
/// opened so the quiz still runs.
pub fn open_store(data_dir: Option<PathBuf>) -> Box<dyn KeyValueStore> {
    let dir = data_dir.unwrap_or_else(default_data_dir);
    match JsonFileStore::with_base_dir(dir.clone()) {
        Ok(store) => {
            store.recover_interrupted_write();
            Box::new(store)
        }
        Err(e) => {
            tracing::warn!(path = %dir.display(), "cannot open data store, progress will not be saved: {e}");
            Box::new(MemoryStore::new())
        }
    }
}

impl App {
    pub fn new(config: Config, store: Box<dyn KeyValueStore>) -> Result<Self> {
        let engine = QuizEngine::open(store)?
            .with_rules(config.achievements.clone())
            .with_question_count(config.question_count);
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        Ok(Self::with_engine(engine, config, theme))
    }

    pub fn with_engine(engine: Engine, config: Config, theme: &'static Theme) -> Self {
        let mut menu = Menu::new(theme);
        if let Some(idx) = menu
            .items
            .iter()
            .position(|i| i.action == MenuAction::Start(config.default_difficulty))
        {
            menu.selected = idx;
        }
        let user_name = engine.user_name();
        let screen = if user_name.is_some() {
            AppScreen::Menu
        } else {
            AppScreen::NamePrompt
        };

        let mut app = Self {
            screen,
            engine,
            difficulty: config.default_difficulty,
            score_tab: config.default_difficulty,
            config,
            theme,
            menu,
            question: None,
            selected_option: 0,
            feedback: None,
            feedback_at: None,
            session_achievements: Vec::new(),
            last_completion: None,
            stats_tab: 0,
            settings_selected: 0,
            confirm_clear: None,
            name_input: LineInput::new(user_name.as_deref().unwrap_or(""), NAME_MAX_CHARS),
            share_url: None,
            share_text: None,
            status: None,
            should_quit: false,
        };
        app.refresh_greeting();
        app
    }

    fn refresh_greeting(&mut self) {
        self.menu.greeting = self.engine.user_name().map(|n| format!("Welcome back, {n}!"));
    }

    fn set_theme(&mut self, name: &str) {
        if let Some(new_theme) = Theme::load(name) {
            let theme: &'static Theme = Box::leak(Box::new(new_theme));
            self.theme = theme;
            self.menu.theme = theme;
        }
    }

    pub fn apply_theme(&mut self, name: &str) {
        self.config.theme = name.to_string();
        self.set_theme(name);
    }

    // --- Navigation ---

    pub fn go_to_menu(&mut self) {
        self.screen = AppScreen::Menu;
        self.question = None;
        self.feedback = None;
        self.feedback_at = None;
        self.confirm_clear = None;
    }

    pub fn go_to_name_prompt(&mut self) {
        self.name_input = LineInput::new(
            self.engine.user_name().as_deref().unwrap_or(""),
            NAME_MAX_CHARS,
        );
        self.status = None;
        self.screen = AppScreen::NamePrompt;
    }

    pub fn go_to_high_scores(&mut self) {
        self.score_tab = self.difficulty;
        self.screen = AppScreen::HighScores;
    }

    pub fn go_to_stats(&mut self) {
        self.stats_tab = 0;
        self.screen = AppScreen::Stats;
    }

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.confirm_clear = None;
        self.screen = AppScreen::Settings;
    }

    pub fn go_to_share(&mut self) {
        match self.engine.share_url(&self.config.share_base_url) {
            Ok(url) => {
                self.share_url = Some(url);
                self.share_text = Some(self.engine.share_payload().challenge_text());
            }
            Err(e) => {
                self.share_url = None;
                self.share_text = None;
                self.status = Some(e.to_string());
            }
        }
        self.screen = AppScreen::Share;
    }

    pub fn run_menu_action(&mut self, action: MenuAction) {
        self.status = None;
        match action {
            MenuAction::Start(difficulty) => self.start_quiz(difficulty),
            MenuAction::HighScores => self.go_to_high_scores(),
            MenuAction::Statistics => self.go_to_stats(),
            MenuAction::Share => self.go_to_share(),
            MenuAction::Settings => self.go_to_settings(),
        }
    }

    pub fn next_stats_tab(&mut self) {
        self.stats_tab = (self.stats_tab + 1) % TAB_COUNT;
    }

    pub fn prev_stats_tab(&mut self) {
        self.stats_tab = (self.stats_tab + TAB_COUNT - 1) % TAB_COUNT;
    }

    // --- Name prompt ---

    pub fn handle_name_key(&mut self, key: crossterm::event::KeyEvent) {
        match self.name_input.handle(key) {
            InputResult::Continue => {}
            InputResult::Cancel => self.go_to_menu(),
            InputResult::Submit => match self.engine.set_user_name(self.name_input.value()) {
                Ok(()) => {
                    self.status = None;
                    self.refresh_greeting();
                    self.go_to_menu();
                }
                Err(e) => self.status = Some(e.to_string()),
            },
        }
    }

    // --- Quiz ---

    pub fn start_quiz(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.feedback = None;
        self.feedback_at = None;
        self.session_achievements.clear();
        self.last_completion = None;
        self.selected_option = 0;
        if let Err(e) = self.engine.start(difficulty) {
            self.status = Some(e.to_string());
            self.screen = AppScreen::Menu;
            return;
        }
        self.screen = AppScreen::Quiz;
        self.load_question();
    }

    pub fn retry_quiz(&mut self) {
        self.start_quiz(self.difficulty);
    }

    fn load_question(&mut self) {
        match self.engine.current_question() {
            Ok(q) => self.question = Some(q.clone()),
            Err(e) => {
                tracing::error!("no question to show: {e}");
                self.status = Some(e.to_string());
                self.go_to_menu();
            }
        }
    }

    /// Move the highlight around the 2x2 option grid.
    pub fn move_selection(&mut self, dx: isize, dy: isize) {
        if self.feedback.is_some() {
            return;
        }
        let col = (self.selected_option % 2) as isize;
        let row = (self.selected_option / 2) as isize;
        let col = (col + dx).clamp(0, 1);
        let row = (row + dy).clamp(0, (OPTION_COUNT / 2) as isize - 1);
        self.selected_option = (row * 2 + col) as usize;
    }

    pub fn answer(&mut self, option_index: usize) {
        if self.feedback.is_some() {
            return;
        }
        match self.engine.submit_answer(option_index) {
            Ok(feedback) => {
                self.session_achievements
                    .extend(feedback.achievements.iter().cloned());
                if let Some(completion) = &feedback.completion {
                    self.last_completion = Some(completion.clone());
                }
                self.feedback = Some(feedback);
                self.feedback_at = Some(Instant::now());
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub fn answer_selected(&mut self) {
        self.answer(self.selected_option);
    }

    /// Leave the feedback for the last answer: on to the next question,
    /// or to the results once the quiz is over.
    pub fn dismiss_feedback(&mut self) {
        let Some(feedback) = self.feedback.take() else {
            return;
        };
        self.feedback_at = None;
        self.selected_option = 0;
        if feedback.completion.is_some() {
            self.question = None;
            self.screen = AppScreen::QuizResult;
        } else {
            self.load_question();
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        let due = match (&self.feedback, self.feedback_at) {
            (Some(fb), Some(at)) => fb.is_correct() && now.duration_since(at) >= CORRECT_FEEDBACK_DELAY,
            _ => false,
        };
        if due {
            self.dismiss_feedback();
        }
    }

    pub fn quit_quiz(&mut self) {
        self.engine.quit_session();
        self.go_to_menu();
    }

    // --- Settings ---

    pub fn settings_cycle_forward(&mut self) {
        self.settings_cycle(true);
    }

    pub fn settings_cycle_backward(&mut self) {
        self.settings_cycle(false);
    }

    fn settings_cycle(&mut self, forward: bool) {
        match self.settings_selected {
            0 => {
                let themes = Theme::available_themes();
                if themes.is_empty() {
                    return;
                }
                let next = match themes.iter().position(|t| *t == self.config.theme) {
                    Some(idx) if forward => (idx + 1) % themes.len(),
                    Some(idx) => (idx + themes.len() - 1) % themes.len(),
                    None => 0,
                };
                let name = themes[next].clone();
                self.apply_theme(&name);
            }
            1 => {
                if forward {
                    self.config.question_count_up();
                } else {
                    self.config.question_count_down();
                }
                self.sync_question_count();
            }
            2 => {
                self.config.default_difficulty = if forward {
                    self.config.default_difficulty.next()
                } else {
                    self.config.default_difficulty.prev()
                };
            }
            3 => {
                if forward {
                    self.go_to_name_prompt();
                }
            }
            4 if forward => self.confirm_clear = Some(ClearTarget::Scores),
            5 if forward => self.confirm_clear = Some(ClearTarget::Everything),
            _ => {}
        }
    }

    fn sync_question_count(&mut self) {
        self.engine.set_question_count(self.config.question_count);
    }

    pub fn save_settings(&mut self) {
        if let Err(e) = self.config.save() {
            tracing::warn!("could not save config: {e}");
            self.status = Some(format!("Settings not saved: {e}"));
        }
    }

    pub fn confirm_clear_yes(&mut self) {
        let Some(target) = self.confirm_clear.take() else {
            return;
        };
        let result = match target {
            ClearTarget::Scores => self.engine.clear_scores(),
            ClearTarget::Everything => self.engine.clear_all_data(),
        };
        match result {
            Ok(()) => {
                self.last_completion = None;
                self.status = Some(match target {
                    ClearTarget::Scores => "All scores cleared.".to_string(),
                    ClearTarget::Everything => "All data cleared.".to_string(),
                });
                self.refresh_greeting();
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app(name: Option<&str>) -> App {
        let mut store = MemoryStore::new();
        if let Some(name) = name {
            store.set("quiz_user_name", name).unwrap();
        }
        let store: Box<dyn KeyValueStore> = Box::new(store);
        let engine = QuizEngine::open(store).unwrap().with_seed(11);
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        App::with_engine(engine, Config::default(), theme)
    }

    fn correct_index(app: &App) -> usize {
        app.question.as_ref().unwrap().correct_index
    }

    #[test]
    fn test_first_run_asks_for_name() {
        let mut app = test_app(None);
        assert_eq!(app.screen, AppScreen::NamePrompt);

        app.handle_name_key(crossterm::event::KeyEvent::from(crossterm::event::KeyCode::Enter));
        assert_eq!(app.screen, AppScreen::NamePrompt);
        assert!(app.status.is_some());

        for ch in "Ada".chars() {
            app.handle_name_key(crossterm::event::KeyEvent::from(
                crossterm::event::KeyCode::Char(ch),
            ));
        }
        app.handle_name_key(crossterm::event::KeyEvent::from(crossterm::event::KeyCode::Enter));
        assert_eq!(app.screen, AppScreen::Menu);
        assert_eq!(app.menu.greeting.as_deref(), Some("Welcome back, Ada!"));
    }

    #[test]
    fn test_full_quiz_reaches_results() {
        let mut app = test_app(Some("Ada"));
        app.start_quiz(Difficulty::Medium);
        assert_eq!(app.screen, AppScreen::Quiz);

        for _ in 0..20 {
            let idx = correct_index(&app);
            app.answer(idx);
            assert!(app.feedback.as_ref().unwrap().is_correct());
            app.dismiss_feedback();
        }

        assert_eq!(app.screen, AppScreen::QuizResult);
        let completion = app.last_completion.as_ref().unwrap();
        assert_eq!(completion.record.percentage, 100);
        assert!(completion.is_high_score);
        assert!(!app.session_achievements.is_empty());
    }

    #[test]
    fn test_wrong_answer_waits_for_key() {
        let mut app = test_app(Some("Ada"));
        app.start_quiz(Difficulty::Easy);
        let wrong = (correct_index(&app) + 1) % OPTION_COUNT;
        app.answer(wrong);

        let later = Instant::now() + Duration::from_secs(10);
        app.tick_at(later);
        assert!(app.feedback.is_some());

        app.dismiss_feedback();
        assert!(app.feedback.is_none());
        assert_eq!(app.engine.session().unwrap().current_index(), 1);
    }

    #[test]
    fn test_correct_answer_auto_advances() {
        let mut app = test_app(Some("Ada"));
        app.start_quiz(Difficulty::Easy);
        let first = app.question.clone();
        app.answer(correct_index(&app));

        app.tick_at(Instant::now() + CORRECT_FEEDBACK_DELAY * 2);
        assert!(app.feedback.is_none());
        assert_ne!(app.question, first);
    }

    #[test]
    fn test_second_answer_ignored_while_feedback_shown() {
        let mut app = test_app(Some("Ada"));
        app.start_quiz(Difficulty::Easy);
        app.answer(correct_index(&app));
        app.answer(0);
        assert_eq!(app.engine.session().unwrap().current_index(), 1);
    }

    #[test]
    fn test_selection_stays_in_grid() {
        let mut app = test_app(Some("Ada"));
        app.start_quiz(Difficulty::Easy);
        app.move_selection(-1, -1);
        assert_eq!(app.selected_option, 0);
        app.move_selection(1, 1);
        assert_eq!(app.selected_option, 3);
        app.move_selection(1, 1);
        assert_eq!(app.selected_option, 3);
    }

    #[test]
    fn test_quit_quiz_discards_session() {
        let mut app = test_app(Some("Ada"));
        app.start_quiz(Difficulty::Hard);
        app.answer(correct_index(&app));
        app.quit_quiz();
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(app.engine.session().is_none());
        assert!(app.engine.top_scores(Difficulty::Hard).is_empty());
    }

    #[test]
    fn test_question_count_setting_applies_to_next_quiz() {
        let mut app = test_app(Some("Ada"));
        app.settings_selected = 1;
        for _ in 0..15 {
            app.settings_cycle_backward();
        }
        assert_eq!(app.config.question_count, 5);
        app.start_quiz(Difficulty::Easy);
        assert_eq!(app.engine.session().unwrap().len(), 5);
    }

    #[test]
    fn test_clear_everything_needs_confirmation() {
        let mut app = test_app(Some("Ada"));
        app.settings_selected = 5;
        app.settings_cycle_forward();
        assert_eq!(app.confirm_clear, Some(ClearTarget::Everything));
        assert!(app.engine.user_name().is_some());

        app.confirm_clear_yes();
        assert!(app.confirm_clear.is_none());
        assert!(app.engine.user_name().is_none());
        assert!(app.menu.greeting.is_none());
    }

    #[test]
    fn test_share_screen_has_link() {
        let mut app = test_app(Some("Ada"));
        app.go_to_share();
        assert_eq!(app.screen, AppScreen::Share);
        let url = app.share_url.as_deref().unwrap();
        assert!(url.starts_with("https://timesquiz.app/?share="));
        assert!(app.share_text.as_deref().unwrap().contains("Ada"));
    }
}
