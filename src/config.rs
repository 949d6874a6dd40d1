use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::achievements::AchievementRules;
use crate::engine::difficulty::Difficulty;
use crate::engine::question::DEFAULT_QUESTION_COUNT;

pub const MIN_QUESTION_COUNT: usize = 1;
/// The smallest band (four first factors by twelve) cannot supply more.
pub const MAX_QUESTION_COUNT: usize = 48;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    #[serde(default = "default_difficulty")]
    pub default_difficulty: Difficulty,
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,
    #[serde(default)]
    pub achievements: AchievementRules,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_question_count() -> usize {
    DEFAULT_QUESTION_COUNT
}
fn default_difficulty() -> Difficulty {
    Difficulty::Easy
}
fn default_share_base_url() -> String {
    "https://timesquiz.app/".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            question_count: default_question_count(),
            default_difficulty: default_difficulty(),
            share_base_url: default_share_base_url(),
            achievements: AchievementRules::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Clamp values a hand-edited file may have pushed out of range.
    pub fn validate(&mut self) {
        self.question_count = self
            .question_count
            .clamp(MIN_QUESTION_COUNT, MAX_QUESTION_COUNT);
        if url::Url::parse(&self.share_base_url).is_err() {
            self.share_base_url = default_share_base_url();
        }
        let rules = &mut self.achievements;
        rules.streak_milestones.retain(|&m| m > 0);
        rules.streak_milestones.sort_unstable();
        rules.streak_milestones.dedup();
        let defaults = AchievementRules::default();
        if rules.fast_answer_millis == 0 {
            rules.fast_answer_millis = defaults.fast_answer_millis;
        }
        if rules.speed_demon_millis == 0 {
            rules.speed_demon_millis = defaults.speed_demon_millis;
        }
        rules.fast_answers_needed = rules.fast_answers_needed.max(1);
        rules.perfect_min_answers = rules.perfect_min_answers.max(1);
    }

    pub fn question_count_up(&mut self) {
        self.question_count = (self.question_count + 1).min(MAX_QUESTION_COUNT);
    }

    pub fn question_count_down(&mut self) {
        self.question_count = self.question_count.saturating_sub(1).max(MIN_QUESTION_COUNT);
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timesquiz")
}
