use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::difficulty::Difficulty;
use crate::session::quiz::SessionStats;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementKind {
    Streak,
    Speed,
    Accuracy,
}

impl AchievementKind {
    pub fn icon(self) -> &'static str {
        match self {
            AchievementKind::Streak => "\u{1f525}",
            AchievementKind::Speed => "\u{26a1}",
            AchievementKind::Accuracy => "\u{1f3af}",
        }
    }
}

/// One unlocked achievement as stored in the achievement log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AchievementEvent {
    #[serde(rename = "type")]
    pub kind: AchievementKind,
    pub title: String,
    pub message: String,
    #[serde(rename = "date")]
    pub unlocked_at: DateTime<Utc>,
    pub difficulty: Difficulty,
}

impl AchievementEvent {
    /// The count a streak achievement was awarded for, read back from its
    /// message ("10 correct answers in a row!").
    pub fn streak_length(&self) -> Option<u32> {
        if self.kind != AchievementKind::Streak {
            return None;
        }
        self.message
            .split_whitespace()
            .find_map(|word| word.parse().ok())
    }
}

/// Thresholds for unlocking achievements during a quiz.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AchievementRules {
    #[serde(default = "default_streak_milestones")]
    pub streak_milestones: Vec<u32>,
    /// Correct answers quicker than this count towards Speed Demon.
    #[serde(default = "default_fast_answer_millis")]
    pub fast_answer_millis: u64,
    /// The answer that completes the count must also beat this.
    #[serde(default = "default_speed_demon_millis")]
    pub speed_demon_millis: u64,
    #[serde(default = "default_fast_answers_needed")]
    pub fast_answers_needed: u32,
    #[serde(default = "default_perfect_min_answers")]
    pub perfect_min_answers: u32,
}

fn default_streak_milestones() -> Vec<u32> {
    vec![5, 10, 15]
}
fn default_fast_answer_millis() -> u64 {
    3000
}
fn default_speed_demon_millis() -> u64 {
    2000
}
fn default_fast_answers_needed() -> u32 {
    5
}
fn default_perfect_min_answers() -> u32 {
    10
}

impl Default for AchievementRules {
    fn default() -> Self {
        Self {
            streak_milestones: default_streak_milestones(),
            fast_answer_millis: default_fast_answer_millis(),
            speed_demon_millis: default_speed_demon_millis(),
            fast_answers_needed: default_fast_answers_needed(),
            perfect_min_answers: default_perfect_min_answers(),
        }
    }
}

const STREAK_TITLES: [&str; 3] = ["Hot Streak!", "Amazing Streak!", "Incredible!"];

/// An achievement before it is stamped with a date and difficulty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unlock {
    pub kind: AchievementKind,
    pub title: String,
    pub message: String,
}

impl Unlock {
    pub fn stamp(self, difficulty: Difficulty, at: DateTime<Utc>) -> AchievementEvent {
        AchievementEvent {
            kind: self.kind,
            title: self.title,
            message: self.message,
            unlocked_at: at,
            difficulty,
        }
    }
}

impl AchievementRules {
    /// Achievements earned by the answer that produced `stats`.
    pub fn evaluate(&self, stats: &SessionStats, correct: bool, response_millis: u64) -> Vec<Unlock> {
        let mut unlocked = Vec::new();

        if let Some(rank) = self
            .streak_milestones
            .iter()
            .position(|&m| m > 0 && m == stats.current_streak)
        {
            let title = STREAK_TITLES[rank.min(STREAK_TITLES.len() - 1)];
            unlocked.push(Unlock {
                kind: AchievementKind::Streak,
                title: title.to_string(),
                message: format!("{} correct answers in a row!", stats.current_streak),
            });
        }

        if correct
            && response_millis < self.speed_demon_millis
            && stats.fast_answers == self.fast_answers_needed
        {
            unlocked.push(Unlock {
                kind: AchievementKind::Speed,
                title: "Speed Demon!".to_string(),
                message: format!(
                    "{} answers under {} seconds each!",
                    self.fast_answers_needed,
                    self.speed_demon_millis as f64 / 1000.0
                ),
            });
        }

        if !stats.perfect_awarded
            && stats.total >= self.perfect_min_answers
            && stats.correct == stats.total
        {
            unlocked.push(Unlock {
                kind: AchievementKind::Accuracy,
                title: "Perfect Score!".to_string(),
                message: "All answers correct!".to_string(),
            });
        }

        unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stats(correct: u32, total: u32, streak: u32, fast: u32) -> SessionStats {
        SessionStats {
            correct,
            total,
            fast_answers: fast,
            current_streak: streak,
            best_streak: streak,
            perfect_awarded: false,
        }
    }

    #[test]
    fn test_streak_milestones() {
        let rules = AchievementRules::default();
        let got = rules.evaluate(&stats(5, 6, 5, 0), true, 4000);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].kind, AchievementKind::Streak);
        assert_eq!(got[0].title, "Hot Streak!");
        assert_eq!(got[0].message, "5 correct answers in a row!");

        let got = rules.evaluate(&stats(10, 11, 10, 0), true, 4000);
        assert_eq!(got[0].title, "Amazing Streak!");

        assert!(rules.evaluate(&stats(6, 7, 6, 0), true, 4000).is_empty());
    }

    #[test]
    fn test_speed_fires_on_exact_count() {
        let rules = AchievementRules::default();
        let got = rules.evaluate(&stats(5, 7, 1, 5), true, 1500);
        assert!(got.iter().any(|u| u.kind == AchievementKind::Speed));
        assert!(
            !rules
                .evaluate(&stats(6, 8, 2, 6), true, 1500)
                .iter()
                .any(|u| u.kind == AchievementKind::Speed)
        );
        // slow answer does not count even at the right tally
        assert!(
            !rules
                .evaluate(&stats(5, 7, 1, 5), true, 2500)
                .iter()
                .any(|u| u.kind == AchievementKind::Speed)
        );
    }

    #[test]
    fn test_perfect_needs_minimum_answers() {
        let rules = AchievementRules::default();
        let got = rules.evaluate(&stats(9, 9, 9, 0), true, 4000);
        assert!(got.iter().all(|u| u.kind != AchievementKind::Accuracy));
        let got = rules.evaluate(&stats(10, 10, 10, 0), true, 4000);
        assert!(got.iter().any(|u| u.kind == AchievementKind::Accuracy));
    }

    #[test]
    fn test_perfect_only_once_per_session() {
        let rules = AchievementRules::default();
        let mut s = stats(11, 11, 11, 0);
        s.perfect_awarded = true;
        assert!(rules.evaluate(&s, true, 4000).is_empty());
    }

    #[test]
    fn test_custom_thresholds() {
        let rules = AchievementRules {
            streak_milestones: vec![3],
            fast_answer_millis: 1500,
            speed_demon_millis: 1000,
            fast_answers_needed: 2,
            perfect_min_answers: 4,
        };
        let got = rules.evaluate(&stats(3, 3, 3, 2), true, 900);
        let kinds: Vec<AchievementKind> = got.iter().map(|u| u.kind).collect();
        assert_eq!(kinds, vec![AchievementKind::Streak, AchievementKind::Speed]);
        assert_eq!(got[1].message, "2 answers under 1 seconds each!");
    }

    #[test]
    fn test_streak_length_parsed_from_message() {
        let at = Utc.timestamp_millis_opt(0).unwrap();
        let event = Unlock {
            kind: AchievementKind::Streak,
            title: "Incredible!".into(),
            message: "15 correct answers in a row!".into(),
        }
        .stamp(Difficulty::Hard, at);
        assert_eq!(event.streak_length(), Some(15));

        let speed = Unlock {
            kind: AchievementKind::Speed,
            title: "Speed Demon!".into(),
            message: "5 answers under 2 seconds each!".into(),
        }
        .stamp(Difficulty::Hard, at);
        assert_eq!(speed.streak_length(), None);
    }

    #[test]
    fn test_stored_shape() {
        let json = r#"{"type":"streak","title":"Hot Streak! 🔥","message":"5 correct answers in a row!","date":"2024-05-01T12:00:00.000Z","difficulty":"easy"}"#;
        let event: AchievementEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, AchievementKind::Streak);
        assert_eq!(event.difficulty, Difficulty::Easy);
        assert_eq!(event.streak_length(), Some(5));
    }
}
