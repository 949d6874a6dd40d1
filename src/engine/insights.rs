use chrono::{DateTime, Utc};

use crate::engine::achievements::AchievementEvent;
use crate::engine::difficulty::Difficulty;
use crate::engine::score_book::ScoreBook;
use crate::engine::table_progress::{TableProgressTracker, TableSummary};

/// Scores plotted on the statistics chart.
pub const CHART_WINDOW: usize = 20;
/// Achievements listed on the statistics screen.
pub const RECENT_ACHIEVEMENTS: usize = 10;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverallStats {
    pub total_quizzes: usize,
    pub average_score: u32,
    pub best_score: u32,
    pub best_streak: u32,
    pub total_minutes: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DifficultyStats {
    pub difficulty: Difficulty,
    pub average_score: u32,
    pub average_secs: u64,
    pub best_score: u32,
    pub plays: usize,
}

/// One point on the score chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartPoint {
    pub difficulty: Difficulty,
    pub percentage: u32,
    pub completed_at: DateTime<Utc>,
}

fn rounded_mean(sum: u64, count: usize) -> u64 {
    if count == 0 {
        return 0;
    }
    let count = count as u64;
    (2 * sum + count) / (2 * count)
}

pub fn overall_stats(book: &ScoreBook, achievements: &[AchievementEvent]) -> OverallStats {
    let records: Vec<_> = book.all_records().collect();
    let sum: u64 = records.iter().map(|r| u64::from(r.percentage)).sum();
    let play_millis: u64 = records.iter().map(|r| r.elapsed_millis).sum();
    OverallStats {
        total_quizzes: records.len(),
        average_score: rounded_mean(sum, records.len()) as u32,
        best_score: records.iter().map(|r| r.percentage).max().unwrap_or(0),
        best_streak: achievements
            .iter()
            .filter_map(AchievementEvent::streak_length)
            .max()
            .unwrap_or(0),
        total_minutes: (play_millis + 30_000) / 60_000,
    }
}

/// Stats for every difficulty that has at least one stored score.
pub fn difficulty_stats(book: &ScoreBook) -> Vec<DifficultyStats> {
    Difficulty::ALL
        .into_iter()
        .filter_map(|difficulty| {
            let scores = book.top_scores(difficulty);
            if scores.is_empty() {
                return None;
            }
            let pct_sum: u64 = scores.iter().map(|s| u64::from(s.percentage)).sum();
            let time_sum: u64 = scores.iter().map(|s| s.elapsed_millis).sum();
            Some(DifficultyStats {
                difficulty,
                average_score: rounded_mean(pct_sum, scores.len()) as u32,
                average_secs: (rounded_mean(time_sum, scores.len()) + 500) / 1000,
                best_score: scores.iter().map(|s| s.percentage).max().unwrap_or(0),
                plays: scores.len(),
            })
        })
        .collect()
}

/// The most recent stored scores across all difficulties, oldest first.
pub fn chart_points(book: &ScoreBook) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = Difficulty::ALL
        .into_iter()
        .flat_map(|difficulty| {
            book.top_scores(difficulty).iter().map(move |s| ChartPoint {
                difficulty,
                percentage: s.percentage,
                completed_at: s.completed_at,
            })
        })
        .collect();
    points.sort_by_key(|p| p.completed_at);
    let skip = points.len().saturating_sub(CHART_WINDOW);
    points.split_off(skip)
}

/// Newest first.
pub fn recent_achievements(achievements: &[AchievementEvent]) -> Vec<&AchievementEvent> {
    let mut recent: Vec<&AchievementEvent> = achievements.iter().collect();
    recent.sort_by(|a, b| b.unlocked_at.cmp(&a.unlocked_at));
    recent.truncate(RECENT_ACHIEVEMENTS);
    recent
}

/// Short encouragement built from the table summaries.
pub fn progress_insight(stats: &[TableSummary]) -> String {
    if stats.is_empty() {
        return "Keep practicing to see your progress! \u{1f4aa}".to_string();
    }
    let join = |tables: Vec<u32>| {
        tables
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mastered: Vec<u32> = stats.iter().filter(|s| s.mastered).map(|s| s.table).collect();
    let focus: Vec<u32> = stats
        .iter()
        .filter(|s| s.needs_practice)
        .map(|s| s.table)
        .collect();

    let mut lines = Vec::new();
    if !mastered.is_empty() {
        lines.push(format!("\u{1f31f} Mastered tables: {}", join(mastered)));
    }
    if !focus.is_empty() {
        lines.push(format!("\u{1f3af} Focus on tables: {}", join(focus)));
    } else if !lines.is_empty() {
        lines.push("\u{1f386} Great job! Keep up the excellent work!".to_string());
    }
    lines.join("\n")
}

pub fn mastered_tables(tracker: &TableProgressTracker) -> u32 {
    tracker.mastered_count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::achievements::AchievementKind;
    use crate::session::result::ScoreRecord;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn streak(n: u32, day: u32) -> AchievementEvent {
        AchievementEvent {
            kind: AchievementKind::Streak,
            title: "Hot Streak!".to_string(),
            message: format!("{n} correct answers in a row!"),
            unlocked_at: at(day),
            difficulty: Difficulty::Easy,
        }
    }

    #[test]
    fn test_overall_stats_empty() {
        assert_eq!(overall_stats(&ScoreBook::default(), &[]), OverallStats::default());
    }

    #[test]
    fn test_overall_stats() {
        let mut book = ScoreBook::default();
        book.record_score(Difficulty::Easy, ScoreRecord::new(20, 20, 60_000, at(1)));
        book.record_score(Difficulty::Hard, ScoreRecord::new(15, 20, 90_000, at(2)));
        book.record_score(Difficulty::Hard, ScoreRecord::new(16, 20, 30_000, at(3)));
        let stats = overall_stats(&book, &[streak(5, 1), streak(15, 2), streak(10, 3)]);
        assert_eq!(stats.total_quizzes, 3);
        // (100 + 75 + 80) / 3 = 85
        assert_eq!(stats.average_score, 85);
        assert_eq!(stats.best_score, 100);
        assert_eq!(stats.best_streak, 15);
        assert_eq!(stats.total_minutes, 3);
    }

    #[test]
    fn test_difficulty_stats_skips_unplayed() {
        let mut book = ScoreBook::default();
        book.record_score(Difficulty::Medium, ScoreRecord::new(18, 20, 41_000, at(1)));
        book.record_score(Difficulty::Medium, ScoreRecord::new(19, 20, 50_000, at(2)));
        let stats = difficulty_stats(&book);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].difficulty, Difficulty::Medium);
        assert_eq!(stats[0].average_score, 93);
        assert_eq!(stats[0].average_secs, 46);
        assert_eq!(stats[0].best_score, 95);
        assert_eq!(stats[0].plays, 2);
    }

    #[test]
    fn test_chart_points_are_chronological_and_capped() {
        let mut book = ScoreBook::default();
        for day in 1..=25 {
            let difficulty = Difficulty::ALL[(day % 3) as usize];
            book.merge_import(difficulty, &[ScoreRecord::new(day % 20, 20, 1000, at(day))]);
        }
        let points = chart_points(&book);
        assert!(points.len() <= CHART_WINDOW);
        assert!(points.windows(2).all(|w| w[0].completed_at <= w[1].completed_at));
        assert_eq!(points.last().unwrap().completed_at, at(25));
    }

    #[test]
    fn test_recent_achievements_newest_first() {
        let events: Vec<_> = (1..=12).map(|d| streak(5, d)).collect();
        let recent = recent_achievements(&events);
        assert_eq!(recent.len(), RECENT_ACHIEVEMENTS);
        assert_eq!(recent[0].unlocked_at, at(12));
    }

    fn summary(table: u32, mastered: bool, needs_practice: bool) -> TableSummary {
        TableSummary {
            table,
            accuracy: 0,
            avg_time_secs: 0.0,
            total: 10,
            mastered,
            needs_practice,
        }
    }

    #[test]
    fn test_progress_insight_text() {
        assert!(progress_insight(&[]).starts_with("Keep practicing"));
        assert_eq!(
            progress_insight(&[summary(4, false, true), summary(2, true, false)]),
            "\u{1f31f} Mastered tables: 2\n\u{1f3af} Focus on tables: 4"
        );
        assert!(progress_insight(&[summary(2, true, false)]).ends_with("excellent work!"));
        assert_eq!(progress_insight(&[summary(3, false, false)]), "");
    }
}
