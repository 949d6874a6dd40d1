use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final tally of a completed quiz. Field names on disk match the scores
/// written by earlier versions of the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub percentage: u32,
    #[serde(rename = "correct")]
    pub correct_count: u32,
    #[serde(rename = "total")]
    pub total_count: u32,
    #[serde(rename = "time")]
    pub elapsed_millis: u64,
    #[serde(rename = "date")]
    pub completed_at: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn new(correct: u32, total: u32, elapsed_millis: u64, completed_at: DateTime<Utc>) -> Self {
        Self {
            percentage: percentage(correct, total),
            correct_count: correct,
            total_count: total,
            elapsed_millis,
            completed_at,
        }
    }

    /// Leaderboard order: higher percentage first, then the faster run.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .percentage
            .cmp(&self.percentage)
            .then(self.elapsed_millis.cmp(&other.elapsed_millis))
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_millis as f64 / 1000.0
    }
}

/// Rounded to the nearest whole percent, halves rounding up.
pub fn percentage(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct as u64 * 200 + total as u64) / (total as u64 * 2)) as u32
}

/// `mm:ss`, as shown by the quiz timer.
pub fn format_clock(millis: u64) -> String {
    let secs = millis / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(20, 20), 100);
        assert_eq!(percentage(0, 20), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13); // 12.5 rounds up
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn test_rank_cmp_prefers_percentage_then_speed() {
        let slow = ScoreRecord::new(18, 20, 5000, at(0));
        let fast = ScoreRecord::new(18, 20, 3000, at(0));
        let perfect = ScoreRecord::new(20, 20, 9000, at(0));
        assert_eq!(perfect.rank_cmp(&fast), Ordering::Less);
        assert_eq!(fast.rank_cmp(&slow), Ordering::Less);
        assert_eq!(slow.rank_cmp(&slow.clone()), Ordering::Equal);
    }

    #[test]
    fn test_serializes_with_legacy_field_names() {
        let record = ScoreRecord::new(15, 20, 61_234, at(1_700_000_000_000));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["percentage"], 75);
        assert_eq!(json["correct"], 15);
        assert_eq!(json["total"], 20);
        assert_eq!(json["time"], 61_234);
        assert!(json["date"].as_str().unwrap().starts_with("2023-11-14"));
    }

    #[test]
    fn test_parses_browser_timestamps() {
        let json = r#"{"percentage":90,"correct":18,"total":20,"time":45000,"date":"2024-03-01T10:15:30.123Z"}"#;
        let record: ScoreRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.correct_count, 18);
        assert_eq!(record.elapsed_millis, 45_000);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(61_999), "01:01");
        assert_eq!(format_clock(600_000), "10:00");
    }
}
