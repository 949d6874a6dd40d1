use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::engine::achievements::AchievementEvent;
use crate::engine::difficulty::Difficulty;
use crate::engine::insights::{DifficultyStats, OverallStats};
use crate::engine::table_progress::TableProgress;
use crate::error::{QuizError, Result};
use crate::session::result::ScoreRecord;
use crate::store::KeyValueStore;

pub const TABLE_PROGRESS_KEY: &str = "quiz_table_progress";
pub const ACHIEVEMENTS_KEY: &str = "quiz_achievements";
pub const USER_NAME_KEY: &str = "quiz_user_name";
pub const APP_VERSION_KEY: &str = "quiz_app_version";

pub const EXPORT_VERSION: &str = "3.0";

pub fn scores_key(difficulty: Difficulty) -> String {
    format!("quiz_scores_{}", difficulty.key())
}

/// Read a JSON document, treating a missing or corrupt value as no data.
pub fn load_json<T: DeserializeOwned + Default>(store: &impl KeyValueStore, key: &str) -> T {
    match store.get(key) {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key, "discarding unreadable stored value: {e}");
            T::default()
        }),
        None => T::default(),
    }
}

pub fn to_entry<T: Serialize>(key: impl Into<String>, value: &T) -> Result<(String, String)> {
    Ok((key.into(), serde_json::to_string(value)?))
}

pub fn load_scores(store: &impl KeyValueStore) -> BTreeMap<Difficulty, Vec<ScoreRecord>> {
    Difficulty::ALL
        .into_iter()
        .map(|d| (d, load_json(store, &scores_key(d))))
        .collect()
}

/// Every key the game owns, for a full reset.
pub fn all_keys() -> Vec<String> {
    let mut keys: Vec<String> = Difficulty::ALL.into_iter().map(scores_key).collect();
    keys.extend(
        [TABLE_PROGRESS_KEY, ACHIEVEMENTS_KEY, USER_NAME_KEY, APP_VERSION_KEY]
            .map(str::to_string),
    );
    keys
}

/// Backup document: everything needed to move progress between installs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub version: String,
    #[serde(default)]
    pub export_date: Option<DateTime<Utc>>,
    pub scores: BTreeMap<Difficulty, Vec<ScoreRecord>>,
    #[serde(default)]
    pub table_progress: Option<BTreeMap<u32, TableProgress>>,
    #[serde(default)]
    pub achievements: Option<Vec<AchievementEvent>>,
}

/// Read-only statistics document. Unlike [`ExportData`] it is meant for
/// people and spreadsheets, not for importing back.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub overall_stats: OverallSummary,
    pub difficulty_stats: BTreeMap<Difficulty, DifficultySummary>,
    pub table_progress: BTreeMap<u32, TableProgress>,
    pub achievements: Vec<AchievementEvent>,
    pub all_scores: BTreeMap<Difficulty, Vec<ScoreRecord>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    pub total_quizzes: usize,
    pub avg_score: u32,
    pub best_score: u32,
    pub best_streak: u32,
    pub total_minutes: u64,
}

impl From<&OverallStats> for OverallSummary {
    fn from(o: &OverallStats) -> Self {
        Self {
            total_quizzes: o.total_quizzes,
            avg_score: o.average_score,
            best_score: o.best_score,
            best_streak: o.best_streak,
            total_minutes: o.total_minutes,
        }
    }
}

/// `avg_time` is in whole seconds.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultySummary {
    pub avg_score: u32,
    pub avg_time: u64,
    pub best_score: u32,
    pub total_plays: usize,
}

impl From<&DifficultyStats> for DifficultySummary {
    fn from(d: &DifficultyStats) -> Self {
        Self {
            avg_score: d.average_score,
            avg_time: d.average_secs,
            best_score: d.best_score,
            total_plays: d.plays,
        }
    }
}

impl ExportData {
    /// Parse and validate an import document without touching any state.
    pub fn parse(payload: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| QuizError::MalformedImport(format!("not valid JSON: {e}")))?;
        let object = value
            .as_object()
            .ok_or_else(|| QuizError::MalformedImport("expected a JSON object".to_string()))?;
        for field in ["version", "scores"] {
            match object.get(field) {
                None | Some(serde_json::Value::Null) => {
                    return Err(QuizError::MalformedImport(format!(
                        "missing required field '{field}'"
                    )));
                }
                Some(_) => {}
            }
        }
        let mut data: ExportData = serde_json::from_value(value)
            .map_err(|e| QuizError::MalformedImport(e.to_string()))?;
        if data.version.trim().is_empty() {
            return Err(QuizError::MalformedImport("empty version".to_string()));
        }
        data.version = data.version.trim().to_string();
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_scores_keys() {
        assert_eq!(scores_key(Difficulty::Medium), "quiz_scores_medium");
        assert_eq!(all_keys().len(), 7);
    }

    #[test]
    fn test_load_json_corrupt_is_default() {
        let mut store = MemoryStore::new();
        store.set(ACHIEVEMENTS_KEY, "[{broken").unwrap();
        let events: Vec<AchievementEvent> = load_json(&store, ACHIEVEMENTS_KEY);
        assert!(events.is_empty());
    }

    #[test]
    fn test_load_scores_missing_is_empty() {
        let store = MemoryStore::new();
        let scores = load_scores(&store);
        assert_eq!(scores.len(), 3);
        assert!(scores.values().all(Vec::is_empty));
    }

    #[test]
    fn test_parse_minimal_document() {
        let data = ExportData::parse(r#"{"version":"3.0","scores":{}}"#).unwrap();
        assert_eq!(data.version, "3.0");
        assert!(data.table_progress.is_none());
        assert!(data.achievements.is_none());
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        for payload in [
            r#"{"scores":{}}"#,
            r#"{"version":"3.0"}"#,
            r#"{"version":null,"scores":{}}"#,
            r#"[]"#,
            r#"not json"#,
        ] {
            assert!(
                matches!(ExportData::parse(payload), Err(QuizError::MalformedImport(_))),
                "accepted {payload}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_unknown_difficulty() {
        let err = ExportData::parse(r#"{"version":"3.0","scores":{"nightmare":[]}}"#).unwrap_err();
        assert!(matches!(err, QuizError::MalformedImport(_)));
    }

    #[test]
    fn test_parse_browser_export() {
        let payload = r#"{
            "version": "3.0",
            "exportDate": "2024-06-01T08:00:00.000Z",
            "scores": {
                "easy": [{"percentage":95,"correct":19,"total":20,"time":41000,"date":"2024-05-30T18:00:00.000Z"}],
                "medium": [],
                "hard": []
            },
            "tableProgress": {
                "3": {"correct":9,"total":10,"averageTime":1800,"recentAttempts":[{"correct":true,"time":1800}],"mastered":false}
            },
            "achievements": []
        }"#;
        let data = ExportData::parse(payload).unwrap();
        assert_eq!(data.scores[&Difficulty::Easy][0].percentage, 95);
        assert_eq!(data.table_progress.unwrap()[&3].total, 10);
    }
}
