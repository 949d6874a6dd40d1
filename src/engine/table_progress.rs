use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const FIRST_TABLE: u32 = 1;
pub const LAST_TABLE: u32 = 12;
/// Attempts remembered per table for mastery and timing.
pub const RECENT_WINDOW: usize = 10;
const MASTERY_RATIO: f64 = 0.9;
const NEEDS_PRACTICE_ACCURACY: u32 = 70;
const NEEDS_PRACTICE_MIN_ATTEMPTS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub correct: bool,
    #[serde(rename = "time")]
    pub response_millis: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProgress {
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub average_time: f64,
    #[serde(default)]
    pub recent_attempts: Vec<Attempt>,
    #[serde(default)]
    pub mastered: bool,
}

impl TableProgress {
    pub fn record(&mut self, attempt: Attempt) {
        self.total += 1;
        if attempt.correct {
            self.correct += 1;
        }
        self.recent_attempts.push(attempt);
        self.trim_window();
        self.refresh();
    }

    fn trim_window(&mut self) {
        let excess = self.recent_attempts.len().saturating_sub(RECENT_WINDOW);
        self.recent_attempts.drain(..excess);
    }

    /// Recompute the fields derived from the recent window.
    fn refresh(&mut self) {
        let n = self.recent_attempts.len();
        self.average_time = if n == 0 {
            0.0
        } else {
            self.recent_attempts
                .iter()
                .map(|a| a.response_millis as f64)
                .sum::<f64>()
                / n as f64
        };
        let recent_correct = self.recent_attempts.iter().filter(|a| a.correct).count();
        self.mastered =
            n == RECENT_WINDOW && recent_correct as f64 / RECENT_WINDOW as f64 >= MASTERY_RATIO;
    }

    /// Overall accuracy, rounded to a whole percent.
    pub fn accuracy(&self) -> u32 {
        crate::session::result::percentage(self.correct, self.total)
    }

    pub fn needs_practice(&self) -> bool {
        self.accuracy() < NEEDS_PRACTICE_ACCURACY && self.total >= NEEDS_PRACTICE_MIN_ATTEMPTS
    }

    pub fn status(&self) -> MasteryStatus {
        if self.total == 0 {
            MasteryStatus::NotAttempted
        } else if self.mastered {
            MasteryStatus::Mastered
        } else if self.accuracy() >= NEEDS_PRACTICE_ACCURACY {
            MasteryStatus::Learning
        } else {
            MasteryStatus::NeedsPractice
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MasteryStatus {
    NotAttempted,
    Mastered,
    Learning,
    NeedsPractice,
}

impl MasteryStatus {
    pub fn label(self) -> &'static str {
        match self {
            MasteryStatus::NotAttempted => "Not practiced yet",
            MasteryStatus::Mastered => "Mastered",
            MasteryStatus::Learning => "Learning",
            MasteryStatus::NeedsPractice => "Needs practice",
        }
    }
}

/// Per-table summary for display, see `TableProgressTracker::stats`.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSummary {
    pub table: u32,
    pub accuracy: u32,
    pub avg_time_secs: f64,
    pub total: u32,
    pub mastered: bool,
    pub needs_practice: bool,
}

/// Rolling accuracy and timing for each times table 1-12.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<u32, TableProgress>", into = "BTreeMap<u32, TableProgress>")]
pub struct TableProgressTracker {
    tables: BTreeMap<u32, TableProgress>,
}

impl Default for TableProgressTracker {
    fn default() -> Self {
        Self {
            tables: (FIRST_TABLE..=LAST_TABLE)
                .map(|t| (t, TableProgress::default()))
                .collect(),
        }
    }
}

impl From<BTreeMap<u32, TableProgress>> for TableProgressTracker {
    fn from(stored: BTreeMap<u32, TableProgress>) -> Self {
        let mut tracker = Self::default();
        for (table, progress) in stored {
            if let Some(slot) = tracker.tables.get_mut(&table) {
                *slot = progress;
            }
        }
        tracker
    }
}

impl From<TableProgressTracker> for BTreeMap<u32, TableProgress> {
    fn from(tracker: TableProgressTracker) -> Self {
        tracker.tables
    }
}

impl TableProgressTracker {
    /// Record an answer against both factors' tables. A square such as 7x7
    /// counts twice for table 7.
    pub fn record_attempt(&mut self, a: u32, b: u32, correct: bool, response_millis: u64) {
        let attempt = Attempt {
            correct,
            response_millis,
        };
        for factor in [a, b] {
            if let Some(progress) = self.tables.get_mut(&factor) {
                progress.record(attempt);
            }
        }
    }

    pub fn table(&self, table: u32) -> Option<&TableProgress> {
        self.tables.get(&table)
    }

    pub fn is_mastered(&self, table: u32) -> bool {
        self.tables.get(&table).is_some_and(|p| p.mastered)
    }

    pub fn mastered_count(&self) -> usize {
        self.tables.values().filter(|p| p.mastered).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &TableProgress)> {
        self.tables.iter().map(|(&t, p)| (t, p))
    }

    /// Practiced tables, weakest first: tables needing practice lead, then
    /// ascending accuracy.
    pub fn stats(&self) -> Vec<TableSummary> {
        let mut stats: Vec<TableSummary> = self
            .tables
            .iter()
            .filter(|(_, p)| p.total > 0)
            .map(|(&table, p)| TableSummary {
                table,
                accuracy: p.accuracy(),
                avg_time_secs: (p.average_time / 100.0).round() / 10.0,
                total: p.total,
                mastered: p.mastered,
                needs_practice: p.needs_practice(),
            })
            .collect();
        stats.sort_by(|a, b| {
            b.needs_practice
                .cmp(&a.needs_practice)
                .then(a.accuracy.cmp(&b.accuracy))
        });
        stats
    }

    /// Fold in progress from an import: totals add up, windows are joined
    /// and cut back to the most recent attempts.
    pub fn merge(&mut self, imported: &BTreeMap<u32, TableProgress>) {
        for (table, incoming) in imported {
            let Some(progress) = self.tables.get_mut(table) else {
                continue;
            };
            progress.total += incoming.total;
            progress.correct += incoming.correct;
            progress
                .recent_attempts
                .extend_from_slice(&incoming.recent_attempts);
            progress.trim_window();
            progress.refresh();
        }
    }
}
