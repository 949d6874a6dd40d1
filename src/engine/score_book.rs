use std::collections::BTreeMap;

use crate::engine::difficulty::Difficulty;
use crate::session::result::ScoreRecord;

/// Entries kept per difficulty after a normal insert.
pub const LEADERBOARD_SIZE: usize = 10;
/// Entries kept after merging an import, so fewer scores are lost.
pub const MERGE_LEADERBOARD_SIZE: usize = 20;
/// A finish in this many places counts as a new high score.
pub const PODIUM_SIZE: usize = 3;

/// Ranked results per difficulty, best first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreBook {
    boards: BTreeMap<Difficulty, Vec<ScoreRecord>>,
}

impl ScoreBook {
    /// Build from stored lists, restoring the ranking in case a stored list
    /// was edited or written by something else.
    pub fn from_boards(boards: BTreeMap<Difficulty, Vec<ScoreRecord>>) -> Self {
        let mut book = Self { boards };
        for scores in book.boards.values_mut() {
            scores.sort_by(ScoreRecord::rank_cmp);
        }
        book
    }

    /// Insert a result and report whether it reached the podium.
    ///
    /// The new record is placed after every existing record that ranks the
    /// same, so an exact repeat of a podium score does not displace it and
    /// does not count as new.
    pub fn record_score(&mut self, difficulty: Difficulty, record: ScoreRecord) -> bool {
        let scores = self.boards.entry(difficulty).or_default();
        let position = scores.partition_point(|s| s.rank_cmp(&record).is_le());
        scores.insert(position, record);
        scores.truncate(LEADERBOARD_SIZE);
        position < PODIUM_SIZE
    }

    pub fn top_scores(&self, difficulty: Difficulty) -> &[ScoreRecord] {
        self.boards.get(&difficulty).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Union with imported records, re-rank, keep the larger merge cap.
    pub fn merge_import(&mut self, difficulty: Difficulty, incoming: &[ScoreRecord]) {
        let scores = self.boards.entry(difficulty).or_default();
        scores.extend_from_slice(incoming);
        scores.sort_by(ScoreRecord::rank_cmp);
        scores.truncate(MERGE_LEADERBOARD_SIZE);
    }

    pub fn all_records(&self) -> impl Iterator<Item = &ScoreRecord> {
        self.boards.values().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.values().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        self.boards.clear();
    }
}
