use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Second factors always span the full times table.
pub const SECOND_FACTOR_MIN: u32 = 1;
pub const SECOND_FACTOR_MAX: u32 = 12;

/// A named range of first-factor values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyBand {
    pub key: &'static str,
    pub min_factor: u32,
    pub max_factor: u32,
    pub display_name: &'static str,
}

impl DifficultyBand {
    pub fn factor_count(&self) -> usize {
        if self.min_factor > self.max_factor {
            return 0;
        }
        (self.max_factor - self.min_factor + 1) as usize
    }

    /// Factors must be positive so every product, and every option, is too.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.min_factor == 0 || self.min_factor > self.max_factor {
            return Err(QuizError::InvalidBand {
                min: self.min_factor,
                max: self.max_factor,
            });
        }
        Ok(())
    }

    /// Number of distinct ordered `(a, b)` pairs the band can produce.
    pub fn unique_pairs(&self) -> usize {
        self.factor_count() * (SECOND_FACTOR_MAX - SECOND_FACTOR_MIN + 1) as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn band(self) -> DifficultyBand {
        match self {
            Difficulty::Easy => DifficultyBand {
                key: "easy",
                min_factor: 1,
                max_factor: 4,
                display_name: "Easy (1-4)",
            },
            Difficulty::Medium => DifficultyBand {
                key: "medium",
                min_factor: 5,
                max_factor: 8,
                display_name: "Medium (5-8)",
            },
            Difficulty::Hard => DifficultyBand {
                key: "hard",
                min_factor: 9,
                max_factor: 12,
                display_name: "Hard (9-12)",
            },
        }
    }

    pub fn key(self) -> &'static str {
        self.band().key
    }

    pub fn display_name(self) -> &'static str {
        self.band().display_name
    }

    pub fn from_key(key: &str) -> Result<Self, QuizError> {
        Self::ALL
            .into_iter()
            .find(|d| d.key() == key)
            .ok_or_else(|| QuizError::InvalidDifficulty(key.to_string()))
    }

    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(&s.trim().to_ascii_lowercase())
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
