use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::engine::difficulty::{DifficultyBand, SECOND_FACTOR_MAX, SECOND_FACTOR_MIN};
use crate::engine::distractor::generate_distractors;
use crate::engine::rng::{NumberSource, shuffle};
use crate::error::{QuizError, Result};

pub const OPTION_COUNT: usize = 4;
pub const DEFAULT_QUESTION_COUNT: usize = 20;

/// Random draws allowed per requested question before the builder stops
/// rolling dice and picks from the pairs that are still free.
const DRAWS_PER_QUESTION: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub factor_a: u32,
    pub factor_b: u32,
    pub product: u32,
    pub options: [u32; OPTION_COUNT],
    pub correct_index: usize,
}

impl Question {
    /// Assemble a question from its factors and three wrong answers,
    /// shuffling the options.
    pub fn assemble(
        factor_a: u32,
        factor_b: u32,
        distractors: [u32; 3],
        source: &mut impl NumberSource,
    ) -> Self {
        let product = factor_a * factor_b;
        let mut options = [product, distractors[0], distractors[1], distractors[2]];
        shuffle(&mut options, source);
        let correct_index = options
            .iter()
            .position(|&o| o == product)
            .unwrap_or_default();
        Self {
            factor_a,
            factor_b,
            product,
            options,
            correct_index,
        }
    }

    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_index
    }

    pub fn prompt(&self) -> String {
        format!("{} \u{00d7} {} = ?", self.factor_a, self.factor_b)
    }

    pub fn worked(&self) -> String {
        format!("{} \u{00d7} {} = {}", self.factor_a, self.factor_b, self.product)
    }
}

/// Produces an ordered set of questions with no repeated `(a, b)` pair.
pub struct QuestionSetBuilder {
    band: DifficultyBand,
    count: usize,
}

impl QuestionSetBuilder {
    pub fn new(band: DifficultyBand) -> Self {
        Self {
            band,
            count: DEFAULT_QUESTION_COUNT,
        }
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn build(&self, source: &mut impl NumberSource) -> Result<Vec<Question>> {
        self.band.validate()?;
        let available = self.band.unique_pairs();
        if self.count == 0 || self.count > available {
            return Err(QuizError::InsufficientQuestions {
                band: self.band.display_name.to_string(),
                available,
                requested: self.count,
            });
        }

        let mut used: HashSet<(u32, u32)> = HashSet::with_capacity(self.count);
        let mut questions = Vec::with_capacity(self.count);
        let mut draws_left = self.count * DRAWS_PER_QUESTION;

        while questions.len() < self.count {
            let pair = if draws_left > 0 {
                draws_left -= 1;
                (
                    source.next_in(self.band.min_factor as i64, self.band.max_factor as i64) as u32,
                    source.next_in(SECOND_FACTOR_MIN as i64, SECOND_FACTOR_MAX as i64) as u32,
                )
            } else {
                let free = self.free_pairs(&used);
                free[source.index_below(free.len())]
            };
            if !used.insert(pair) {
                continue;
            }

            let (a, b) = pair;
            let distractors = generate_distractors(a * b, a, b, source)?;
            questions.push(Question::assemble(a, b, distractors, source));
        }

        Ok(questions)
    }

    fn free_pairs(&self, used: &HashSet<(u32, u32)>) -> Vec<(u32, u32)> {
        (self.band.min_factor..=self.band.max_factor)
            .flat_map(|a| (SECOND_FACTOR_MIN..=SECOND_FACTOR_MAX).map(move |b| (a, b)))
            .filter(|pair| !used.contains(pair))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::difficulty::Difficulty;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn check_invariants(q: &Question) {
        assert_eq!(q.product, q.factor_a * q.factor_b);
        assert_eq!(q.options[q.correct_index], q.product);
        assert_eq!(q.options.iter().filter(|&&o| o == q.product).count(), 1);
        let distinct: HashSet<u32> = q.options.iter().copied().collect();
        assert_eq!(distinct.len(), OPTION_COUNT);
        assert!(q.options.iter().all(|&o| o > 0));
    }

    #[test]
    fn test_default_count_is_twenty() {
        let mut rng = SmallRng::seed_from_u64(42);
        let qs = QuestionSetBuilder::new(Difficulty::Easy.band())
            .build(&mut rng)
            .unwrap();
        assert_eq!(qs.len(), 20);
    }

    #[test]
    fn test_questions_respect_band() {
        let mut rng = SmallRng::seed_from_u64(42);
        for difficulty in Difficulty::ALL {
            let band = difficulty.band();
            let qs = QuestionSetBuilder::new(band).build(&mut rng).unwrap();
            for q in &qs {
                assert!((band.min_factor..=band.max_factor).contains(&q.factor_a));
                assert!((1..=12).contains(&q.factor_b));
                check_invariants(q);
            }
        }
    }

    #[test]
    fn test_full_band_exhausts_every_pair() {
        let mut rng = SmallRng::seed_from_u64(11);
        let qs = QuestionSetBuilder::new(Difficulty::Hard.band())
            .count(48)
            .build(&mut rng)
            .unwrap();
        let pairs: HashSet<(u32, u32)> = qs.iter().map(|q| (q.factor_a, q.factor_b)).collect();
        assert_eq!(pairs.len(), 48);
    }

    #[test]
    fn test_too_many_questions_rejected() {
        let mut rng = SmallRng::seed_from_u64(11);
        let err = QuestionSetBuilder::new(Difficulty::Medium.band())
            .count(49)
            .build(&mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            QuizError::InsufficientQuestions {
                available: 48,
                requested: 49,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_questions_rejected() {
        let mut rng = SmallRng::seed_from_u64(11);
        assert!(
            QuestionSetBuilder::new(Difficulty::Easy.band())
                .count(0)
                .build(&mut rng)
                .is_err()
        );
    }

    #[test]
    fn test_single_factor_band() {
        let band = DifficultyBand {
            key: "sevens",
            min_factor: 7,
            max_factor: 7,
            display_name: "Sevens",
        };
        let mut rng = SmallRng::seed_from_u64(8);
        let qs = QuestionSetBuilder::new(band).count(12).build(&mut rng).unwrap();
        let mut seconds: Vec<u32> = qs.iter().map(|q| q.factor_b).collect();
        seconds.sort();
        assert_eq!(seconds, (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn test_reversed_band_rejected() {
        let band = DifficultyBand {
            key: "backwards",
            min_factor: 8,
            max_factor: 5,
            display_name: "Backwards",
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let err = QuestionSetBuilder::new(band).count(5).build(&mut rng).unwrap_err();
        assert!(matches!(err, QuizError::InvalidBand { min: 8, max: 5 }));
    }

    #[test]
    fn test_zero_factor_band_rejected() {
        let band = DifficultyBand {
            key: "zeros",
            min_factor: 0,
            max_factor: 0,
            display_name: "Zeros",
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let err = QuestionSetBuilder::new(band).count(1).build(&mut rng).unwrap_err();
        assert!(matches!(err, QuizError::InvalidBand { min: 0, max: 0 }));
    }

    #[test]
    fn test_prompt_format() {
        let mut rng = SmallRng::seed_from_u64(1);
        let q = Question::assemble(3, 4, [11, 13, 7], &mut rng);
        assert_eq!(q.prompt(), "3 \u{00d7} 4 = ?");
        assert_eq!(q.worked(), "3 \u{00d7} 4 = 12");
        check_invariants(&q);
    }
}
