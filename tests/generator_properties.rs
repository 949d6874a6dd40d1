use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use timesquiz::engine::difficulty::{Difficulty, SECOND_FACTOR_MAX, SECOND_FACTOR_MIN};
use timesquiz::engine::distractor::{DISTRACTOR_CEILING, generate_distractors};
use timesquiz::engine::question::{OPTION_COUNT, QuestionSetBuilder};
use timesquiz::engine::score_book::{LEADERBOARD_SIZE, ScoreBook};
use timesquiz::session::result::{ScoreRecord, percentage};

fn difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Medium),
        Just(Difficulty::Hard),
    ]
}

fn check_distractors(correct: u32, a: u32, b: u32, seed: u64) -> Result<(), TestCaseError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let wrong = generate_distractors(correct, a, b, &mut rng).unwrap();
    let distinct: HashSet<u32> = wrong.iter().copied().collect();
    prop_assert_eq!(distinct.len(), wrong.len());
    for w in wrong {
        prop_assert!(w >= 1 && w < DISTRACTOR_CEILING, "{} out of range", w);
        prop_assert_ne!(w, correct);
    }
    Ok(())
}

proptest! {
    #[test]
    fn question_sets_hold_their_invariants(
        seed in any::<u64>(),
        difficulty in difficulty(),
        count in 1usize..=48,
    ) {
        let band = difficulty.band();
        let mut rng = SmallRng::seed_from_u64(seed);
        let questions = QuestionSetBuilder::new(band).count(count).build(&mut rng).unwrap();
        prop_assert_eq!(questions.len(), count);

        let pairs: HashSet<(u32, u32)> = questions.iter().map(|q| (q.factor_a, q.factor_b)).collect();
        prop_assert_eq!(pairs.len(), count);

        for q in &questions {
            prop_assert!((band.min_factor..=band.max_factor).contains(&q.factor_a));
            prop_assert!((SECOND_FACTOR_MIN..=SECOND_FACTOR_MAX).contains(&q.factor_b));
            prop_assert_eq!(q.product, q.factor_a * q.factor_b);
            prop_assert!(q.correct_index < OPTION_COUNT);
            prop_assert_eq!(q.options[q.correct_index], q.product);
            let options: HashSet<u32> = q.options.iter().copied().collect();
            prop_assert_eq!(options.len(), OPTION_COUNT);
            prop_assert!(q.options.iter().all(|&o| o > 0));
        }
    }

    #[test]
    fn too_many_questions_is_an_error(seed in any::<u64>(), difficulty in difficulty(), extra in 1usize..10) {
        let band = difficulty.band();
        let mut rng = SmallRng::seed_from_u64(seed);
        let result = QuestionSetBuilder::new(band)
            .count(band.unique_pairs() + extra)
            .build(&mut rng);
        prop_assert!(result.is_err());
    }

    #[test]
    fn distractors_for_table_facts(a in 1u32..=12, b in 1u32..=12, seed in any::<u64>()) {
        check_distractors(a * b, a, b, seed)?;
    }

    #[test]
    fn distractors_for_any_product_up_to_144(correct in 1u32..=144, seed in any::<u64>()) {
        check_distractors(correct, 1, correct, seed)?;
    }

    #[test]
    fn leaderboard_stays_ranked_and_capped(
        runs in prop::collection::vec((0u32..=20, 1_000u64..600_000), 1..40),
    ) {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut book = ScoreBook::default();
        for (correct, millis) in &runs {
            book.record_score(Difficulty::Easy, ScoreRecord::new(*correct, 20, *millis, at));
        }

        let board = book.top_scores(Difficulty::Easy);
        prop_assert_eq!(board.len(), runs.len().min(LEADERBOARD_SIZE));
        for w in board.windows(2) {
            prop_assert!(
                w[0].percentage > w[1].percentage
                    || (w[0].percentage == w[1].percentage && w[0].elapsed_millis <= w[1].elapsed_millis)
            );
        }
        let best = runs.iter().map(|(c, _)| percentage(*c, 20)).max().unwrap();
        prop_assert_eq!(board[0].percentage, best);
    }

    #[test]
    fn percentage_is_bounded(total in 1u32..500, correct_frac in 0.0f64..=1.0) {
        let correct = (f64::from(total) * correct_frac) as u32;
        let pct = percentage(correct, total);
        prop_assert!(pct <= 100);
        if correct == total {
            prop_assert_eq!(pct, 100);
        }
        if correct == 0 {
            prop_assert_eq!(pct, 0);
        }
    }
}
