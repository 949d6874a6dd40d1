use crate::engine::rng::NumberSource;
use crate::error::{QuizError, Result};

pub const DISTRACTOR_COUNT: usize = 3;
/// Wrong answers must stay below this to look like plausible products.
pub const DISTRACTOR_CEILING: u32 = 200;

const STRATEGY_ATTEMPTS: usize = 50;
const FALLBACK_ATTEMPTS: usize = 200;
const FALLBACK_SPREAD: u32 = 50;

/// Ways a learner typically gets a product wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Perturbation {
    AddSmall,
    SubtractSmall,
    NextMultiplier,
    PrevMultiplier,
    NextMultiplicand,
    PrevMultiplicand,
    SumInstead,
    AddLarge,
}

impl Perturbation {
    pub const ALL: [Perturbation; 8] = [
        Perturbation::AddSmall,
        Perturbation::SubtractSmall,
        Perturbation::NextMultiplier,
        Perturbation::PrevMultiplier,
        Perturbation::NextMultiplicand,
        Perturbation::PrevMultiplicand,
        Perturbation::SumInstead,
        Perturbation::AddLarge,
    ];

    /// Candidate wrong answer. May be out of range; the caller filters.
    pub fn apply(self, correct: u32, a: u32, b: u32, source: &mut impl NumberSource) -> i64 {
        let (correct, a, b) = (correct as i64, a as i64, b as i64);
        match self {
            Perturbation::AddSmall => correct + source.next_in(1, 10),
            Perturbation::SubtractSmall => correct - source.next_in(1, 10),
            Perturbation::NextMultiplier => a * (b + 1),
            Perturbation::PrevMultiplier => a * (b - 1),
            Perturbation::NextMultiplicand => (a + 1) * b,
            Perturbation::PrevMultiplicand => (a - 1) * b,
            Perturbation::SumInstead => a + b,
            Perturbation::AddLarge => correct + source.next_in(10, 20),
        }
    }
}

fn accept(candidate: i64, correct: u32, found: &[u32]) -> Option<u32> {
    if candidate <= 0 || candidate >= DISTRACTOR_CEILING as i64 {
        return None;
    }
    let candidate = candidate as u32;
    if candidate == correct || found.contains(&candidate) {
        return None;
    }
    Some(candidate)
}

/// Three distinct, positive wrong answers for `a * b = correct`, each below
/// `DISTRACTOR_CEILING`.
pub fn generate_distractors(
    correct: u32,
    a: u32,
    b: u32,
    source: &mut impl NumberSource,
) -> Result<[u32; DISTRACTOR_COUNT]> {
    let mut found: Vec<u32> = Vec::with_capacity(DISTRACTOR_COUNT);

    for _ in 0..STRATEGY_ATTEMPTS {
        if found.len() == DISTRACTOR_COUNT {
            break;
        }
        let strategy = Perturbation::ALL[source.index_below(Perturbation::ALL.len())];
        if let Some(wrong) = accept(strategy.apply(correct, a, b, source), correct, &found) {
            found.push(wrong);
        }
    }

    let upper = correct
        .saturating_add(FALLBACK_SPREAD)
        .min(DISTRACTOR_CEILING - 1)
        .max(1);
    for _ in 0..FALLBACK_ATTEMPTS {
        if found.len() == DISTRACTOR_COUNT {
            break;
        }
        if let Some(wrong) = accept(source.next_in(1, upper as i64), correct, &found) {
            found.push(wrong);
        }
    }

    // Only reachable with a source that keeps repeating itself.
    let mut candidate = 1;
    while found.len() < DISTRACTOR_COUNT && candidate < DISTRACTOR_CEILING as i64 {
        if let Some(wrong) = accept(candidate, correct, &found) {
            found.push(wrong);
        }
        candidate += 1;
    }

    found
        .try_into()
        .map_err(|_| QuizError::DistractorExhausted(correct))
}
