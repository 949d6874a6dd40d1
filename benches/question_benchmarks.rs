use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use timesquiz::engine::difficulty::Difficulty;
use timesquiz::engine::distractor::generate_distractors;
use timesquiz::engine::question::QuestionSetBuilder;
use timesquiz::engine::score_book::ScoreBook;
use timesquiz::session::result::ScoreRecord;

fn bench_question_sets(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(7);

    c.bench_function("build 20 questions (hard)", |b| {
        let builder = QuestionSetBuilder::new(Difficulty::Hard.band()).count(20);
        b.iter(|| builder.build(black_box(&mut rng)))
    });

    // Every pair in the band: exercises the free-pair fallback.
    c.bench_function("build 48 questions (easy, exhaustive)", |b| {
        let builder = QuestionSetBuilder::new(Difficulty::Easy.band()).count(48);
        b.iter(|| builder.build(black_box(&mut rng)))
    });
}

fn bench_distractors(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(11);

    c.bench_function("distractors for every product 1..=12 x 1..=12", |b| {
        b.iter(|| {
            for a in 1..=12u32 {
                for f in 1..=12u32 {
                    let _ = generate_distractors(black_box(a * f), a, f, &mut rng);
                }
            }
        })
    });
}

fn bench_score_book(c: &mut Criterion) {
    let now = chrono::Utc::now();
    let records: Vec<ScoreRecord> = (0..200u32)
        .map(|i| ScoreRecord::new(i % 21, 20, 30_000 + u64::from(i) * 97, now))
        .collect();

    c.bench_function("record 200 scores", |b| {
        b.iter(|| {
            let mut book = ScoreBook::default();
            for r in &records {
                book.record_score(Difficulty::Medium, black_box(r.clone()));
            }
            book
        })
    });
}

criterion_group!(benches, bench_question_sets, bench_distractors, bench_score_book);
criterion_main!(benches);
