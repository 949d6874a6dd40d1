use std::fs;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use timesquiz::engine::difficulty::Difficulty;
use timesquiz::engine::quiz_engine::QuizEngine;
use timesquiz::error::QuizError;
use timesquiz::session::clock::ManualClock;
use timesquiz::session::quiz::SessionState;
use timesquiz::store::json_store::JsonFileStore;
use timesquiz::store::{KeyValueStore, MemoryStore};

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap())
}

fn file_engine(dir: &TempDir, clock: &ManualClock) -> QuizEngine<JsonFileStore> {
    let store = JsonFileStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    QuizEngine::open(store)
        .unwrap()
        .with_clock(clock.clone())
        .with_seed(42)
}

/// Answer every question, getting `wrong_every`-th ones wrong, each after
/// `millis` of thinking.
fn play<S: KeyValueStore>(engine: &mut QuizEngine<S>, clock: &ManualClock, millis: i64, wrong_every: Option<usize>) {
    let mut n = 0;
    while engine.session_state() == SessionState::InProgress {
        let q = engine.current_question().unwrap().clone();
        clock.advance_millis(millis);
        n += 1;
        let idx = match wrong_every {
            Some(k) if n % k == 0 => (q.correct_index + 1) % q.options.len(),
            _ => q.correct_index,
        };
        engine.submit_answer(idx).unwrap();
    }
}

#[test]
fn perfect_easy_quiz_then_invalid_state() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let mut engine = file_engine(&dir, &clock);

    engine.start_quiz("easy").unwrap();
    let mut last = None;
    for _ in 0..20 {
        let q = engine.current_question().unwrap().clone();
        clock.advance_millis(2500);
        last = Some(engine.submit_answer(q.correct_index).unwrap());
    }

    let completion = last.unwrap().completion.expect("last answer completes the quiz");
    assert_eq!(completion.record.percentage, 100);
    assert_eq!(completion.record.correct_count, 20);
    assert_eq!(completion.record.elapsed_millis, 50_000);
    assert!(completion.is_high_score);

    assert!(matches!(
        engine.submit_answer(0),
        Err(QuizError::InvalidState { state: SessionState::Completed, .. })
    ));
    assert!(matches!(
        engine.current_question(),
        Err(QuizError::InvalidState { .. })
    ));
}

#[test]
fn progress_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    {
        let mut engine = file_engine(&dir, &clock);
        engine.set_user_name("  Grace ").unwrap();
        engine.start(Difficulty::Medium).unwrap();
        play(&mut engine, &clock, 1500, Some(4));
    }

    let engine = file_engine(&dir, &clock);
    assert_eq!(engine.user_name().as_deref(), Some("Grace"));
    let scores = engine.top_scores(Difficulty::Medium);
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].correct_count, 15);
    assert_eq!(scores[0].percentage, 75);

    let answered: u32 = engine.tables().iter().map(|(_, p)| p.total).sum();
    assert_eq!(answered, 40, "each answer counts towards both factors");
    assert!(!engine.achievements().is_empty());
}

#[test]
fn leaderboard_orders_and_caps_across_quizzes() {
    let clock = clock();
    let mut engine = QuizEngine::open(MemoryStore::new())
        .unwrap()
        .with_clock(clock.clone())
        .with_seed(3)
        .with_question_count(5);

    for round in 0..12 {
        engine.start(Difficulty::Hard).unwrap();
        play(&mut engine, &clock, 1000 + round * 100, None);
    }

    let scores = engine.top_scores(Difficulty::Hard);
    assert_eq!(scores.len(), 10);
    assert!(scores.iter().all(|s| s.percentage == 100));
    assert!(scores.windows(2).all(|w| w[0].elapsed_millis <= w[1].elapsed_millis));
    assert_eq!(scores[0].elapsed_millis, 5000);
}

#[test]
fn backup_moves_progress_between_installs() {
    let clock = clock();
    let dir_a = TempDir::new().unwrap();
    let mut a = file_engine(&dir_a, &clock);
    a.start(Difficulty::Easy).unwrap();
    play(&mut a, &clock, 1500, Some(5));
    let backup = a.export_snapshot().unwrap();

    let dir_b = TempDir::new().unwrap();
    let mut b = file_engine(&dir_b, &clock);
    let summary = b.import_snapshot(&backup).unwrap();
    assert_eq!(summary.scores, 1);
    assert_eq!(summary.achievements, a.achievements().len());

    assert_eq!(b.top_scores(Difficulty::Easy), a.top_scores(Difficulty::Easy));
    for (table, progress) in a.tables().iter() {
        let imported = b.tables().table(table).unwrap();
        assert_eq!(imported.correct, progress.correct);
        assert_eq!(imported.total, progress.total);
    }

    // And it was written through, not just held in memory.
    let reopened = file_engine(&dir_b, &clock);
    assert_eq!(reopened.top_scores(Difficulty::Easy).len(), 1);
}

#[test]
fn rejected_import_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let clock = clock();
    let mut engine = file_engine(&dir, &clock);
    let before = fs::read_to_string(dir.path().join("store.json")).unwrap();

    for payload in [
        "not json",
        "[]",
        r#"{"scores": {}}"#,
        r#"{"version": "3.0"}"#,
        r#"{"version": "3.0", "scores": {"expert": []}}"#,
    ] {
        assert!(
            matches!(engine.import_snapshot(payload), Err(QuizError::MalformedImport(_))),
            "accepted {payload}"
        );
    }

    let after = fs::read_to_string(dir.path().join("store.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn corrupt_store_file_starts_fresh() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("store.json"), "{ this is not json").unwrap();
    let clock = clock();
    let mut engine = file_engine(&dir, &clock);
    assert!(engine.top_scores(Difficulty::Easy).is_empty());

    engine.start(Difficulty::Easy).unwrap();
    play(&mut engine, &clock, 2000, None);
    let reopened = file_engine(&dir, &clock);
    assert_eq!(reopened.top_scores(Difficulty::Easy).len(), 1);
}

#[test]
fn share_link_round_trips() {
    let clock = clock();
    let mut engine = QuizEngine::open(MemoryStore::new())
        .unwrap()
        .with_clock(clock.clone())
        .with_seed(9);
    engine.set_user_name("Ada").unwrap();
    engine.start(Difficulty::Easy).unwrap();
    play(&mut engine, &clock, 2000, None);

    let url = engine.share_url("https://timesquiz.app/").unwrap();
    let payload = timesquiz::store::share::SharePayload::decode(&url).unwrap();
    assert_eq!(payload, engine.share_payload());
    assert_eq!(payload.total_quizzes, 1);
    assert_eq!(payload.best_score, 100);
    assert!(payload.challenge_text().starts_with("Ada challenged you"));
}
