//! End-to-end pipeline tests: corpus text → extraction → session build →
//! engine run against the in-memory store, with scripted event streams.

use std::sync::Arc;

use tokio::sync::mpsc;

use jobun_core::engine::{EngineConfig, NoopReporter, QuizEngine};
use jobun_core::extract::extract;
use jobun_core::model::{Citation, CitationSet};
use jobun_core::round::RoundEvent;
use jobun_core::session::{self, FilterSpec, SessionMode};
use jobun_store::memory::MemoryLedgerStore;

async fn make_engine(store: Arc<MemoryLedgerStore>) -> QuizEngine {
    QuizEngine::with_store(store, EngineConfig::default()).await
}

fn answer_events(citation: &Citation) -> Vec<RoundEvent> {
    citation
        .answer_text()
        .chars()
        .map(RoundEvent::Character)
        .collect()
}

// --- The full scenario: extract, drill, check the ledger ---

#[tokio::test]
async fn e2e_extract_then_drill_both_citations() {
    let corpus = extract(["【民法413条の2】", "【刑法199条】"]);
    assert_eq!(corpus.len(), 2);
    assert!(corpus.contains(&Citation::new("民法", "413-2")));
    assert!(corpus.contains(&Citation::new("刑法", "199")));

    let store = Arc::new(MemoryLedgerStore::new());
    let mut engine = make_engine(Arc::clone(&store)).await;

    let spec = FilterSpec {
        question_count: Some(2),
        ..FilterSpec::default()
    };
    let queue = session::build(&corpus, &spec, engine.ledger()).unwrap();
    assert_eq!(queue.len(), 2);

    // answer every round fully, in whatever order the shuffle chose
    let (tx, rx) = mpsc::channel(64);
    for citation in queue.citations() {
        for event in answer_events(citation) {
            tx.send(event).await.unwrap();
        }
    }
    drop(tx);

    let report = engine.run_session(queue, rx, &NoopReporter).await;

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.correct_count(), 2);
    assert!((report.accuracy() - 100.0).abs() < f64::EPSILON);
    assert!(report.results.iter().all(|r| r.earned_score > 0));

    // one round, one ledger update, one flush
    assert_eq!(store.save_count(), 2);
    let minpo = engine.ledger().entry(&Citation::new("民法", "413-2")).unwrap();
    assert_eq!(minpo.attempts, 1);
    assert_eq!(minpo.correct, 1);
}

#[tokio::test]
async fn e2e_mixed_outcomes_land_in_the_review_list() {
    let corpus = extract(["【民法94条】と【刑法199条】と【商法512条】"]);
    let store = Arc::new(MemoryLedgerStore::new());
    let mut engine = make_engine(Arc::clone(&store)).await;

    let queue = session::build(&corpus, &FilterSpec::default(), engine.ledger()).unwrap();
    let order: Vec<Citation> = queue.citations().to_vec();

    // correct answer, then a skip, then a timeout
    let (tx, rx) = mpsc::channel(64);
    for event in answer_events(&order[0]) {
        tx.send(event).await.unwrap();
    }
    tx.send(RoundEvent::Skip).await.unwrap();
    for _ in 0..10 {
        tx.send(RoundEvent::Tick).await.unwrap();
    }
    drop(tx);

    let report = engine.run_session(queue, rx, &NoopReporter).await;

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.correct_count(), 1);
    let review: Vec<_> = report.review().collect();
    assert_eq!(review.len(), 2);
    assert!(review.iter().all(|r| r.earned_score == 0));

    // skipped and timed-out rounds still count as attempts
    assert_eq!(store.save_count(), 3);
    for citation in &order[1..] {
        let entry = engine.ledger().entry(citation).unwrap();
        assert_eq!(entry.attempts, 1);
        assert_eq!(entry.correct, 0);
    }
}

#[tokio::test]
async fn e2e_weak_only_drill_reselects_the_missed_citation() {
    let corpus = extract(["【民法413条の2】と【刑法199条】"]);
    let store = Arc::new(MemoryLedgerStore::new());

    // first session: miss 民法413条の2, answer 刑法199条
    {
        let mut engine = make_engine(Arc::clone(&store)).await;
        let queue = session::build(&corpus, &FilterSpec::default(), engine.ledger()).unwrap();
        let (tx, rx) = mpsc::channel(64);
        for citation in queue.citations() {
            if citation.article_number == "199" {
                for event in answer_events(citation) {
                    tx.send(event).await.unwrap();
                }
            } else {
                tx.send(RoundEvent::Skip).await.unwrap();
            }
        }
        drop(tx);
        engine.run_session(queue, rx, &NoopReporter).await;
    }

    // second session over the persisted ledger: weak-only selects the miss
    let mut engine = make_engine(Arc::clone(&store)).await;
    let spec = FilterSpec {
        mode: SessionMode::WeakOnly,
        ..FilterSpec::default()
    };
    let queue = session::build(&corpus, &spec, engine.ledger()).unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.citations()[0], Citation::new("民法", "413-2"));

    let (tx, rx) = mpsc::channel(64);
    for event in answer_events(&queue.citations()[0]) {
        tx.send(event).await.unwrap();
    }
    drop(tx);
    engine.run_session(queue, rx, &NoopReporter).await;

    let entry = engine.ledger().entry(&Citation::new("民法", "413-2")).unwrap();
    assert_eq!(entry.attempts, 2);
    assert_eq!(entry.correct, 1);
}

#[tokio::test]
async fn e2e_weak_only_over_a_strong_ledger_still_drills() {
    let corpus: CitationSet = (1..=10)
        .map(|n| Citation::new("民法", n.to_string()))
        .collect();

    let mut seeded = jobun_core::ledger::Ledger::new();
    for citation in corpus.citations() {
        for _ in 0..3 {
            seeded.record_attempt(citation, true, 18);
        }
    }
    let store = Arc::new(MemoryLedgerStore::with_ledger(seeded));
    let engine = make_engine(store).await;

    let spec = FilterSpec {
        mode: SessionMode::WeakOnly,
        ..FilterSpec::default()
    };
    let queue = session::build(&corpus, &spec, engine.ledger()).unwrap();
    // nothing is weak, so the builder widens to the full set
    assert_eq!(queue.len(), 10);
}

#[tokio::test]
async fn e2e_mistype_lowers_the_score_but_not_the_outcome() {
    let corpus = extract(["【民法413条の2】"]);
    let store = Arc::new(MemoryLedgerStore::new());
    let mut engine = make_engine(Arc::clone(&store)).await;

    let queue = session::build(&corpus, &FilterSpec::default(), engine.ledger()).unwrap();

    // "419" costs one penalty tick, then the real answer lands
    let (tx, rx) = mpsc::channel(64);
    for c in "419".chars() {
        tx.send(RoundEvent::Character(c)).await.unwrap();
    }
    for c in "3の2".chars() {
        tx.send(RoundEvent::Character(c)).await.unwrap();
    }
    drop(tx);

    let report = engine.run_session(queue, rx, &NoopReporter).await;

    assert_eq!(report.correct_count(), 1);
    let result = &report.results[0];
    assert_eq!(result.time_remaining, 9);
    assert_eq!(result.earned_score, 19);
    assert_eq!(result.typed, "413の2");
}
