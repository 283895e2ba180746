//! Quiz engine orchestrator.
//!
//! Feeds each queued citation through a round, folds every settled round
//! into the ledger, and hands each mutation to the store on a detached task
//! so persistence can never stall the next round.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::ledger::Ledger;
use crate::model::Citation;
use crate::report::{CitationSnapshot, SessionReport};
use crate::results::RoundResult;
use crate::round::{Round, RoundConfig, RoundEvent, RoundStep};
use crate::session::SessionQueue;
use crate::traits::LedgerStore;

/// Configuration for the quiz engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Timing and scoring for each round.
    pub round: RoundConfig,
    /// Wall-clock interval the event source should use between ticks.
    pub tick_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            round: RoundConfig::default(),
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_round_start(&self, citation: &Citation, index: usize, total: usize);
    fn on_prefix_accepted(&self, prefix: &str);
    fn on_mistype(&self, remaining: u32);
    fn on_tick(&self, remaining: u32);
    fn on_round_settled(&self, result: &RoundResult);
    fn on_session_complete(&self, report: &SessionReport);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_round_start(&self, _: &Citation, _: usize, _: usize) {}
    fn on_prefix_accepted(&self, _: &str) {}
    fn on_mistype(&self, _: u32) {}
    fn on_tick(&self, _: u32) {}
    fn on_round_settled(&self, _: &RoundResult) {}
    fn on_session_complete(&self, _: &SessionReport) {}
}

/// The quiz engine: owns the in-memory ledger for the lifetime of the
/// process and drives sessions over it.
pub struct QuizEngine {
    store: Arc<dyn LedgerStore>,
    ledger: Ledger,
    config: EngineConfig,
}

impl QuizEngine {
    /// Starts an engine over `store`, loading the ledger. Any load failure
    /// degrades to an empty ledger so a first run or a lost document never
    /// blocks play.
    pub async fn with_store(store: Arc<dyn LedgerStore>, config: EngineConfig) -> Self {
        let ledger = match store.load().await {
            Ok(ledger) => ledger,
            Err(error) if error.is_not_found() => {
                tracing::debug!("no ledger document yet, starting empty");
                Ledger::new()
            }
            Err(error) => {
                tracing::warn!(%error, "ledger load failed, starting empty");
                Ledger::new()
            }
        };
        Self {
            store,
            ledger,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Runs one session to completion or abandonment.
    ///
    /// Rounds execute strictly one at a time; `events` carries characters,
    /// ticks, and skip or abandon requests from the caller's input and timer
    /// source. Closing the channel abandons the session. Every settled round
    /// records exactly one attempt and yields exactly one result line.
    pub async fn run_session(
        &mut self,
        queue: SessionQueue,
        mut events: mpsc::Receiver<RoundEvent>,
        progress: &dyn ProgressReporter,
    ) -> SessionReport {
        let started_at = Utc::now();
        let id = queue.id();
        let total = queue.len();
        let mut results: Vec<RoundResult> = Vec::with_capacity(total);
        let mut saves: Vec<JoinHandle<()>> = Vec::with_capacity(total);
        let mut abandoned = false;

        'session: for (index, citation) in queue.into_iter().enumerate() {
            progress.on_round_start(&citation, index, total);
            let mut round = Round::new(citation, self.config.round);

            loop {
                let Some(event) = events.recv().await else {
                    // input source went away; settle the round and stop
                    abandoned = true;
                    if let RoundStep::Settled(result) = round.apply(RoundEvent::Abandon) {
                        self.record(result, &mut results, &mut saves, progress);
                    }
                    break 'session;
                };
                let stop_requested = matches!(event, RoundEvent::Abandon);

                match round.apply(event) {
                    RoundStep::Accepted { prefix } => progress.on_prefix_accepted(&prefix),
                    RoundStep::Rejected { remaining } => progress.on_mistype(remaining),
                    RoundStep::Ticked { remaining } => progress.on_tick(remaining),
                    RoundStep::Settled(result) => {
                        self.record(result, &mut results, &mut saves, progress);
                        if stop_requested {
                            abandoned = true;
                            break 'session;
                        }
                        break;
                    }
                    RoundStep::Ignored => {}
                }
            }
        }

        // settle outstanding flushes before reporting; failures were already
        // logged by the tasks themselves
        for save in saves {
            if save.await.is_err() {
                tracing::warn!("ledger save task panicked");
            }
        }

        let snapshots = self.snapshots_for(&results);
        let report = SessionReport {
            id,
            started_at,
            finished_at: Utc::now(),
            abandoned,
            results,
            snapshots,
        };
        progress.on_session_complete(&report);
        report
    }

    /// Folds one settled round into the ledger and hands the fresh entry to
    /// the store without waiting for it.
    fn record(
        &mut self,
        result: RoundResult,
        results: &mut Vec<RoundResult>,
        saves: &mut Vec<JoinHandle<()>>,
        progress: &dyn ProgressReporter,
    ) {
        self.ledger
            .record_attempt(&result.citation, result.outcome.is_correct(), result.earned_score);

        let store = Arc::clone(&self.store);
        let key = result.citation.ledger_key();
        let entry = self.ledger.entry(&result.citation).cloned().unwrap_or_default();
        saves.push(tokio::spawn(async move {
            if let Err(error) = store.save_entry(&key, &entry).await {
                tracing::warn!(%key, %error, "ledger save failed");
            }
        }));

        progress.on_round_settled(&result);
        results.push(result);
    }

    fn snapshots_for(&self, results: &[RoundResult]) -> Vec<CitationSnapshot> {
        results
            .iter()
            .map(|result| {
                let entry = self.ledger.entry(&result.citation).cloned().unwrap_or_default();
                CitationSnapshot {
                    citation: result.citation.clone(),
                    attempts: entry.attempts,
                    average_score: entry.average_score(),
                    accuracy: entry.accuracy(),
                }
            })
            .collect()
    }
}
