//! The `jobun drill` command.
//!
//! Wires the terminal to the quiz engine: a stdin reader thread feeds
//! characters and a tokio interval feeds ticks, both into the one event
//! channel the engine consumes. Skip is `s`, abandon is `q`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use jobun_core::engine::{EngineConfig, ProgressReporter, QuizEngine};
use jobun_core::extract::extract_text;
use jobun_core::model::Citation;
use jobun_core::report::SessionReport;
use jobun_core::results::RoundResult;
use jobun_core::round::RoundEvent;
use jobun_core::session::{self, FilterSpec, SessionMode};
use jobun_core::traits::{mask_article_numbers, CitationBodyProvider};
use jobun_store::bodies::{FileBodyProvider, HttpBodyProvider};
use jobun_store::config::{load_config_from, QuizConfig};
use jobun_store::history::SessionHistory;
use jobun_store::json::JsonLedgerStore;

use super::extract::extract_from_files;

/// Console progress reporter.
struct ConsoleReporter {
    /// Masked provision bodies keyed by ledger key, prefetched best-effort.
    bodies: HashMap<String, String>,
}

impl ProgressReporter for ConsoleReporter {
    fn on_round_start(&self, citation: &Citation, index: usize, total: usize) {
        eprintln!();
        match citation.paragraph {
            Some(p) => eprintln!(
                "Q{}/{}: {} 第{}項 — 何条？",
                index + 1,
                total,
                citation.law_name,
                p
            ),
            None => eprintln!("Q{}/{}: {} — 何条？", index + 1, total, citation.law_name),
        }
        if let Some(body) = self.bodies.get(&citation.ledger_key().to_string()) {
            eprintln!("  {body}");
        }
    }

    fn on_prefix_accepted(&self, prefix: &str) {
        eprintln!("  > {prefix}");
    }

    fn on_mistype(&self, remaining: u32) {
        eprintln!("  x mistype ({remaining} tick(s) left)");
    }

    fn on_tick(&self, remaining: u32) {
        if remaining <= 3 {
            eprintln!("  ... {remaining}");
        }
    }

    fn on_round_settled(&self, result: &RoundResult) {
        eprintln!(
            "  {} {} — answer {} (+{})",
            result.rank().symbol(),
            result.outcome,
            result.citation.answer_text(),
            result.earned_score
        );
    }

    fn on_session_complete(&self, _report: &SessionReport) {}
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    paths: Vec<PathBuf>,
    laws: Vec<String>,
    weak_only: bool,
    fresh_only: bool,
    missed_within: Option<u32>,
    article: Option<String>,
    count: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(!paths.is_empty(), "no corpus files given");
    let config = load_config_from(config_path.as_deref())?;

    let corpus = extract_from_files(&paths)?;
    anyhow::ensure!(!corpus.is_empty(), "no citations found in the corpus");

    let mode = if let Some(reference) = &article {
        SessionMode::Single {
            target: parse_citation_reference(reference)?,
        }
    } else if let Some(days) = missed_within {
        SessionMode::RecentlyMissed { within_days: days }
    } else if weak_only {
        SessionMode::WeakOnly
    } else if fresh_only {
        SessionMode::NoParagraphOnly
    } else {
        SessionMode::All
    };
    let spec = FilterSpec {
        law_subset: (!laws.is_empty())
            .then(|| laws.iter().map(|law| canonical(law)).collect()),
        mode,
        question_count: Some(count.unwrap_or(config.default_question_count)),
        weak: config.weak,
    };

    let store = Arc::new(JsonLedgerStore::new(config.ledger_path()));
    let engine_config = EngineConfig {
        round: config.round,
        ..EngineConfig::default()
    };
    let tick_interval = engine_config.tick_interval;
    let mut engine = QuizEngine::with_store(store, engine_config).await;

    let queue = session::build(&corpus, &spec, engine.ledger())
        .context("could not build a session from this corpus and filter")?;

    let reporter = ConsoleReporter {
        bodies: prefetch_bodies(&config, queue.citations()).await,
    };

    eprintln!(
        "{} round(s), {} tick(s) each. Type the article number and press Enter; s = skip, q = quit.",
        queue.len(),
        config.round.countdown_ticks
    );

    let (tx, rx) = mpsc::channel::<RoundEvent>(64);

    let tick_tx = tx.clone();
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_interval);
        interval.tick().await; // the first tick fires immediately; skip it
        loop {
            interval.tick().await;
            if tick_tx.send(RoundEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    // a plain thread, so a stdin read blocked at exit cannot hold the
    // runtime open
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => {
                    // stdin is gone; treat it as walking away
                    let _ = tx.blocking_send(RoundEvent::Abandon);
                    break;
                }
                Ok(_) => {}
            }
            let trimmed = line.trim();
            let events: Vec<RoundEvent> = match trimmed {
                "s" => vec![RoundEvent::Skip],
                "q" => vec![RoundEvent::Abandon],
                _ => trimmed.chars().map(RoundEvent::Character).collect(),
            };
            for event in events {
                if tx.blocking_send(event).is_err() {
                    return;
                }
            }
        }
    });

    let report = engine.run_session(queue, rx, &reporter).await;
    ticker.abort();

    println!("\n{}", report.to_markdown());

    let history = SessionHistory::new(config.sessions_dir());
    let path = history.append(&report)?;
    eprintln!("Session saved to {}", path.display());

    Ok(())
}

fn canonical(law: &str) -> String {
    jobun_core::normalize::canonical_law_name(law)
}

/// Parses a written reference like `民法413条の2` or `民法94条2項` by
/// running it through the bracketed extraction rule.
fn parse_citation_reference(reference: &str) -> Result<Citation> {
    let set = extract_text(&format!("【{reference}】"));
    set.citations()
        .first()
        .cloned()
        .with_context(|| format!("'{reference}' is not a recognizable citation"))
}

/// Fetches and masks provision bodies for the queued citations. Lookup
/// failures only cost the prompt text, never the session.
async fn prefetch_bodies(config: &QuizConfig, citations: &[Citation]) -> HashMap<String, String> {
    let provider: Box<dyn CitationBodyProvider> = match (&config.bodies_dir, &config.article_api_url)
    {
        (Some(dir), _) => Box::new(FileBodyProvider::new(dir)),
        (None, Some(url)) => Box::new(HttpBodyProvider::new(url)),
        (None, None) => return HashMap::new(),
    };

    let mut bodies = HashMap::new();
    for citation in citations {
        match provider.lookup_body(citation).await {
            Ok(body) => {
                bodies.insert(
                    citation.ledger_key().to_string(),
                    mask_article_numbers(&body),
                );
            }
            Err(error) => {
                tracing::debug!(%citation, %error, source = provider.name(), "no body for prompt");
            }
        }
    }
    bodies
}
