//! The `jobun stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use jobun_core::ledger::LedgerEntry;
use jobun_core::results::ScoreRank;
use jobun_core::traits::LedgerStore;
use jobun_store::config::load_config_from;
use jobun_store::json::JsonLedgerStore;

pub async fn execute(law: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = JsonLedgerStore::new(config.ledger_path());

    let ledger = match store.load().await {
        Ok(ledger) => ledger,
        Err(e) if e.is_not_found() => {
            println!("No attempts recorded yet.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // stored keys are `law:article:paragraph`
    let mut rows: Vec<(String, LedgerEntry)> = ledger
        .iter()
        .filter(|(key, _)| {
            law.as_deref()
                .map_or(true, |law| key.split(':').next() == Some(law))
        })
        .map(|(key, entry)| (key.to_owned(), entry.clone()))
        .collect();
    if rows.is_empty() {
        println!("No attempts recorded yet.");
        return Ok(());
    }
    // weakest first, the ones worth drilling
    rows.sort_by(|a, b| {
        a.1.accuracy()
            .partial_cmp(&b.1.accuracy())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut table = Table::new();
    table.set_header(vec![
        "Citation",
        "Attempts",
        "Correct",
        "Accuracy",
        "Avg score",
        "Rank",
    ]);
    for (key, entry) in &rows {
        let rank = ScoreRank::for_score(entry.average_score().round() as u32);
        table.add_row(vec![
            Cell::new(display_key(key)),
            Cell::new(entry.attempts),
            Cell::new(entry.correct),
            Cell::new(format!("{:.1}%", entry.accuracy())),
            Cell::new(format!("{:.1}", entry.average_score())),
            Cell::new(rank.symbol()),
        ]);
    }
    println!("{table}");

    let attempts: u32 = rows.iter().map(|(_, e)| e.attempts).sum();
    let correct: u32 = rows.iter().map(|(_, e)| e.correct).sum();
    let overall = if attempts == 0 {
        0.0
    } else {
        f64::from(correct) / f64::from(attempts) * 100.0
    };
    println!(
        "{} citation(s), {attempts} attempt(s), {overall:.1}% overall accuracy",
        rows.len()
    );

    Ok(())
}

/// Renders a `law:article:paragraph` ledger key as the written citation.
fn display_key(key: &str) -> String {
    let mut parts = key.splitn(3, ':');
    let (Some(law), Some(article), Some(paragraph)) = (parts.next(), parts.next(), parts.next())
    else {
        return key.to_owned();
    };
    let mut citation = jobun_core::model::Citation::new(law, article);
    if let Ok(p) = paragraph.parse::<u32>() {
        if p > 1 {
            citation = citation.with_paragraph(p);
        }
    }
    citation.to_string()
}
