//! Session report types with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Citation;
use crate::results::{RoundOutcome, RoundResult};

/// Ledger view of one visited citation, frozen at session end. Display
/// only; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationSnapshot {
    pub citation: Citation,
    pub attempts: u32,
    pub average_score: f64,
    pub accuracy: f64,
}

/// A complete session report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique session identifier.
    pub id: Uuid,
    /// When the first round started.
    pub started_at: DateTime<Utc>,
    /// When the session settled.
    pub finished_at: DateTime<Utc>,
    /// True when the session was cut short by an abandon request.
    pub abandoned: bool,
    /// One line per round, in play order.
    pub results: Vec<RoundResult>,
    /// Post-session ledger state for every visited citation.
    pub snapshots: Vec<CitationSnapshot>,
}

impl SessionReport {
    /// Sum of earned scores across all rounds.
    pub fn total_score(&self) -> u64 {
        self.results.iter().map(|r| u64::from(r.earned_score)).sum()
    }

    /// Number of rounds answered correctly.
    pub fn correct_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome.is_correct())
            .count()
    }

    /// Correct rounds as a percentage of all rounds, 0 for an empty session.
    pub fn accuracy(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.correct_count() as f64 / self.results.len() as f64 * 100.0
        }
    }

    /// The rounds worth revisiting: everything that was not answered
    /// correctly.
    pub fn review(&self) -> impl Iterator<Item = &RoundResult> {
        self.results.iter().filter(|r| !r.outcome.is_correct())
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the session report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Score:** {} | **Correct:** {}/{} ({:.1}%)\n\n",
            self.total_score(),
            self.correct_count(),
            self.results.len(),
            self.accuracy()
        ));
        if self.abandoned {
            md.push_str("_Session abandoned before the queue was exhausted._\n\n");
        }

        md.push_str("| # | Citation | Outcome | Score | Time left |\n");
        md.push_str("|---|----------|---------|-------|-----------|\n");
        for (index, result) in self.results.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} {} | {} | {} |\n",
                index + 1,
                result.citation,
                result.rank().symbol(),
                result.outcome,
                result.earned_score,
                result.time_remaining
            ));
        }
        md.push('\n');

        let review: Vec<&RoundResult> = self.review().collect();
        if !review.is_empty() {
            md.push_str("### Review\n\n");
            for result in review {
                let typed = if result.typed.is_empty() {
                    "nothing".to_owned()
                } else {
                    format!("\"{}\"", result.typed)
                };
                md.push_str(&format!(
                    "- {}: {} (typed {})\n",
                    result.citation, result.outcome, typed
                ));
            }
            md.push('\n');
        }

        if !self.snapshots.is_empty() {
            md.push_str("### Ledger\n\n");
            md.push_str("| Citation | Attempts | Avg score | Accuracy |\n");
            md.push_str("|----------|----------|-----------|----------|\n");
            for snapshot in &self.snapshots {
                md.push_str(&format!(
                    "| {} | {} | {:.1} | {:.1}% |\n",
                    snapshot.citation,
                    snapshot.attempts,
                    snapshot.average_score,
                    snapshot.accuracy
                ));
            }
        }

        md
    }
}
