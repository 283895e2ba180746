//! Per-citation performance ledger.
//!
//! One entry per citation identity, append-only: `record_attempt` is the
//! single mutation path, so `correct <= attempts` holds by construction and
//! the average score is always derived, never stored.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Citation, CitationSet};

/// Cumulative statistics for one citation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub cumulative_score: u64,
    #[serde(default)]
    pub last_attempted_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// Mean earned score per attempt, 0 before the first attempt.
    pub fn average_score(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.cumulative_score as f64 / f64::from(self.attempts)
        }
    }

    /// Percentage of attempts answered correctly, 0 before the first attempt.
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.attempts) * 100.0
        }
    }

    /// True once at least one attempt went wrong.
    pub fn missed(&self) -> bool {
        self.correct < self.attempts
    }
}

/// Thresholds for the weak-citation query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeakConfig {
    /// Citations below this accuracy percentage count as weak.
    #[serde(default = "default_accuracy_threshold")]
    pub accuracy_threshold: f64,
    /// Entries with fewer attempts than this are not judged yet.
    #[serde(default = "default_min_attempts")]
    pub min_attempts: u32,
}

fn default_accuracy_threshold() -> f64 {
    60.0
}

fn default_min_attempts() -> u32 {
    1
}

impl Default for WeakConfig {
    fn default() -> Self {
        Self {
            accuracy_threshold: default_accuracy_threshold(),
            min_attempts: default_min_attempts(),
        }
    }
}

/// Durable attempt statistics keyed by citation identity.
///
/// Keys are the `law:article:paragraph` form of [`crate::model::LedgerKey`],
/// which keeps the serialized ledger a plain JSON object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    entries: HashMap<String, LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, citation: &Citation) -> Option<&LedgerEntry> {
        self.entries.get(&citation.ledger_key().to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Folds one finished round into the citation's entry, stamping the
    /// attempt with the current time.
    pub fn record_attempt(&mut self, citation: &Citation, correct: bool, earned_score: u32) {
        self.record_attempt_at(citation, correct, earned_score, Utc::now());
    }

    /// Puts a whole entry back under its key. This is a persistence-merge
    /// hook for storage backends folding a flushed entry into the stored
    /// document; gameplay always goes through [`Ledger::record_attempt`].
    pub fn restore(&mut self, key: &crate::model::LedgerKey, entry: LedgerEntry) {
        self.entries.insert(key.to_string(), entry);
    }

    /// Same as [`Ledger::record_attempt`] with an explicit timestamp.
    pub fn record_attempt_at(
        &mut self,
        citation: &Citation,
        correct: bool,
        earned_score: u32,
        at: DateTime<Utc>,
    ) {
        let entry = self
            .entries
            .entry(citation.ledger_key().to_string())
            .or_default();
        entry.attempts += 1;
        if correct {
            entry.correct += 1;
        }
        entry.cumulative_score += u64::from(earned_score);
        entry.last_attempted_at = Some(at);
    }

    /// A citation is weak when it was never attempted, or when it has enough
    /// attempts to judge and its accuracy sits below the threshold.
    pub fn is_weak(&self, citation: &Citation, config: &WeakConfig) -> bool {
        match self.entry(citation) {
            None => true,
            Some(entry) => {
                entry.attempts >= config.min_attempts
                    && entry.accuracy() < config.accuracy_threshold
            }
        }
    }

    /// Filters `candidates` down to the weak ones; order follows the input.
    pub fn weak_citations(&self, candidates: &CitationSet, config: &WeakConfig) -> Vec<Citation> {
        candidates
            .citations()
            .iter()
            .filter(|citation| self.is_weak(citation, config))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn minpo_413_2() -> Citation {
        Citation::new("民法", "413-2")
    }

    #[test]
    fn record_attempt_accumulates() {
        let mut ledger = Ledger::new();
        let citation = minpo_413_2();
        ledger.record_attempt(&citation, true, 17);
        ledger.record_attempt(&citation, false, 0);
        ledger.record_attempt(&citation, true, 13);

        let entry = ledger.entry(&citation).unwrap();
        assert_eq!(entry.attempts, 3);
        assert_eq!(entry.correct, 2);
        assert_eq!(entry.cumulative_score, 30);
        assert!(entry.last_attempted_at.is_some());
        assert!((entry.average_score() - 10.0).abs() < f64::EPSILON);
        assert!((entry.accuracy() - 200.0 / 3.0).abs() < 1e-9);
        assert!(entry.missed());
    }

    #[test]
    fn fresh_entry_reports_zero_not_nan() {
        let entry = LedgerEntry::default();
        assert_eq!(entry.average_score(), 0.0);
        assert_eq!(entry.accuracy(), 0.0);
        assert!(!entry.missed());
    }

    #[test]
    fn unattempted_citation_is_weak() {
        let ledger = Ledger::new();
        assert!(ledger.is_weak(&minpo_413_2(), &WeakConfig::default()));
    }

    #[test]
    fn too_few_attempts_are_not_judged() {
        let mut ledger = Ledger::new();
        let citation = minpo_413_2();
        ledger.record_attempt(&citation, false, 0);

        let config = WeakConfig {
            min_attempts: 2,
            ..WeakConfig::default()
        };
        assert!(!ledger.is_weak(&citation, &config));
    }

    #[test]
    fn accuracy_at_the_threshold_is_not_weak() {
        let mut ledger = Ledger::new();
        let citation = minpo_413_2();
        // 3 of 5 correct is exactly 60%
        for correct in [true, true, true, false, false] {
            ledger.record_attempt(&citation, correct, 10);
        }
        assert!(!ledger.is_weak(&citation, &WeakConfig::default()));

        ledger.record_attempt(&citation, false, 0);
        assert!(ledger.is_weak(&citation, &WeakConfig::default()));
    }

    #[test]
    fn weak_citations_keeps_candidate_order() {
        let mut ledger = Ledger::new();
        let strong = Citation::new("刑法", "199");
        for _ in 0..3 {
            ledger.record_attempt(&strong, true, 15);
        }

        let candidates: CitationSet = [minpo_413_2(), strong, Citation::new("商法", "512")]
            .into_iter()
            .collect();
        let weak = ledger.weak_citations(&candidates, &WeakConfig::default());
        assert_eq!(weak.len(), 2);
        assert_eq!(weak[0].law_name, "民法");
        assert_eq!(weak[1].law_name, "商法");
    }

    #[test]
    fn paragraph_default_shares_the_entry() {
        let mut ledger = Ledger::new();
        ledger.record_attempt(&Citation::new("民法", "94").with_paragraph(1), true, 12);

        let bare = Citation::new("民法", "94");
        let entry = ledger.entry(&bare).unwrap();
        assert_eq!(entry.attempts, 1);
    }

    #[test]
    fn ledger_serde_roundtrip() {
        let mut ledger = Ledger::new();
        let at = Utc.with_ymd_and_hms(2025, 11, 3, 9, 30, 0).unwrap();
        ledger.record_attempt_at(&minpo_413_2(), true, 18, at);

        let json = serde_json::to_string(&ledger).unwrap();
        let restored: Ledger = serde_json::from_str(&json).unwrap();
        let entry = restored.entry(&minpo_413_2()).unwrap();
        assert_eq!(entry.cumulative_score, 18);
        assert_eq!(entry.last_attempted_at, Some(at));
    }
}
