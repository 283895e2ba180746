//! Session construction: filter, shuffle, truncate.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::ledger::{Ledger, WeakConfig};
use crate::model::{Citation, CitationSet};

/// Which citations from the corpus a session draws on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum SessionMode {
    /// Every citation surviving the law filter.
    All,
    /// Weak citations only, falling back to all when nothing is weak.
    WeakOnly,
    /// Citations without a paragraph index.
    NoParagraphOnly,
    /// Citations missed at least once within the window.
    RecentlyMissed {
        #[serde(default = "default_within_days")]
        within_days: u32,
    },
    /// Exactly one citation, for focused drilling.
    Single { target: Citation },
}

fn default_within_days() -> u32 {
    7
}

impl Default for SessionMode {
    fn default() -> Self {
        SessionMode::All
    }
}

/// Caller-facing session filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Restrict to these law names; `None` keeps every law.
    #[serde(default)]
    pub law_subset: Option<Vec<String>>,
    #[serde(default)]
    pub mode: SessionMode,
    /// Upper bound on rounds; `None` plays the whole filtered set.
    #[serde(default)]
    pub question_count: Option<usize>,
    #[serde(default)]
    pub weak: WeakConfig,
}

/// An ordered run of citations for one session; consumed once, never shared.
/// The id minted here identifies the session on its report.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionQueue {
    id: Uuid,
    citations: Vec<Citation>,
}

impl SessionQueue {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn len(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }
}

impl IntoIterator for SessionQueue {
    type Item = Citation;
    type IntoIter = std::vec::IntoIter<Citation>;

    fn into_iter(self) -> Self::IntoIter {
        self.citations.into_iter()
    }
}

/// Builds the queue for one session from the corpus, the filter, and the
/// ledger.
pub fn build(
    corpus: &CitationSet,
    spec: &FilterSpec,
    ledger: &Ledger,
) -> Result<SessionQueue, SessionError> {
    build_with(corpus, spec, ledger, Utc::now(), &mut rand::thread_rng())
}

/// [`build`] with an explicit clock and randomness source.
pub fn build_with<R: Rng>(
    corpus: &CitationSet,
    spec: &FilterSpec,
    ledger: &Ledger,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<SessionQueue, SessionError> {
    let by_law = law_filtered(corpus, spec.law_subset.as_deref());

    let mut picked: Vec<Citation> = match &spec.mode {
        SessionMode::All => by_law,
        SessionMode::WeakOnly => {
            let weak: Vec<Citation> = by_law
                .iter()
                .filter(|c| ledger.is_weak(c, &spec.weak))
                .cloned()
                .collect();
            // an all-strong corpus still deserves a session
            if weak.is_empty() {
                tracing::debug!("no weak citations, widening to the full law subset");
                by_law
            } else {
                weak
            }
        }
        SessionMode::NoParagraphOnly => by_law
            .into_iter()
            .filter(|c| c.paragraph.is_none())
            .collect(),
        SessionMode::RecentlyMissed { within_days } => {
            let horizon = now - Duration::days(i64::from(*within_days));
            by_law
                .into_iter()
                .filter(|c| {
                    ledger.entry(c).is_some_and(|entry| {
                        entry.missed()
                            && entry.last_attempted_at.is_some_and(|at| at >= horizon)
                    })
                })
                .collect()
        }
        SessionMode::Single { target } => by_law
            .into_iter()
            .filter(|c| c.ledger_key() == target.ledger_key())
            .collect(),
    };

    if picked.is_empty() {
        return Err(SessionError::NoEligibleCitations);
    }

    picked.shuffle(rng);
    if let Some(count) = spec.question_count {
        if count == 0 {
            return Err(SessionError::EmptyQueue);
        }
        picked.truncate(count);
    }

    Ok(SessionQueue {
        id: Uuid::new_v4(),
        citations: picked,
    })
}

fn law_filtered(corpus: &CitationSet, subset: Option<&[String]>) -> Vec<Citation> {
    corpus
        .citations()
        .iter()
        .filter(|c| subset.map_or(true, |laws| laws.iter().any(|law| law == &c.law_name)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corpus() -> CitationSet {
        [
            Citation::new("民法", "94").with_paragraph(2),
            Citation::new("民法", "413-2"),
            Citation::new("刑法", "199"),
            Citation::new("商法", "512"),
            Citation::new("会社法", "331"),
        ]
        .into_iter()
        .collect()
    }

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(0x6a6f62756e)
    }

    #[test]
    fn law_subset_restricts_the_queue() {
        let spec = FilterSpec {
            law_subset: Some(vec!["民法".to_owned()]),
            ..FilterSpec::default()
        };
        let queue = build_with(&corpus(), &spec, &Ledger::new(), Utc::now(), &mut seeded())
            .unwrap();
        assert_eq!(queue.len(), 2);
        assert!(queue.citations().iter().all(|c| c.law_name == "民法"));
    }

    #[test]
    fn weak_only_keeps_the_weak() {
        let mut ledger = Ledger::new();
        let strong = Citation::new("刑法", "199");
        for _ in 0..3 {
            ledger.record_attempt(&strong, true, 18);
        }

        let spec = FilterSpec {
            mode: SessionMode::WeakOnly,
            ..FilterSpec::default()
        };
        let queue = build_with(&corpus(), &spec, &ledger, Utc::now(), &mut seeded()).unwrap();
        assert_eq!(queue.len(), 4);
        assert!(!queue.citations().iter().any(|c| c.law_name == "刑法"));
    }

    #[test]
    fn weak_only_falls_back_to_the_all_queue() {
        let mut ledger = Ledger::new();
        for citation in corpus().citations() {
            for _ in 0..3 {
                ledger.record_attempt(citation, true, 18);
            }
        }

        let weak_spec = FilterSpec {
            mode: SessionMode::WeakOnly,
            ..FilterSpec::default()
        };
        let all_spec = FilterSpec::default();

        let weak_queue =
            build_with(&corpus(), &weak_spec, &ledger, Utc::now(), &mut seeded()).unwrap();
        let all_queue =
            build_with(&corpus(), &all_spec, &ledger, Utc::now(), &mut seeded()).unwrap();
        assert!(!weak_queue.is_empty());
        assert_eq!(weak_queue.citations(), all_queue.citations());
    }

    #[test]
    fn every_build_mints_a_distinct_id() {
        let first = build_with(&corpus(), &FilterSpec::default(), &Ledger::new(), Utc::now(), &mut seeded())
            .unwrap();
        let second = build_with(&corpus(), &FilterSpec::default(), &Ledger::new(), Utc::now(), &mut seeded())
            .unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn no_paragraph_only_drops_paragraph_citations() {
        let spec = FilterSpec {
            mode: SessionMode::NoParagraphOnly,
            ..FilterSpec::default()
        };
        let queue = build_with(&corpus(), &spec, &Ledger::new(), Utc::now(), &mut seeded())
            .unwrap();
        assert_eq!(queue.len(), 4);
        assert!(queue.citations().iter().all(|c| c.paragraph.is_none()));
    }

    #[test]
    fn recently_missed_respects_window_and_misses() {
        let now = Utc::now();
        let mut ledger = Ledger::new();
        // missed three days ago: in
        ledger.record_attempt_at(
            &Citation::new("民法", "413-2"),
            false,
            0,
            now - Duration::days(3),
        );
        // missed ten days ago: out
        ledger.record_attempt_at(
            &Citation::new("刑法", "199"),
            false,
            0,
            now - Duration::days(10),
        );
        // recent but never missed: out
        ledger.record_attempt_at(&Citation::new("商法", "512"), true, 15, now);

        let spec = FilterSpec {
            mode: SessionMode::RecentlyMissed { within_days: 7 },
            ..FilterSpec::default()
        };
        let queue = build_with(&corpus(), &spec, &ledger, now, &mut seeded()).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.citations()[0].article_number, "413-2");
    }

    #[test]
    fn single_mode_drills_one_citation() {
        let spec = FilterSpec {
            mode: SessionMode::Single {
                target: Citation::new("会社法", "331"),
            },
            ..FilterSpec::default()
        };
        let queue = build_with(&corpus(), &spec, &Ledger::new(), Utc::now(), &mut seeded())
            .unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.citations()[0].law_name, "会社法");

        let missing = FilterSpec {
            mode: SessionMode::Single {
                target: Citation::new("民事訴訟法", "1"),
            },
            ..FilterSpec::default()
        };
        let err = build_with(&corpus(), &missing, &Ledger::new(), Utc::now(), &mut seeded())
            .unwrap_err();
        assert!(matches!(err, SessionError::NoEligibleCitations));
    }

    #[test]
    fn question_count_truncates_after_the_shuffle() {
        let spec = FilterSpec {
            question_count: Some(2),
            ..FilterSpec::default()
        };
        let queue = build_with(&corpus(), &spec, &Ledger::new(), Utc::now(), &mut seeded())
            .unwrap();
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn zero_questions_is_rejected() {
        let spec = FilterSpec {
            question_count: Some(0),
            ..FilterSpec::default()
        };
        let err = build_with(&corpus(), &spec, &Ledger::new(), Utc::now(), &mut seeded())
            .unwrap_err();
        assert!(matches!(err, SessionError::EmptyQueue));
    }

    #[test]
    fn unknown_law_subset_surfaces_no_eligible_citations() {
        let spec = FilterSpec {
            law_subset: Some(vec!["特許法".to_owned()]),
            ..FilterSpec::default()
        };
        let err = build_with(&corpus(), &spec, &Ledger::new(), Utc::now(), &mut seeded())
            .unwrap_err();
        assert!(matches!(err, SessionError::NoEligibleCitations));
    }

    #[test]
    fn every_citation_appears_exactly_once() {
        let queue = build_with(
            &corpus(),
            &FilterSpec::default(),
            &Ledger::new(),
            Utc::now(),
            &mut seeded(),
        )
        .unwrap();
        assert_eq!(queue.len(), corpus().len());
        let mut keys: Vec<String> = queue
            .citations()
            .iter()
            .map(|c| c.ledger_key().to_string())
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), corpus().len());
    }
}
