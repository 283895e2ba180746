//! Per-round outcome types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Citation;

/// Terminal outcome of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    /// The full article number was typed before the deadline.
    Correct,
    /// The countdown reached zero first.
    TimedOut,
    /// The round was skipped or the session abandoned mid-round.
    Skipped,
}

impl RoundOutcome {
    pub fn is_correct(self) -> bool {
        matches!(self, RoundOutcome::Correct)
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RoundOutcome::Correct => "correct",
            RoundOutcome::TimedOut => "timed out",
            RoundOutcome::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

/// Coarse grade for one round's score, for display next to the result line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRank {
    Sharp,
    Close,
    Rusty,
}

impl ScoreRank {
    /// Grades a round score on the 0..=20 scale.
    pub fn for_score(score: u32) -> Self {
        if score >= 16 {
            ScoreRank::Sharp
        } else if score >= 6 {
            ScoreRank::Close
        } else {
            ScoreRank::Rusty
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ScoreRank::Sharp => "◯",
            ScoreRank::Close => "△",
            ScoreRank::Rusty => "✕",
        }
    }
}

/// Outcome of one round; feeds exactly one ledger update and one line of
/// the session report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub citation: Citation,
    pub outcome: RoundOutcome,
    /// Whole ticks left on the countdown when the round settled.
    pub time_remaining: u32,
    pub earned_score: u32,
    /// The accepted prefix at settle time, for the review listing.
    pub typed: String,
}

impl RoundResult {
    pub fn rank(&self) -> ScoreRank {
        ScoreRank::for_score(self.earned_score)
    }
}
