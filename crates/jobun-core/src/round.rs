//! One timed recall round.
//!
//! A round shows a citation and collects the article number one character at
//! a time against a tick-based countdown. All progress flows through
//! [`Round::apply`], so input and timer events are serialized by
//! construction: a character can never land after the deadline has fired.

use serde::{Deserialize, Serialize};

use crate::model::Citation;
use crate::normalize::fold_char;
use crate::results::{RoundOutcome, RoundResult};

/// Timing and scoring knobs for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Countdown armed at round entry, in ticks.
    #[serde(default = "default_countdown_ticks")]
    pub countdown_ticks: u32,
    /// Flat score for any correct answer.
    #[serde(default = "default_base_score")]
    pub base_score: u32,
    /// Extra score per tick still on the clock at the moment of the match.
    #[serde(default = "default_bonus_per_tick")]
    pub bonus_per_tick: u32,
    /// Ticks deducted for every rejected character.
    #[serde(default = "default_mistype_penalty")]
    pub mistype_penalty: u32,
}

fn default_countdown_ticks() -> u32 {
    10
}

fn default_base_score() -> u32 {
    10
}

fn default_bonus_per_tick() -> u32 {
    1
}

fn default_mistype_penalty() -> u32 {
    1
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            countdown_ticks: default_countdown_ticks(),
            base_score: default_base_score(),
            bonus_per_tick: default_bonus_per_tick(),
            mistype_penalty: default_mistype_penalty(),
        }
    }
}

/// An injected event; the round does not know where ticks or characters
/// come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    /// One raw input character.
    Character(char),
    /// One countdown interval elapsed.
    Tick,
    /// Give up on this citation.
    Skip,
    /// Stop the whole session; settles the active round like a skip.
    Abandon,
}

/// What one applied event did to the round.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundStep {
    /// The character extended the accepted prefix.
    Accepted { prefix: String },
    /// The character was rejected and the penalty charged.
    Rejected { remaining: u32 },
    /// The countdown advanced without expiring.
    Ticked { remaining: u32 },
    /// The round reached a terminal state; emitted exactly once.
    Settled(RoundResult),
    /// The round had already settled; the event had no effect.
    Ignored,
}

/// State of one citation being drilled.
#[derive(Debug, Clone)]
pub struct Round {
    citation: Citation,
    answer: String,
    accepted: String,
    remaining: u32,
    config: RoundConfig,
    settled: bool,
}

impl Round {
    /// Arms the countdown and starts waiting for input.
    pub fn new(citation: Citation, config: RoundConfig) -> Self {
        let answer = citation.answer_text();
        Self {
            citation,
            answer,
            accepted: String::new(),
            remaining: config.countdown_ticks,
            config,
            settled: false,
        }
    }

    pub fn citation(&self) -> &Citation {
        &self.citation
    }

    /// The typed answer form being matched against, e.g. `413の2`.
    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn accepted_prefix(&self) -> &str {
        &self.accepted
    }

    pub fn time_remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Applies one event and reports what happened.
    pub fn apply(&mut self, event: RoundEvent) -> RoundStep {
        if self.settled {
            return RoundStep::Ignored;
        }
        match event {
            RoundEvent::Character(raw) => self.apply_character(raw),
            RoundEvent::Tick => {
                self.remaining = self.remaining.saturating_sub(1);
                if self.remaining == 0 {
                    self.settle(RoundOutcome::TimedOut)
                } else {
                    RoundStep::Ticked {
                        remaining: self.remaining,
                    }
                }
            }
            RoundEvent::Skip | RoundEvent::Abandon => self.settle(RoundOutcome::Skipped),
        }
    }

    fn apply_character(&mut self, raw: char) -> RoundStep {
        let mut candidate = self.accepted.clone();
        candidate.push(fold_char(raw));

        if self.answer.starts_with(&candidate) {
            self.accepted = candidate;
            if self.accepted == self.answer {
                return self.settle(RoundOutcome::Correct);
            }
            RoundStep::Accepted {
                prefix: self.accepted.clone(),
            }
        } else {
            // malformed characters take the same path as wrong digits
            self.remaining = self.remaining.saturating_sub(self.config.mistype_penalty);
            if self.remaining == 0 {
                self.settle(RoundOutcome::TimedOut)
            } else {
                RoundStep::Rejected {
                    remaining: self.remaining,
                }
            }
        }
    }

    fn settle(&mut self, outcome: RoundOutcome) -> RoundStep {
        self.settled = true;
        let earned_score = match outcome {
            RoundOutcome::Correct => {
                self.config.base_score + self.remaining * self.config.bonus_per_tick
            }
            RoundOutcome::TimedOut | RoundOutcome::Skipped => 0,
        };
        RoundStep::Settled(RoundResult {
            citation: self.citation.clone(),
            outcome,
            time_remaining: self.remaining,
            earned_score,
            typed: self.accepted.clone(),
        })
    }
}
