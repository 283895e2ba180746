//! jobun-core: citation extraction, recall rounds, and scoring.
//!
//! This crate defines the citation data model, the round state machine, and
//! the performance ledger that the rest of jobun builds on.

pub mod engine;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod model;
pub mod normalize;
pub mod report;
pub mod results;
pub mod round;
pub mod session;
pub mod traits;
