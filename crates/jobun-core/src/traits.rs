//! Core trait definitions for ledger persistence and provision lookup.
//!
//! These async traits are implemented by the `jobun-store` crate; the core
//! only sees the seams.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::error::StoreError;
use crate::ledger::{Ledger, LedgerEntry};
use crate::model::{Citation, LedgerKey};

// ---------------------------------------------------------------------------
// Ledger persistence trait
// ---------------------------------------------------------------------------

/// Durable backend for the performance ledger.
///
/// `load` runs once at engine startup; `save_entry` runs after every
/// recorded attempt and must never block round progression, so the engine
/// calls it from a detached task.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Load the whole ledger. A missing backing document is an error here;
    /// the engine degrades it to an empty ledger.
    async fn load(&self) -> Result<Ledger, StoreError>;

    /// Persist one entry under its citation key.
    async fn save_entry(&self, key: &LedgerKey, entry: &LedgerEntry) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Provision body lookup trait
// ---------------------------------------------------------------------------

/// Resolves a citation to the text of the provision it names.
///
/// Consumed by the display layer only; matching never needs the body.
#[async_trait]
pub trait CitationBodyProvider: Send + Sync {
    /// Human-readable source name (e.g. "file store").
    fn name(&self) -> &str;

    /// Fetch the provision text for a citation.
    async fn lookup_body(&self, citation: &Citation) -> Result<String, StoreError>;
}

// ---------------------------------------------------------------------------
// Answer masking
// ---------------------------------------------------------------------------

static KANJI_ARTICLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"第[〇一二三四五六七八九十百千]+条(?:の[〇一二三四五六七八九十百千]+)*").unwrap()
});

static ARABIC_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"第?[0-9０-９]+(?:[のノ][0-9０-９]+)*条(?:の[0-9０-９]+)*").unwrap());

/// Blanks article-number spellings in a provision body so it can be shown
/// during a round without giving the answer away.
///
/// Handles both the kanji-numeral heading form (`第百九十九条`) and arabic
/// cross references (`第413条の2`), each collapsing to `第□条`.
pub fn mask_article_numbers(body: &str) -> String {
    let masked = KANJI_ARTICLE.replace_all(body, "第□条");
    ARABIC_ARTICLE.replace_all(&masked, "第□条").into_owned()
}
