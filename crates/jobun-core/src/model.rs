//! Core data model types for jobun.
//!
//! These are the fundamental types the quiz engine uses to identify statute
//! provisions and to carry sets of them from extraction into play.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A canonical reference to one statute provision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    /// Canonical law name, aliases already collapsed.
    pub law_name: String,
    /// Article number with sub-article connectors in ASCII form
    /// (`"413"`, `"413-2"`). Kept as a string because sub-indices are
    /// identifiers, not arithmetic.
    pub article_number: String,
    /// Paragraph index within the article; `None` means the whole article.
    #[serde(default)]
    pub paragraph: Option<u32>,
}

impl Citation {
    pub fn new(law_name: impl Into<String>, article_number: impl Into<String>) -> Self {
        Self {
            law_name: law_name.into(),
            article_number: article_number.into(),
            paragraph: None,
        }
    }

    pub fn with_paragraph(mut self, paragraph: u32) -> Self {
        self.paragraph = Some(paragraph);
        self
    }

    /// The string a player types to recall this article: the stored
    /// `"413-2"` is read aloud (and typed) as `"413の2"`.
    pub fn answer_text(&self) -> String {
        self.article_number.replace('-', "の")
    }

    /// Ledger identity of this citation; an unspecified paragraph counts
    /// as paragraph 1.
    pub fn ledger_key(&self) -> LedgerKey {
        LedgerKey {
            law_name: self.law_name.clone(),
            article_number: self.article_number.clone(),
            paragraph: self.paragraph.unwrap_or(1),
        }
    }

    fn article_key(&self) -> (String, String) {
        (self.law_name.clone(), self.article_number.clone())
    }
}

impl fmt::Display for Citation {
    /// Renders the conventional written form: the article marker sits after
    /// the first number segment, so `"413-2"` prints as `413条の2`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = self.article_number.split('-');
        let first = segments.next().unwrap_or_default();
        write!(f, "{}{}条", self.law_name, first)?;
        for segment in segments {
            write!(f, "の{segment}")?;
        }
        if let Some(paragraph) = self.paragraph {
            write!(f, "第{paragraph}項")?;
        }
        Ok(())
    }
}

/// Key under which the performance ledger stores a citation's statistics.
///
/// Unlike extraction-time dedup, the ledger does distinguish paragraphs;
/// see [`CitationSet`] for the other half of that asymmetry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LedgerKey {
    pub law_name: String,
    pub article_number: String,
    pub paragraph: u32,
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.law_name, self.article_number, self.paragraph)
    }
}

/// Unique citations mined from a corpus, in first-seen order.
///
/// Two citations occupy the same slot when they share
/// `(law_name, article_number)`; the paragraph is deliberately not part of
/// the dedup key because the quiz drills article-level recall. The first
/// spelling seen wins, so a paragraph-bearing citation survives if it was
/// extracted before a bare one.
#[derive(Debug, Clone, Default)]
pub struct CitationSet {
    citations: Vec<Citation>,
    seen: HashSet<(String, String)>,
}

impl CitationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a citation unless its article is already present.
    /// Returns `true` if the set grew.
    pub fn insert(&mut self, citation: Citation) -> bool {
        if self.seen.insert(citation.article_key()) {
            self.citations.push(citation);
            true
        } else {
            false
        }
    }

    /// Article-level membership: paragraphs are ignored, matching the
    /// dedup key.
    pub fn contains(&self, citation: &Citation) -> bool {
        self.seen.contains(&citation.article_key())
    }

    pub fn len(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Citation> {
        self.citations.iter()
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }
}

impl FromIterator<Citation> for CitationSet {
    fn from_iter<T: IntoIterator<Item = Citation>>(iter: T) -> Self {
        let mut set = CitationSet::new();
        for citation in iter {
            set.insert(citation);
        }
        set
    }
}
