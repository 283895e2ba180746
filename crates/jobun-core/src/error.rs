//! Error types for the quiz engine.
//!
//! All three enums live in `jobun-core` so the engine and the trait seams in
//! [`crate::traits`] can classify failures without string matching: the
//! extractor drops [`CitationError`]s, the caller surfaces
//! [`SessionError`]s, and the engine logs [`StoreError`]s without letting
//! them touch gameplay.

use thiserror::Error;

/// Reasons a scraped token pair cannot become a citation.
#[derive(Debug, Error)]
pub enum CitationError {
    /// The law-name token was empty after trimming.
    #[error("empty law name token")]
    EmptyLaw,

    /// The article token was empty after trimming and qualifier stripping.
    #[error("empty article token")]
    EmptyArticle,

    /// The law-name token exceeded the length ceiling.
    #[error("law token too long ({len} chars, max {max})")]
    LawTooLong { len: usize, max: usize },

    /// The article token exceeded the length ceiling.
    #[error("article token too long ({len} chars, max {max})")]
    ArticleTooLong { len: usize, max: usize },

    /// The token contains sentence punctuation, so the match was mis-scoped.
    #[error("token contains sentence punctuation: {0:?}")]
    SentencePunctuation(String),

    /// The article token is not digits joined by the sub-article connector.
    #[error("article is not a number sequence: {0:?}")]
    BadArticleShape(String),

    /// The paragraph token is not a positive integer.
    #[error("paragraph is not a positive integer: {0:?}")]
    BadParagraph(String),
}

/// Failures when assembling or running a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Every filter stage came back empty; there is nothing to drill.
    #[error("no eligible citations after filtering")]
    NoEligibleCitations,

    /// A queue with zero questions reached the engine.
    #[error("session queue is empty")]
    EmptyQueue,
}

/// Failures from ledger persistence or article-body lookup.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem trouble reading or writing a document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A document exists but does not parse.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The article-body service has no text for this citation.
    #[error("article body not found for {0}")]
    BodyNotFound(String),

    /// The article-body service answered with an error status.
    #[error("article service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    /// The article-body service was unreachable.
    #[error("network error: {0}")]
    Network(String),
}

impl StoreError {
    /// Returns `true` when the document or body simply does not exist yet.
    /// Callers treat this as an empty starting state, not a failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            StoreError::BodyNotFound(_) => true,
            StoreError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
