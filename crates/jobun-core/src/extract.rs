//! Corpus scanning for citation-shaped substrings.
//!
//! An ordered cascade of patterns runs most-specific-first over the joined
//! corpus. A span accepted by an earlier rule is claimed, so a looser rule
//! can never re-fragment it. Every candidate goes through the normalizer and
//! rejects vanish with a debug log: this is recall extraction, not
//! validation.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};

use crate::model::CitationSet;
use crate::normalize::{known_law_in, known_law_suffix, normalize};

/// Bracketed citation with the law named right at the opening bracket:
/// `【民法413条の2第2項】`. Handles the connector on either side of `条`
/// (`413条の2` and `413の2条`) and swallows item markers inside the bracket.
static BRACKETED_EXPLICIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"【\s*([^【】\s0-9０-９・（）()]+?(?:法|規則|憲法))\s*",
        r"([0-9０-９]+(?:[のノ][0-9０-９]+)*)\s*条((?:[のノ][0-9０-９]+)+)?",
        r"(?:\s*第?\s*([0-9０-９]+)\s*項)?[^】]*】",
    ))
    .unwrap()
});

/// Bracketed citation whose law name sits somewhere else in the bracket
/// (`【判例・民法94条2項】`); the law is recovered by table lookup over the
/// whole bracket text.
static BRACKETED_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"【([^】]*?)([0-9０-９]+(?:[のノ][0-9０-９]+)*)\s*条((?:[のノ][0-9０-９]+)+)?",
        r"(?:\s*第?\s*([0-9０-９]+)\s*項)?[^】]*】",
    ))
    .unwrap()
});

/// Unbracketed inline citation, law token glued to the number:
/// `憲法21条` in running text. Deliberately narrower than the bracketed
/// rules: no connector after `条`, so prose like `185条の新権原` yields 185.
/// The captured law token is trimmed back to a known law name; running text
/// glues onto the token (`通説では民法94条`), and without the table gate
/// that prose would become part of the law.
static INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"([^\s【】0-9０-９・（）()。、．，]+?(?:法|規則|憲法))",
        r"([0-9０-９]+(?:[のノ][0-9０-９]+)*)\s*条",
        r"(?:\s*第?\s*([0-9０-９]+)\s*項)?",
    ))
    .unwrap()
});

/// Anaphoric law tokens that only resolve through surrounding prose; a
/// bracket built on one carries no usable law name.
const ANAPHORIC_LAW_TOKENS: &[&str] = &["同法", "本法", "同規則", "同施行規則"];

struct Candidate {
    law: String,
    article: String,
    paragraph: Option<String>,
}

/// Mines citations out of a sequence of text blocks.
pub fn extract<I, S>(texts: I) -> CitationSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let corpus = texts
        .into_iter()
        .map(|block| block.as_ref().to_owned())
        .collect::<Vec<_>>()
        .join("\n");
    extract_text(&corpus)
}

/// Mines citations out of one already-joined corpus string.
pub fn extract_text(corpus: &str) -> CitationSet {
    let mut set = CitationSet::new();
    let mut claimed: Vec<Range<usize>> = Vec::new();

    scan(corpus, &BRACKETED_EXPLICIT, &mut claimed, &mut set, "bracketed-explicit", |caps| {
        let law = group(caps, 1)?;
        if ANAPHORIC_LAW_TOKENS.contains(&law.as_str()) {
            return None;
        }
        Some(Candidate {
            law,
            article: joined_article(caps),
            paragraph: group(caps, 4),
        })
    });

    scan(corpus, &BRACKETED_CONTEXT, &mut claimed, &mut set, "bracketed-context", |caps| {
        let span = caps.get(0)?.as_str();
        Some(Candidate {
            law: known_law_in(span)?,
            article: joined_article(caps),
            paragraph: group(caps, 4),
        })
    });

    scan(corpus, &INLINE, &mut claimed, &mut set, "inline", |caps| {
        // the suffix gate also swallows anaphoric tokens like 同法
        let token = group(caps, 1)?;
        Some(Candidate {
            law: known_law_suffix(&token)?,
            article: group(caps, 2)?,
            paragraph: group(caps, 3),
        })
    });

    set
}

fn scan<F>(
    corpus: &str,
    pattern: &Regex,
    claimed: &mut Vec<Range<usize>>,
    set: &mut CitationSet,
    rule: &'static str,
    tokens: F,
) where
    F: Fn(&Captures) -> Option<Candidate>,
{
    for caps in pattern.captures_iter(corpus) {
        let Some(m) = caps.get(0) else { continue };
        let span = m.start()..m.end();
        if claimed.iter().any(|c| span.start < c.end && c.start < span.end) {
            continue;
        }
        claimed.push(span);

        let Some(candidate) = tokens(&caps) else {
            tracing::debug!(rule, text = m.as_str(), "no law resolved for span");
            continue;
        };
        match normalize(&candidate.law, &candidate.article, candidate.paragraph.as_deref()) {
            Ok(citation) => {
                set.insert(citation);
            }
            Err(err) => {
                tracing::debug!(rule, text = m.as_str(), %err, "candidate dropped");
            }
        }
    }
}

fn group(caps: &Captures, index: usize) -> Option<String> {
    caps.get(index).map(|g| g.as_str().to_owned())
}

/// Joins the number segments around `条` back into one article token:
/// `413条の2` arrives as groups `413` and `の2`.
fn joined_article(caps: &Captures) -> String {
    let mut article = caps.get(2).map(|g| g.as_str()).unwrap_or_default().to_owned();
    if let Some(tail) = caps.get(3) {
        article.push_str(tail.as_str());
    }
    article
}
