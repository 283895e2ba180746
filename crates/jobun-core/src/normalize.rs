//! Citation token normalization.
//!
//! Raw tokens scraped out of corpus text pass through here on their way to
//! becoming a [`Citation`]: law-name aliases collapse to one spelling,
//! qualifier tails are cut off, digits fold to ASCII, and malformed tokens
//! are rejected. The same character folding serves the round matcher, so a
//! player typing full-width digits, `ノ`, or the hyphen form the tables
//! display (`413-2`) is never penalized for the glyph.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::error::CitationError;
use crate::model::Citation;

/// Longest law-name token accepted before the match is assumed mis-scoped.
pub const MAX_LAW_CHARS: usize = 20;

/// Longest article token accepted.
pub const MAX_ARTICLE_CHARS: usize = 8;

/// Statute names the extractor can resolve from loose context and the CLI
/// offers as filters. Shape-valid names outside this table still pass
/// [`normalize`]; only the loose extraction rules gate on it.
pub const KNOWN_LAWS: &[&str] = &[
    "日本国憲法",
    "民法",
    "刑法",
    "商法",
    "会社法",
    "会社法施行規則",
    "会社計算規則",
    "民事訴訟法",
    "民事執行法",
    "民事保全法",
    "民事再生法",
    "刑事訴訟法",
    "刑事訴訟規則",
    "行政手続法",
    "行政不服審査法",
    "行政事件訴訟法",
    "国家賠償法",
    "地方自治法",
    "破産法",
    "借地借家法",
    "不動産登記法",
    "信託法",
    "少年法",
    "裁判員の参加する刑事裁判に関する法律",
];

/// Shorthand spellings mapped to the canonical entry in [`KNOWN_LAWS`].
const LAW_ALIASES: &[(&str, &str)] = &[("憲法", "日本国憲法")];

/// Qualifier phrases that follow an article reference in running text;
/// everything from the first one onward is cut before digit parsing.
const QUALIFIER_TAILS: &[&str] = &[
    "ただし書き",
    "ただし書",
    "但し書き",
    "但し書",
    "前段",
    "後段",
    "本文",
    "各号",
    "各項",
    "柱書",
    "前文",
];

const SENTENCE_PUNCTUATION: &[char] =
    &['。', '、', '．', '，', '！', '？', '!', '?', '.', ','];

static ARTICLE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(?:の[0-9]+)*$").unwrap());

/// Folds one character into the matcher alphabet: full-width digits become
/// ASCII, and the katakana connector plus the hyphen spellings (the ASCII
/// form the tables display, its full-width twin, and the long-vowel bar an
/// IME leaves behind) all become `の`. Everything else passes through.
pub fn fold_char(c: char) -> char {
    match c {
        '０'..='９' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        'ノ' | '-' | '－' | 'ー' => 'の',
        _ => c,
    }
}

/// [`fold_char`] over a whole string.
pub fn fold_str(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// Collapses a law-name spelling to its canonical form. Unknown names pass
/// through unchanged.
pub fn canonical_law_name(raw: &str) -> String {
    let name = raw.trim();
    for (alias, canonical) in LAW_ALIASES {
        if name == *alias {
            return (*canonical).to_owned();
        }
    }
    name.to_owned()
}

/// Finds the canonical known law mentioned anywhere in a free-form span.
/// The longest mention wins, so `会社法施行規則` is not mistaken for
/// `会社法`.
pub fn known_law_in(text: &str) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for law in KNOWN_LAWS {
        let len = law.chars().count();
        if text.contains(law) && best.map_or(true, |(_, best_len)| len > best_len) {
            best = Some((law, len));
        }
    }
    for (alias, canonical) in LAW_ALIASES {
        let len = alias.chars().count();
        if text.contains(alias) && best.map_or(true, |(_, best_len)| len > best_len) {
            best = Some((canonical, len));
        }
    }
    best.map(|(law, _)| law.to_owned())
}

/// Trims a loosely captured law token back to the longest [`KNOWN_LAWS`]
/// entry (or alias) it ends with. Prose glued onto the front of an inline
/// citation (`通説では民法`) is cut away; a token ending in no known law is
/// rejected outright.
pub fn known_law_suffix(token: &str) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for law in KNOWN_LAWS {
        let len = law.chars().count();
        if token.ends_with(law) && best.map_or(true, |(_, best_len)| len > best_len) {
            best = Some((law, len));
        }
    }
    for (alias, canonical) in LAW_ALIASES {
        let len = alias.chars().count();
        if token.ends_with(alias) && best.map_or(true, |(_, best_len)| len > best_len) {
            best = Some((canonical, len));
        }
    }
    best.map(|(law, _)| law.to_owned())
}

fn strip_qualifier_tail(article: &str) -> &str {
    let mut cut = article.len();
    for tail in QUALIFIER_TAILS {
        if let Some(idx) = article.find(tail) {
            cut = cut.min(idx);
        }
    }
    &article[..cut]
}

fn sentence_punctuation_in(token: &str) -> Option<char> {
    token.chars().find(|c| SENTENCE_PUNCTUATION.contains(c))
}

/// Turns raw scraped tokens into a canonical [`Citation`].
///
/// The article token may still carry a trailing `条`, qualifier phrases, or
/// full-width digits; the paragraph token may carry `第`/`項` wrapping. A
/// token that survives cleanup but is not digits joined by `の` is rejected.
pub fn normalize(
    raw_law: &str,
    raw_article: &str,
    raw_paragraph: Option<&str>,
) -> Result<Citation, CitationError> {
    let law = raw_law.trim();
    if law.is_empty() {
        return Err(CitationError::EmptyLaw);
    }
    let len = law.chars().count();
    if len > MAX_LAW_CHARS {
        return Err(CitationError::LawTooLong {
            len,
            max: MAX_LAW_CHARS,
        });
    }
    if sentence_punctuation_in(law).is_some() {
        return Err(CitationError::SentencePunctuation(law.to_owned()));
    }
    let law_name = canonical_law_name(law);

    let folded = fold_str(raw_article.trim());
    let stripped = strip_qualifier_tail(&folded);
    let article = stripped.strip_suffix('条').unwrap_or(stripped).trim();
    if article.is_empty() {
        return Err(CitationError::EmptyArticle);
    }
    if sentence_punctuation_in(article).is_some() {
        return Err(CitationError::SentencePunctuation(article.to_owned()));
    }
    let len = article.chars().count();
    if len > MAX_ARTICLE_CHARS {
        return Err(CitationError::ArticleTooLong {
            len,
            max: MAX_ARTICLE_CHARS,
        });
    }
    if !ARTICLE_SHAPE.is_match(article) {
        return Err(CitationError::BadArticleShape(article.to_owned()));
    }
    let article_number = article.replace('の', "-");

    let paragraph = match raw_paragraph.map(str::trim).filter(|p| !p.is_empty()) {
        None => None,
        Some(token) => Some(parse_paragraph(token)?),
    };

    Ok(Citation {
        law_name,
        article_number,
        paragraph,
    })
}

fn parse_paragraph(token: &str) -> Result<u32, CitationError> {
    let folded = fold_str(token);
    let digits = folded
        .trim()
        .trim_start_matches('第')
        .trim_end_matches('項')
        .trim();
    match digits.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(CitationError::BadParagraph(token.to_owned())),
    }
}
