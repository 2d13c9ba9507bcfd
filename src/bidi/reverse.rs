//! Reverse-translation extraction.
//!
//! A forward definition like `"house | home"` yields reverse lemmas `house`
//! and `home`, each pointing back at the source word. Two heuristics exist
//! because sources come in two shapes: plain-text glosses separated by
//! punctuation, and HTML-annotated glosses where translations sit inside tags.

use std::fmt;
use std::sync::OnceLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::cleanup::{collapse_whitespace, strip_tags};

/// Upper bound on reverse rows produced from a single source record.
pub const MAX_REVERSE_CANDIDATES: usize = 10;

/// Separators in priority order. Only the first one present is used.
const SEPARATORS: [&str; 4] = [" | ", "|", ";", ","];

/// Terms shorter than this are ignored by [`ReverseStrategy::HtmlTerms`].
const MIN_HTML_TERM_CHARS: usize = 3;

static HTML_TERM_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Matches the text content of a simple `<tag>term</tag>` pair.
fn html_term_regex() -> &'static Regex {
    HTML_TERM_PATTERN.get_or_init(|| {
        Regex::new(r"<[^>]*>([^<]+)</[^>]*>").expect("Invalid HTML term regex pattern")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReverseStrategy {
    /// Split tag-stripped text on the highest-priority separator present.
    SeparatorSplit,
    /// Take the inner text of `<tag>term</tag>` pairs.
    HtmlTerms,
}

impl fmt::Display for ReverseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReverseStrategy::SeparatorSplit => write!(f, "separator-split"),
            ReverseStrategy::HtmlTerms => write!(f, "html-terms"),
        }
    }
}

/// Extracts reverse lemmas from a definition.
///
/// Candidates equal to `lemma` are dropped. For English targets, candidates
/// containing accented Latin letters are dropped as leaked source-language
/// fragments. At most `limit` candidates are returned, in text order.
pub fn extract_reverse_candidates(
    definition: &str,
    lemma: &str,
    target_language: &str,
    strategy: ReverseStrategy,
    limit: usize,
) -> Vec<String> {
    let candidates = match strategy {
        ReverseStrategy::SeparatorSplit => separator_candidates(definition),
        ReverseStrategy::HtmlTerms => html_term_candidates(definition),
    };
    let filter_accents = target_language.eq_ignore_ascii_case("en");

    candidates
        .into_iter()
        .filter(|c| !c.is_empty() && c != lemma)
        .filter(|c| !(filter_accents && has_accented_latin(c)))
        .take(limit)
        .collect()
}

fn separator_candidates(definition: &str) -> Vec<String> {
    let text = strip_tags(definition);
    match SEPARATORS.iter().find(|sep| text.contains(*sep)) {
        Some(sep) => text.split(sep).map(collapse_whitespace).collect(),
        None => vec![collapse_whitespace(&text)],
    }
}

fn html_term_candidates(definition: &str) -> Vec<String> {
    html_term_regex()
        .captures_iter(definition)
        .map(|cap| collapse_whitespace(&cap[1]))
        .filter(|term| {
            term.chars().count() >= MIN_HTML_TERM_CHARS
                && term.chars().filter(|c| *c != ' ').all(char::is_alphabetic)
        })
        .collect()
}

/// Latin-1 Supplement and Latin Extended-A/B letters (`é`, `ß`, `ñ`, `ő`, ...).
fn has_accented_latin(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, '\u{00C0}'..='\u{024F}') && c != '\u{00D7}' && c != '\u{00F7}')
}
