//! Text cleanup for forward glosses.
//!
//! Wiktionary exports mix HTML markup, bracketed pronunciations and numbered
//! senses into one blob. The forward row keeps only a short primary gloss.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();
static BRACKET_PATTERN: OnceLock<Regex> = OnceLock::new();
static ORDINAL_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Matches `<...>` tags (but not an empty `<>`).
fn tag_regex() -> &'static Regex {
    TAG_PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").expect("Invalid tag regex pattern"))
}

/// Matches non-empty `[...]` annotations such as pronunciations.
fn bracket_regex() -> &'static Regex {
    BRACKET_PATTERN
        .get_or_init(|| Regex::new(r"\[[^\]]+\]").expect("Invalid bracket regex pattern"))
}

/// Matches one or more leading sense numbers like `1. ` or `2.3. `.
fn ordinal_regex() -> &'static Regex {
    ORDINAL_PATTERN
        .get_or_init(|| Regex::new(r"^(?:\d+\.\s*)+").expect("Invalid ordinal regex pattern"))
}

/// A definition after cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanDefinition {
    /// Short primary gloss stored on forward rows. Empty if nothing survived.
    pub gloss: String,
    /// Tag- and bracket-stripped text with every sense and line intact.
    pub full: String,
}

/// Removes `<...>` tags, keeping their inner text.
pub fn strip_tags(text: &str) -> Cow<'_, str> {
    tag_regex().replace_all(text, "")
}

/// Removes tags and bracketed annotations.
pub fn full_definition(raw: &str) -> String {
    let untagged = strip_tags(raw);
    bracket_regex().replace_all(&untagged, "").into_owned()
}

/// Cleans a raw definition into a forward gloss.
///
/// 1. strip tags, then `[...]` annotations
/// 2. first line only
/// 3. text before the first `;`
/// 4. strip leading sense numbers
/// 5. collapse whitespace
///
/// Applying it to its own output returns the same string.
pub fn clean_definition(raw: &str) -> CleanDefinition {
    let full = full_definition(raw);

    let first_line = full.split('\n').next().unwrap_or_default().trim();
    let primary = first_line.split(';').next().unwrap_or_default().trim();
    let unnumbered = ordinal_regex().replace(primary, "");
    let gloss = collapse_whitespace(&unnumbered);

    CleanDefinition { gloss, full }
}

/// Shorthand for `clean_definition(raw).gloss`.
pub fn clean_gloss(raw: &str) -> String {
    clean_definition(raw).gloss
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
