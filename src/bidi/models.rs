//! Row-level types shared by the converter and the pack store.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::PackError;

/// Lookup direction of a dictionary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Source-language lemma, target-language gloss.
    Forward,
    /// Target-language lemma, source-language gloss.
    Reverse,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The nominal `(source, target)` languages of a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    /// Builds a pair from two ISO-639-like codes (2-3 ASCII letters).
    /// Codes are lowercased.
    pub fn new(source: &str, target: &str) -> Result<Self, PackError> {
        Ok(Self {
            source: normalize_code(source)?,
            target: normalize_code(target)?,
        })
    }

    /// Conventional pack id, e.g. `fr-en`.
    pub fn pack_id(&self) -> String {
        format!("{}-{}", self.source, self.target)
    }

    /// `(source_language, target_language)` as stored on rows of `direction`.
    pub fn languages_for(&self, direction: Direction) -> (&str, &str) {
        match direction {
            Direction::Forward => (&self.source, &self.target),
            Direction::Reverse => (&self.target, &self.source),
        }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}→{}", self.source, self.target)
    }
}

impl FromStr for LanguagePair {
    type Err = PackError;

    /// Parses `fr-en` style pair ids.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, target) = s.split_once('-').ok_or_else(|| {
            PackError::Config(format!("language pair must look like 'fr-en', got '{}'", s))
        })?;
        Self::new(source, target)
    }
}

fn normalize_code(code: &str) -> Result<String, PackError> {
    let code = code.trim();
    if (2..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_lowercase())
    } else {
        Err(PackError::Config(format!("invalid language code '{}'", code)))
    }
}

/// One `(lemma, definition)` row destined for a single direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryRow {
    pub lemma: String,
    pub definition: String,
}

impl EntryRow {
    pub fn new(lemma: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            definition: definition.into(),
        }
    }
}
