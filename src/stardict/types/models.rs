//! Core data structures for StarDict components.
//!
//! - File locations of a dictionary triad
//! - Parsed `.ifo` metadata
//! - Index entries and the outcome of an index scan

use std::collections::HashMap;
use std::path::PathBuf;

use super::error::{Result, StardictError};

/// Paths of the three files making up one StarDict dictionary.
#[derive(Debug, Clone)]
pub struct DictFiles {
    pub ifo: PathBuf,
    pub idx: PathBuf,
    pub dict: PathBuf,
}

impl DictFiles {
    /// `true` when the index is stored as `.idx.gz`.
    pub fn idx_is_gzipped(&self) -> bool {
        has_extension(&self.idx, "gz")
    }

    /// `true` when the definitions are stored as dictzip (`.dict.dz`).
    pub fn dict_is_dictzip(&self) -> bool {
        has_extension(&self.dict, "dz")
    }
}

fn has_extension(path: &std::path::Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Flat `key=value` metadata parsed from an `.ifo` file.
///
/// Values are kept as opaque strings; only a handful of keys are interpreted.
#[derive(Debug, Clone, Default)]
pub struct DictInfo {
    pub fields: HashMap<String, String>,
}

impl DictInfo {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn bookname(&self) -> Option<&str> {
        self.get("bookname")
    }

    /// Declared word count, used for progress logging only.
    pub fn wordcount(&self) -> Option<u64> {
        self.get("wordcount").and_then(|v| v.trim().parse().ok())
    }

    /// Width of the offset field in the `.idx` file.
    ///
    /// StarDict 3.0 allows `idxoffsetbits=64`; everything else uses 32-bit offsets.
    pub fn offset_width(&self) -> Result<OffsetWidth> {
        match self.get("idxoffsetbits").map(str::trim) {
            None | Some("32") => Ok(OffsetWidth::Bits32),
            Some("64") => Ok(OffsetWidth::Bits64),
            Some(other) => Err(StardictError::UnsupportedOffsetBits(other.to_string())),
        }
    }

    /// `true` when `sametypesequence` marks the definitions as HTML (`h`).
    pub fn declares_html(&self) -> bool {
        self.get("sametypesequence")
            .is_some_and(|seq| seq.contains('h'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetWidth {
    Bits32,
    Bits64,
}

impl OffsetWidth {
    /// Returns the byte width of the offset field.
    pub fn number_width(&self) -> usize {
        match self {
            OffsetWidth::Bits32 => 4,
            OffsetWidth::Bits64 => 8,
        }
    }
}

/// A single word from the `.idx` file.
///
/// `offset` and `size` address the decompressed definition payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub word: String,
    pub offset: u64,
    pub size: u32,
}

/// Result of one forward pass over an `.idx` stream.
#[derive(Debug, Default)]
pub struct IndexScan {
    /// Entries in file order.
    pub entries: Vec<IndexEntry>,
    /// Entries dropped because their word was not valid UTF-8.
    pub undecodable_words: u64,
    /// The stream ended inside a record; everything before it was kept.
    pub truncated: bool,
}
