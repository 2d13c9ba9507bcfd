//! Destination schema of a bidirectional pack.

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};

use crate::bidi::LanguagePair;
use crate::error::Result;

pub const SCHEMA_VERSION: &str = "2.0";
pub const PACK_TYPE: &str = "bidirectional";

pub(crate) const CREATE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS dictionary_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    lemma TEXT NOT NULL,
    definition TEXT NOT NULL,
    direction TEXT NOT NULL CHECK (direction IN ('forward', 'reverse')),
    source_language TEXT NOT NULL,
    target_language TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_lemma_direction ON dictionary_entries (lemma, direction);
CREATE INDEX IF NOT EXISTS idx_direction ON dictionary_entries (direction);
CREATE INDEX IF NOT EXISTS idx_languages ON dictionary_entries (source_language, target_language);

CREATE TABLE IF NOT EXISTS pack_metadata (
    key TEXT PRIMARY KEY,
    value TEXT
);
";

/// Build-time facts written to `pack_metadata`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackMetadata {
    pub pack_id: String,
    pub pair: LanguagePair,
    /// Provenance tag: `stardict`, `sqlite-word` or `sqlite-dict`.
    pub converted_from: String,
    /// RFC 3339 build timestamp.
    pub created_at: String,
    /// Human-readable source name (the StarDict `bookname`).
    pub source_dict: Option<String>,
}

impl PackMetadata {
    pub fn new(
        pack_id: impl Into<String>,
        pair: LanguagePair,
        converted_from: impl Into<String>,
    ) -> Self {
        Self {
            pack_id: pack_id.into(),
            pair,
            converted_from: converted_from.into(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            source_dict: None,
        }
    }

    pub fn with_source_dict(mut self, source_dict: Option<String>) -> Self {
        self.source_dict = source_dict;
        self
    }

    /// Key/value rows in insertion order.
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        let mut rows = vec![
            ("pack_id", self.pack_id.as_str()),
            ("source_language", self.pair.source.as_str()),
            ("target_language", self.pair.target.as_str()),
            ("pack_type", PACK_TYPE),
            ("schema_version", SCHEMA_VERSION),
            ("converted_from", self.converted_from.as_str()),
            ("created_at", self.created_at.as_str()),
        ];
        if let Some(source_dict) = &self.source_dict {
            rows.push(("source_dict", source_dict.as_str()));
        }
        rows
    }
}

/// Creates tables and indexes, then writes `metadata`.
pub fn initialize(conn: &Connection, metadata: &PackMetadata) -> Result<()> {
    conn.execute_batch(CREATE_SCHEMA)?;
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt =
            tx.prepare("INSERT OR REPLACE INTO pack_metadata (key, value) VALUES (?1, ?2)")?;
        for (key, value) in metadata.rows() {
            stmt.execute(params![key, value])?;
        }
    }
    tx.commit()?;
    Ok(())
}
