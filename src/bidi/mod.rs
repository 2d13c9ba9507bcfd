//! # Bidirectional Conversion
//!
//! Normalizes a `(word, definition)` sequence into forward and reverse rows.
//!
//! ```text
//!  EntrySource                BidirectionalConverter             EntrySink
//! ┌──────────────┐  records  ┌──────────────────────────┐ batch ┌──────────┐
//! │ StarDict     │──────────►│ cleanup  ─► forward row  │──────►│ forward  │
//! │ SQLite table │           │ reverse  ─► reverse rows │──────►│ reverse  │
//! └──────────────┘           └──────────────────────────┘       └──────────┘
//! ```
//!
//! Cleanup and reverse extraction are pure functions so they can be tested
//! without a source or a database.

pub mod cleanup;
pub mod converter;
pub mod models;
pub mod reverse;
pub mod source;
pub mod stats;

pub use converter::{
    convert_record, BidirectionalConverter, ConvertOptions, DedupPolicy, EntrySink, RecordRows,
    DEFAULT_BATCH_SIZE,
};
pub use models::{Direction, EntryRow, LanguagePair};
pub use reverse::{extract_reverse_candidates, ReverseStrategy, MAX_REVERSE_CANDIDATES};
pub use source::{EntrySource, SourceRecord, SourceTable, SqliteTableSource};
pub use stats::ConversionStats;
