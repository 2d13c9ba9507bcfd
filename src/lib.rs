//! # stardict-pack
//!
//! Builds bidirectional SQLite dictionary packs from StarDict dumps.
//!
//! A source (StarDict triad, legacy SQLite table, zip, tar.gz or URL) is read in
//! index order, each definition is cleaned into a forward row and mined for
//! reverse rows, and the result is written to a fresh database that is then
//! zipped, checksummed and described by a JSON manifest.
pub mod bidi;
pub mod config;
pub mod error;
pub mod pack;
pub mod stardict;
pub mod store;

// Re-export the main types for convenience
pub use bidi::{
    BidirectionalConverter, ConversionStats, ConvertOptions, DedupPolicy, Direction, LanguagePair,
    ReverseStrategy,
};
pub use error::{PackError, PackFailure, PipelineStep, Result};
pub use pack::{run_batch, BatchSummary, PackBuilder, PackReport, PackRequest, PackSource};
pub use stardict::StarDictReader;
