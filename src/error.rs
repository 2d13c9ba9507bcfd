//! Error types for the pack pipeline.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::bidi::ConversionStats;
use crate::stardict::StardictError;

/// The primary error type for building, packaging and querying packs.
#[derive(Debug, Error)]
pub enum PackError {
    /// A source directory, file or table does not exist.
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// The StarDict reader failed for a reason other than a missing file.
    #[error("StarDict source error: {0}")]
    Source(StardictError),

    /// Reading a SQLite source database failed.
    #[error("Source database error: {0}")]
    SourceDatabase(rusqlite::Error),

    /// Writing the destination database failed.
    #[error("Database write failed: {0}")]
    Write(#[from] rusqlite::Error),

    /// Querying a finished pack failed.
    #[error("Pack query failed: {0}")]
    Query(rusqlite::Error),

    /// A downloaded or supplied archive could not be opened or extracted.
    #[error("Unreadable archive: {0}")]
    UnreadableArchive(String),

    /// Zipping, checksumming or renaming the outputs failed.
    #[error("Packaging failed: {0}")]
    Packaging(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration values (language codes, pack ids, ...).
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Publish failed: {0}")]
    Publish(String),
}

impl From<StardictError> for PackError {
    fn from(err: StardictError) -> Self {
        match err {
            StardictError::MissingFile { .. } => PackError::SourceNotFound(err.to_string()),
            other => PackError::Source(other),
        }
    }
}

/// A convenience `Result` type alias using [`PackError`].
pub type Result<T> = std::result::Result<T, PackError>;

/// Where in the per-pack pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    Fetch,
    Open,
    Convert,
    Package,
    Publish,
    Manifest,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            PipelineStep::Fetch => "fetch",
            PipelineStep::Open => "open",
            PipelineStep::Convert => "convert",
            PipelineStep::Package => "package",
            PipelineStep::Publish => "publish",
            PipelineStep::Manifest => "manifest",
        };
        f.write_str(name)
    }
}

/// A failed pack build, with the counts reached before the failure.
#[derive(Debug, Error)]
#[error("pack '{pack_id}' failed during {step} ({stats}): {error}")]
pub struct PackFailure {
    pub pack_id: String,
    pub step: PipelineStep,
    pub stats: ConversionStats,
    #[source]
    pub error: PackError,
}

impl PackFailure {
    pub fn new(
        pack_id: impl Into<String>,
        step: PipelineStep,
        stats: ConversionStats,
        error: PackError,
    ) -> Self {
        Self {
            pack_id: pack_id.into(),
            step,
            stats,
            error,
        }
    }
}
