//! Custom error types for the StarDict reader.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for StarDict reading operations.
#[derive(Debug, Error)]
pub enum StardictError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// One of the `.ifo`/`.idx`/`.dict` files is absent from the source directory.
    #[error("StarDict {kind} file not found in {}", dir.display())]
    MissingFile { kind: &'static str, dir: PathBuf },

    /// A compressed stream (`.dict.dz`, `.idx.gz`) could not be inflated.
    #[error("Decompression failed: {0}")]
    DecompressionError(String),

    /// An index entry points past the end of the definition payload.
    #[error("Definition range {offset}+{size} exceeds payload of {len} bytes")]
    OutOfBounds { offset: u64, size: u32, len: u64 },

    /// The `.ifo` file declares an index offset width this reader cannot handle.
    #[error("Unsupported idxoffsetbits: {0}")]
    UnsupportedOffsetBits(String),

    /// A mutex lock was poisoned, indicating a panic in another thread holding the lock.
    #[error("A mutex lock was poisoned, indicating a panic in another thread holding the lock.")]
    LockPoisoned,
}

/// A convenience `Result` type alias using [`StardictError`].
pub type Result<T> = std::result::Result<T, StardictError>;
