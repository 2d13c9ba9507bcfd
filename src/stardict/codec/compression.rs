//! Decompression for StarDict payloads.
//!
//! Dictzip (`.dict.dz`) is a regular gzip stream with a random-access table
//! in the header's extra field. Any gzip decoder can read it front to back, so
//! offsets from the index address the inflated bytes exactly like a plain
//! `.dict` file. Some tools emit several concatenated gzip members, hence the
//! multi-member decoder.

use std::io::Read;

use flate2::read::MultiGzDecoder;
use log::trace;

use crate::stardict::types::error::{Result, StardictError};

/// Gzip member magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Inflates a whole gzip/dictzip stream into memory.
///
/// # Errors
/// Returns [`StardictError::DecompressionError`] if the stream is not gzip
/// or is corrupt.
pub fn inflate_gzip<R: Read>(reader: R) -> Result<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(reader);
    let mut output = Vec::new();
    decoder
        .read_to_end(&mut output)
        .map_err(|e| StardictError::DecompressionError(format!("gzip inflation failed: {}", e)))?;
    trace!("Inflated gzip stream to {} bytes", output.len());
    Ok(output)
}

/// Returns `true` when the buffer starts with a gzip member header.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}
